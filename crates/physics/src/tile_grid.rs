//! A [TileGrid] is a sparse, uniform grid of static tiles, for level geometry.
//!
//! Tiles are backed by a hashmap, so memory is `O(n)` in the number of non-empty tiles.  Each tile carries a
//! [TileFlags] payload which the grid doesn't interpret: collision events hand it back to the caller, who decides what
//! "spikes" or "one-way platform" mean.
use std::collections::HashMap;

use crate::errors::*;
use crate::*;

/// Integer coordinates of a tile.  Tile `(x, y)` covers `[x * width, (x + 1) * width)` horizontally, and likewise
/// vertically.
pub type TileCoord = V2<i32>;

/// Gameplay bits attached to a tile.  All zero means there is no tile.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    derive_more::Display,
    derive_more::BitOr,
    derive_more::BitAnd,
)]
#[display(fmt = "{:#x}", _0)]
pub struct TileFlags(pub u32);

impl TileFlags {
    pub const EMPTY: TileFlags = TileFlags(0);
    pub const SOLID: TileFlags = TileFlags(1);

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    tile_width: f64,
    tile_height: f64,
    tiles: HashMap<TileCoord, TileFlags>,
}

/// Represents a range of tiles that a box covers: `lx..=hx` and `ly..=hy`.
struct TileRange {
    lx: i32,
    ly: i32,
    hx: i32,
    hy: i32,
}

impl TileGrid {
    pub fn new(tile_width: f64, tile_height: f64) -> Result<TileGrid, ConfigError> {
        let valid = |x: f64| x.is_finite() && x > 0.0;
        if !valid(tile_width) || !valid(tile_height) {
            return Err(ConfigError::InvalidTileSize {
                width: tile_width,
                height: tile_height,
            });
        }

        Ok(TileGrid {
            tile_width,
            tile_height,
            tiles: Default::default(),
        })
    }

    pub fn get_tile_size(&self) -> V2 {
        V2::new(self.tile_width, self.tile_height)
    }

    /// Get a tile's flags, which are [TileFlags::EMPTY] if no tile was set.
    pub fn get(&self, coord: TileCoord) -> TileFlags {
        self.tiles.get(&coord).copied().unwrap_or_default()
    }

    /// Set a tile.  Setting [TileFlags::EMPTY] removes it.
    pub fn set(&mut self, coord: TileCoord, flags: TileFlags) {
        if flags.is_empty() {
            self.tiles.remove(&coord);
        } else {
            self.tiles.insert(coord, flags);
        }
    }

    /// Remove a tile, returning what was there.
    pub fn clear_tile(&mut self, coord: TileCoord) -> TileFlags {
        self.tiles.remove(&coord).unwrap_or_default()
    }

    /// Remove every tile.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Number of non-empty tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterate over all non-empty tiles in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileFlags)> + '_ {
        self.tiles.iter().map(|(c, f)| (*c, *f))
    }

    /// The tile containing a point.
    pub fn tile_at(&self, point: &V2) -> TileCoord {
        V2::new(
            (point.x / self.tile_width).floor() as i32,
            (point.y / self.tile_height).floor() as i32,
        )
    }

    pub fn tile_bounds(&self, coord: TileCoord) -> Aabb {
        let p1 = V2::new(
            coord.x as f64 * self.tile_width,
            coord.y as f64 * self.tile_height,
        );
        Aabb::from_position_size(p1, self.get_tile_size())
            .expect("Tile sizes are validated on construction")
    }

    fn range_for(&self, area: &Aabb) -> TileRange {
        let lo = self.tile_at(&area.get_p1());
        let hi = self.tile_at(&area.get_p2());
        TileRange {
            lx: lo.x,
            ly: lo.y,
            hx: hi.x,
            hy: hi.y,
        }
    }

    /// Every non-empty tile whose bounds overlap `area`, in no particular order.
    ///
    /// Small areas are scanned cell by cell.  Areas covering more cells than there are tiles walk the tiles instead, so
    /// the cost is bounded by whichever is smaller.
    pub fn tiles_overlapping<'a>(
        &'a self,
        area: &'a Aabb,
    ) -> Box<dyn Iterator<Item = (TileCoord, Aabb, TileFlags)> + 'a> {
        let TileRange { lx, ly, hx, hy } = self.range_for(area);
        let cells = (hx as i64 - lx as i64 + 1) as u64 * (hy as i64 - ly as i64 + 1) as u64;

        // The range is inclusive, so it can include tiles which only touch the area.
        let overlapping = move |coord: TileCoord, flags: TileFlags| {
            let bounds = self.tile_bounds(coord);
            bounds.intersects(area).then(|| (coord, bounds, flags))
        };

        if cells > self.tiles.len() as u64 {
            Box::new(
                self.tiles
                    .iter()
                    .filter_map(move |(c, f)| overlapping(*c, *f)),
            )
        } else {
            Box::new(
                (ly..=hy)
                    .flat_map(move |y| (lx..=hx).map(move |x| V2::new(x, y)))
                    .filter_map(move |coord| overlapping(coord, *self.tiles.get(&coord)?)),
            )
        }
    }
}
