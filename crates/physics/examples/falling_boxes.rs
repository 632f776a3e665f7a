//! Drops a stack of boxes onto a tiled floor and logs where they come to rest.
//!
//! Run with `RUST_LOG=debug` to see broad phase maintenance.
use log::*;

use quadsat_physics::*;

fn main() -> Result<()> {
    quadsat_logging::log_to_stderr();

    let mut floor = TileGrid::new(1.0, 1.0)?;
    for x in -10..10 {
        floor.set(V2::new(x, 10), TileFlags::SOLID);
    }
    // Spikes under the middle box.
    floor.set(V2::new(0, 10), TileFlags::SOLID | TileFlags(2));

    let config = WorldConfigBuilder::new().shake_interval(30).build()?;
    let mut world = World::new(config);
    world.attach_broad_phase(floor)?;

    let mut ids = vec![];
    for i in 0..5 {
        let body = Body::new(V2::new(i as f64 * 1.5 - 3.0, -(i as f64)), V2::new(1.0, 1.0))?;
        ids.push(world.spawn(body)?);
    }

    for _ in 0..240 {
        world.step(1.0 / 60.0)?;
    }

    for id in ids {
        let body = world
            .get_mut(id)
            .expect("Bodies are never despawned in this demo");
        let spiked = body.take_collisions().iter().any(|e| {
            matches!(e.other, Collidee::Tile { flags, .. } if flags.contains(TileFlags(2)))
        });
        info!(
            "{} rests at {:?}{}",
            id,
            body.get_position(),
            if spiked { " (on spikes)" } else { "" }
        );
    }

    Ok(())
}
