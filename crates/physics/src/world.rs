//! The [World] owns actors and steps them forward in time.
//!
//! Each step integrates gravity and velocity, refreshes the broad phase, and then finds every overlapping pair.  All
//! collision events for a step are gathered before any are delivered, so an actor reacting to one collision can't hide
//! a later one from the other side of the pair.
use log::*;
use slab::Slab;

use crate::errors::*;
use crate::*;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldConfig {
    gravity: V2,
    shake_interval: u64,
}

impl WorldConfig {
    /// Downward, since y grows toward the bottom of the world.
    pub const DEFAULT_GRAVITY: V2 = V2 { x: 0.0, y: 9.8 };
    pub const DEFAULT_SHAKE_INTERVAL: u64 = 60;

    pub fn get_gravity(&self) -> V2 {
        self.gravity
    }

    /// Number of steps between broad phase maintenance passes.
    pub fn get_shake_interval(&self) -> u64 {
        self.shake_interval
    }
}

impl Default for WorldConfig {
    fn default() -> WorldConfig {
        WorldConfig {
            gravity: Self::DEFAULT_GRAVITY,
            shake_interval: Self::DEFAULT_SHAKE_INTERVAL,
        }
    }
}

#[derive(Debug, Default)]
pub struct WorldConfigBuilder {
    gravity: Option<V2>,
    shake_interval: Option<u64>,
}

impl WorldConfigBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn gravity(mut self, gravity: V2) -> Self {
        self.gravity = Some(gravity);
        self
    }

    pub fn shake_interval(mut self, steps: u64) -> Self {
        self.shake_interval = Some(steps);
        self
    }

    pub fn build(self) -> Result<WorldConfig, ConfigError> {
        let gravity = self.gravity.unwrap_or(WorldConfig::DEFAULT_GRAVITY);
        if !gravity.is_finite() {
            return Err(ConfigError::InvalidGravity(gravity));
        }

        let shake_interval = self
            .shake_interval
            .unwrap_or(WorldConfig::DEFAULT_SHAKE_INTERVAL);
        if shake_interval == 0 {
            return Err(ConfigError::ZeroShakeInterval);
        }

        Ok(WorldConfig {
            gravity,
            shake_interval,
        })
    }
}

pub struct World<A> {
    config: WorldConfig,
    actors: Slab<A>,
    broad_phase: Option<BroadPhaseKind>,
    step_count: u64,
}

/// Sign of a push-out along one axis.  Positive when the actor is on the low side of the other thing.
fn push_sign(mine: f64, theirs: f64, tie: f64) -> f64 {
    if mine < theirs {
        1.0
    } else if mine > theirs {
        -1.0
    } else {
        tie
    }
}

/// Penetration of one box into another along the axis of least overlap.
///
/// `tie` breaks the direction when the centers coincide on that axis.  Boxes which only touch don't collide.
fn push_out(mine: &Aabb, theirs: &Aabb, tie: f64) -> Option<V2> {
    let overlap = mine.overlap(theirs)?;
    let c = mine.get_center();
    let oc = theirs.get_center();

    Some(if overlap.get_width() < overlap.get_height() {
        V2::new(overlap.get_width() * push_sign(c.x, oc.x, tie), 0.0)
    } else {
        V2::new(0.0, overlap.get_height() * push_sign(c.y, oc.y, tie))
    })
}

impl<A: Actor> World<A> {
    pub fn new(config: WorldConfig) -> World<A> {
        World {
            config,
            actors: Slab::new(),
            broad_phase: None,
            step_count: 0,
        }
    }

    pub fn get_config(&self) -> &WorldConfig {
        &self.config
    }

    /// Attach the world's broad phase.  Actors which already exist are inserted into it.
    ///
    /// Worlds get exactly one broad phase; attaching a second is an error.
    pub fn attach_broad_phase(&mut self, broad_phase: impl Into<BroadPhaseKind>) -> Result<()> {
        if self.broad_phase.is_some() {
            return Err(WorldError::BroadPhaseAlreadyAttached.into());
        }

        let mut broad_phase = broad_phase.into();
        for (key, actor) in self.actors.iter() {
            broad_phase.insert_actor(ActorId(key), actor.get_bounds())?;
        }
        self.broad_phase = Some(broad_phase);
        info!("Attached broad phase to a world of {} actors", self.actors.len());
        Ok(())
    }

    pub fn broad_phase(&self) -> Option<&BroadPhaseKind> {
        self.broad_phase.as_ref()
    }

    pub fn spawn(&mut self, actor: A) -> Result<ActorId> {
        let bounds = actor.get_bounds();
        let id = ActorId(self.actors.insert(actor));
        if let Some(bp) = self.broad_phase.as_mut() {
            if let Err(e) = bp.insert_actor(id, bounds) {
                self.actors.remove(id.0);
                return Err(e);
            }
        }

        trace!("Spawned {} at {:?}", id, bounds);
        Ok(id)
    }

    pub fn despawn(&mut self, id: ActorId) -> Result<A> {
        if !self.actors.contains(id.0) {
            return Err(WorldError::UnknownActor(id).into());
        }

        if let Some(bp) = self.broad_phase.as_mut() {
            bp.remove_actor(id)?;
        }

        trace!("Despawned {}", id);
        Ok(self.actors.remove(id.0))
    }

    pub fn get(&self, id: ActorId) -> Option<&A> {
        self.actors.get(id.0)
    }

    /// Mutable access to an actor.  Moves made here reach the broad phase at the start of the next step.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut A> {
        self.actors.get_mut(id.0)
    }

    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &A)> + '_ {
        self.actors.iter().map(|(k, a)| (ActorId(k), a))
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn get_step_count(&self) -> u64 {
        self.step_count
    }

    /// Advance the world by `dt` seconds, returning the number of collision events delivered.
    pub fn step(&mut self, dt: f64) -> Result<usize> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(WorldError::InvalidTimeStep(dt).into());
        }

        // Check everything before moving anything, so a failed step leaves the world as it was.
        let gravity = self.config.gravity;
        let mut integrated = Vec::with_capacity(self.actors.len());
        for (key, actor) in self.actors.iter().filter(|(_, a)| a.is_active()) {
            let velocity = actor.get_velocity() + gravity * dt;
            let position = actor.get_position() + velocity * dt;
            if !velocity.is_finite() || !position.is_finite() {
                return Err(WorldError::NonFinitePosition(ActorId(key)).into());
            }
            integrated.push((key, velocity, position));
        }

        for (key, velocity, position) in integrated {
            let actor = &mut self.actors[key];
            actor.set_velocity(velocity);
            actor.set_position(position);
        }

        self.step_count += 1;

        let bp = match self.broad_phase.as_mut() {
            Some(bp) => bp,
            None => return Ok(0),
        };

        for (key, actor) in self.actors.iter() {
            bp.update_actor(ActorId(key), actor.get_bounds())?;
        }

        if self.step_count % self.config.shake_interval == 0 {
            debug!("Maintaining broad phase at step {}", self.step_count);
            bp.maintain();
        }

        let events = self.gather_events()?;
        for e in events.iter() {
            self.actors[e.actor.0].on_collision(e);
        }

        trace!("Step {} delivered {} events", self.step_count, events.len());
        Ok(events.len())
    }

    fn gather_events(&self) -> Result<Vec<CollisionEvent>> {
        let bp = match self.broad_phase.as_ref() {
            Some(bp) => bp,
            None => return Ok(vec![]),
        };

        let mut events = vec![];
        let mut candidates = vec![];

        for (key, actor) in self.actors.iter().filter(|(_, a)| a.is_active()) {
            let id = ActorId(key);
            let bounds = actor.get_bounds();
            let shape = actor.collision_shape();

            candidates.clear();
            bp.candidates(&bounds, &mut candidates);

            for c in candidates.iter() {
                let (other, penetration) = match *c {
                    Candidate::Actor(other_id) if other_id == id => continue,
                    Candidate::Actor(other_id) => {
                        let other = match self.actors.get(other_id.0) {
                            Some(o) => o,
                            None => continue,
                        };
                        let other_bounds = other.get_bounds();
                        let penetration = match (shape.as_ref(), other.collision_shape()) {
                            (Some(mine), Some(theirs)) => sat_penetration(
                                Collider::new(ColliderId::Actor(id), mine),
                                Collider::new(ColliderId::Actor(other_id), &theirs),
                            )?,
                            _ => {
                                let tie = if id < other_id { 1.0 } else { -1.0 };
                                push_out(&bounds, &other_bounds, tie)
                            }
                        };
                        (Collidee::Actor(other_id), penetration)
                    }
                    Candidate::Tile {
                        coord,
                        bounds: tile_bounds,
                        flags,
                    } => {
                        let penetration = match shape.as_ref() {
                            Some(mine) => sat_penetration(
                                Collider::new(ColliderId::Actor(id), mine),
                                Collider::new(ColliderId::Tile(coord), &tile_bounds),
                            )?,
                            // Ties push the actor up and out of the tile.
                            None => push_out(&bounds, &tile_bounds, 1.0),
                        };
                        (Collidee::Tile { coord, flags }, penetration)
                    }
                };

                if let Some(penetration) = penetration {
                    events.push(CollisionEvent {
                        actor: id,
                        other,
                        penetration,
                    });
                }
            }
        }

        Ok(events)
    }
}

fn sat_penetration<A: ConvexShape, B: ConvexShape>(
    mine: Collider<A>,
    theirs: Collider<B>,
) -> Result<Option<V2>> {
    Ok(resolve(&mine, &theirs)?.map(|c| c.mtv()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn b(x: f64, y: f64, w: f64, h: f64) -> Aabb {
        Aabb::from_position_size(V2::new(x, y), V2::new(w, h)).unwrap()
    }

    fn quadtree_world(gravity: V2) -> World<Body> {
        quadsat_logging::log_for_tests();
        let config = WorldConfigBuilder::new().gravity(gravity).build().unwrap();
        let mut world = World::new(config);
        world
            .attach_broad_phase(
                QuadTreeBroadPhase::new(b(-100.0, -100.0, 200.0, 200.0), Default::default())
                    .unwrap(),
            )
            .unwrap();
        world
    }

    #[test]
    fn config_validation() {
        assert_eq!(WorldConfigBuilder::new().build().unwrap(), WorldConfig::default());
        assert!(matches!(
            WorldConfigBuilder::new().shake_interval(0).build(),
            Err(ConfigError::ZeroShakeInterval)
        ));
        assert!(matches!(
            WorldConfigBuilder::new()
                .gravity(V2::new(f64::NAN, 0.0))
                .build(),
            Err(ConfigError::InvalidGravity(_))
        ));
    }

    #[test]
    fn only_one_broad_phase() {
        let mut world = quadtree_world(V2::ZERO);
        let res = world.attach_broad_phase(TileGrid::new(1.0, 1.0).unwrap());
        assert!(matches!(
            res,
            Err(Error::World(WorldError::BroadPhaseAlreadyAttached))
        ));
    }

    #[test]
    fn bad_time_steps() {
        let mut world = quadtree_world(V2::ZERO);
        for dt in [-1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                world.step(dt),
                Err(Error::World(WorldError::InvalidTimeStep(_)))
            ));
        }
        assert_eq!(world.get_step_count(), 0);
        assert_eq!(world.step(0.0).unwrap(), 0);
        assert_eq!(world.get_step_count(), 1);
    }

    #[test]
    fn overflowing_integration_is_an_error() {
        let mut world = World::new(WorldConfig::default());
        world.attach_broad_phase(TileGrid::new(1.0, 1.0).unwrap()).unwrap();
        let id = world
            .spawn(Body::new(V2::ZERO, V2::new(1.0, 1.0)).unwrap())
            .unwrap();

        assert!(matches!(
            world.step(1e200),
            Err(Error::World(WorldError::NonFinitePosition(a))) if a == id
        ));

        // Nothing moved, and the world still steps normally.
        let body = world.get(id).unwrap();
        assert_eq!(body.get_position(), V2::ZERO);
        assert_eq!(body.get_velocity(), V2::ZERO);
        assert_eq!(world.step(0.1).unwrap(), 0);
    }

    #[test]
    fn gravity_integrates() {
        let mut world = World::new(WorldConfig::default());
        let id = world
            .spawn(Body::new(V2::ZERO, V2::new(1.0, 1.0)).unwrap())
            .unwrap();
        world.step(0.5).unwrap();
        world.step(0.5).unwrap();

        let body = world.get(id).unwrap();
        assert_relative_eq!(body.get_velocity().y, 9.8);
        // Semi-implicit Euler: 4.9 * 0.5 + 9.8 * 0.5.
        assert_relative_eq!(body.get_position().y, 7.35, epsilon = 1e-12);
        assert_relative_eq!(body.get_position().x, 0.0);
    }

    #[test]
    fn identical_boxes_push_apart() {
        let mut world = quadtree_world(WorldConfig::DEFAULT_GRAVITY);
        let a = world
            .spawn(Body::new(V2::new(2.0, 2.0), V2::new(10.0, 10.0)).unwrap())
            .unwrap();
        let b = world
            .spawn(Body::new(V2::new(2.0, 2.0), V2::new(10.0, 10.0)).unwrap())
            .unwrap();

        assert_eq!(world.step(1.0 / 60.0).unwrap(), 2);

        let ea = world.get_mut(a).unwrap().take_collisions();
        let eb = world.get_mut(b).unwrap().take_collisions();
        assert_eq!(ea.len(), 1);
        assert_eq!(eb.len(), 1);
        assert_eq!(ea[0].other, Collidee::Actor(b));
        assert_eq!(eb[0].other, Collidee::Actor(a));

        let (pa, pb) = (ea[0].penetration, eb[0].penetration);
        assert_relative_eq!(pa.x, 0.0);
        assert_relative_eq!(pa.y.abs(), 10.0);
        assert_relative_eq!(pa.x, -pb.x);
        assert_relative_eq!(pa.y, -pb.y);
    }

    #[test]
    fn push_out_picks_the_shallow_axis() {
        let mine = b(0.0, 0.0, 2.0, 2.0);
        // Overlaps by 0.5 horizontally and 2 vertically.
        let theirs = b(1.5, 0.0, 2.0, 2.0);
        assert_eq!(push_out(&mine, &theirs, 1.0), Some(V2::new(0.5, 0.0)));
        assert_eq!(push_out(&theirs, &mine, 1.0), Some(V2::new(-0.5, 0.0)));
        assert_eq!(push_out(&mine, &b(2.0, 0.0, 1.0, 1.0), 1.0), None);
    }

    #[test]
    fn separated_actors_never_collide() {
        let mut world = quadtree_world(V2::ZERO);
        world
            .spawn(Body::new(V2::new(0.0, 0.0), V2::new(1.0, 1.0)).unwrap())
            .unwrap();
        world
            .spawn(Body::new(V2::new(1.0, 0.0), V2::new(1.0, 1.0)).unwrap())
            .unwrap();
        assert_eq!(world.step(0.1).unwrap(), 0);
    }

    #[test]
    fn bodies_land_on_tiles() {
        let mut grid = TileGrid::new(1.0, 1.0).unwrap();
        for x in -5..5 {
            grid.set(V2::new(x, 5), TileFlags::SOLID | TileFlags(8));
        }

        let mut world = World::new(
            WorldConfigBuilder::new()
                .gravity(V2::new(0.0, 10.0))
                .build()
                .unwrap(),
        );
        world.attach_broad_phase(grid).unwrap();
        let id = world
            .spawn(Body::new(V2::new(0.0, 3.5), V2::new(1.0, 1.0)).unwrap())
            .unwrap();

        let delivered = (0..30).map(|_| world.step(0.1).unwrap()).sum::<usize>();
        assert!(delivered > 0);

        let body = world.get_mut(id).unwrap();
        let bottom = body.get_bounds().get_p2().y;
        assert!((4.9..=5.0 + 1e-9).contains(&bottom), "bottom = {}", bottom);

        let hits = body.take_collisions();
        assert!(hits.iter().all(|e| match e.other {
            Collidee::Tile { coord, flags } => {
                coord == V2::new(0, 5) && flags.contains(TileFlags(8))
            }
            Collidee::Actor(_) => false,
        }));
        assert!(hits.iter().all(|e| e.penetration.x == 0.0 && e.penetration.y > 0.0));
    }

    #[test]
    fn polygons_use_separating_axes() {
        let mut world = quadtree_world(V2::ZERO);
        let square = ConvexPolygon::rectangle(V2::ZERO, V2::new(1.0, 1.0)).unwrap();
        let a = world
            .spawn(Body::from_polygon(V2::new(0.0, 0.0), square.clone()))
            .unwrap();
        let b = world
            .spawn(Body::from_polygon(V2::new(1.5, 0.0), square))
            .unwrap();

        assert_eq!(world.step(0.0).unwrap(), 2);
        let ea = world.get_mut(a).unwrap().take_collisions();
        let eb = world.get_mut(b).unwrap().take_collisions();
        assert_relative_eq!(ea[0].penetration.x, 0.5);
        assert_relative_eq!(ea[0].penetration.y, 0.0);
        assert_relative_eq!(eb[0].penetration.x, -0.5);

        // Each side backed off by the full depth, leaving a gap.
        assert_eq!(world.step(0.0).unwrap(), 0);
    }

    #[test]
    fn despawned_actors_leave_the_broad_phase() {
        let mut world = quadtree_world(V2::ZERO);
        let a = world
            .spawn(Body::new(V2::ZERO, V2::new(2.0, 2.0)).unwrap())
            .unwrap();
        world
            .spawn(Body::new(V2::new(1.0, 1.0), V2::new(2.0, 2.0)).unwrap())
            .unwrap();

        world.despawn(a).unwrap();
        assert!(matches!(
            world.despawn(a),
            Err(Error::World(WorldError::UnknownActor(_)))
        ));
        assert_eq!(world.step(0.1).unwrap(), 0);
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn inactive_actors_are_obstacles() {
        let mut world = quadtree_world(V2::new(0.0, 10.0));
        let mut floor = Body::new(V2::new(-10.0, 1.0), V2::new(20.0, 1.0)).unwrap();
        floor.set_active(false);
        let floor = world.spawn(floor).unwrap();
        let ball = world
            .spawn(Body::new(V2::new(0.0, 0.0), V2::new(0.5, 0.5)).unwrap())
            .unwrap();

        for _ in 0..20 {
            world.step(0.05).unwrap();
        }

        assert_eq!(world.get(floor).unwrap().get_position(), V2::new(-10.0, 1.0));
        let fb = world.get_mut(floor).unwrap().take_collisions();
        assert!(fb.is_empty());
        let bottom = world.get(ball).unwrap().get_bounds().get_p2().y;
        assert!(bottom <= 1.0 + 1e-9);
    }

    #[test]
    fn late_attach_indexes_existing_actors() {
        let mut world = World::new(
            WorldConfigBuilder::new()
                .gravity(V2::ZERO)
                .shake_interval(1)
                .build()
                .unwrap(),
        );
        world
            .spawn(Body::new(V2::ZERO, V2::new(2.0, 2.0)).unwrap())
            .unwrap();
        world
            .spawn(Body::new(V2::new(1.0, 0.0), V2::new(2.0, 2.0)).unwrap())
            .unwrap();
        assert_eq!(world.step(0.1).unwrap(), 0);

        world
            .attach_broad_phase(
                QuadTreeBroadPhase::new(b(-10.0, -10.0, 20.0, 20.0), Default::default())
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(world.step(0.1).unwrap(), 2);
    }
}
