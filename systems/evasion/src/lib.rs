#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that searches for a collision-free target position when a
//! projectile threatens the currently intended one.

use sidearm_core::{BulletSnapshot, TacticsConfig, TileKind, UnitSnapshot, Vec2};
use sidearm_system_threat::ThreatPredictor;
use sidearm_world::{query, WorldSnapshot};

/// Evasion planner that perturbs the intended target along one axis at a
/// time until the threat predictor clears the candidate.
#[derive(Debug, Default)]
pub struct EvasionPlanner {
    predictor: ThreatPredictor,
}

impl EvasionPlanner {
    /// Creates a new evasion planner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a target position the predictor reports as collision-free
    /// against `bullet`, preferring the smallest behavioral change.
    ///
    /// When the intended position is already safe it is returned unchanged.
    /// Corrections are attempted in strict order: cancel the rise, extend the
    /// rise, displace laterally (intended direction first), and finally rise
    /// as a last resort against a closing projectile. Every branch is bounded
    /// by the configured step ceiling and by the grid extent; when no branch
    /// succeeds the intended position is returned so the tick degrades
    /// gracefully instead of failing.
    #[must_use]
    pub fn plan(
        &self,
        agent: &UnitSnapshot,
        bullet: &BulletSnapshot,
        intended: Vec2,
        world: &WorldSnapshot,
        config: &TacticsConfig,
    ) -> Vec2 {
        if !self.threatens(agent, intended, bullet, world, config) {
            return intended;
        }

        let jump = agent.jump;

        if jump.is_rising()
            && jump.can_cancel
            && query::tile_below(&world.grid, agent.position) != TileKind::Wall
        {
            if let Some(safe) =
                self.search(agent, bullet, intended, world, config, Vec2::new(0.0, -1.0))
            {
                return safe;
            }
        }

        if jump.is_rising() && jump.can_jump && jump.max_time > 0.0 {
            if let Some(safe) =
                self.search(agent, bullet, intended, world, config, Vec2::new(0.0, 1.0))
            {
                return safe;
            }
        }

        let ahead = if intended.x < agent.position.x { -1.0 } else { 1.0 };
        for side in [ahead, -ahead] {
            if query::tile_at(&world.grid, agent.position, side, 0.0) == TileKind::Wall {
                continue;
            }
            if query::adjacent_column_occupied(agent, world, side) {
                continue;
            }
            if let Some(safe) =
                self.search(agent, bullet, intended, world, config, Vec2::new(side, 0.0))
            {
                return safe;
            }
        }

        let closing = (bullet.velocity.x > 0.0 && bullet.position.x < agent.position.x)
            || (bullet.velocity.x < 0.0 && bullet.position.x > agent.position.x);
        if closing && jump.can_jump {
            if let Some(safe) =
                self.search(agent, bullet, intended, world, config, Vec2::new(0.0, 1.0))
            {
                return safe;
            }
        }

        intended
    }

    /// Reports whether the predictor flags the intended position as a future
    /// collision with `bullet`.
    #[must_use]
    pub fn threatens(
        &self,
        agent: &UnitSnapshot,
        intended: Vec2,
        bullet: &BulletSnapshot,
        world: &WorldSnapshot,
        config: &TacticsConfig,
    ) -> bool {
        self.predictor.collides(
            agent,
            intended,
            bullet,
            &world.grid,
            &world.properties,
            config,
        )
    }

    fn search(
        &self,
        agent: &UnitSnapshot,
        bullet: &BulletSnapshot,
        intended: Vec2,
        world: &WorldSnapshot,
        config: &TacticsConfig,
        direction: Vec2,
    ) -> Option<Vec2> {
        let width = f64::from(world.grid.width());
        let height = f64::from(world.grid.height());
        let mut candidate = intended;

        for _ in 0..config.evasion_max_steps {
            candidate.x += direction.x * config.evasion_step;
            candidate.y += direction.y * config.evasion_step;

            if candidate.x < 0.0 || candidate.x > width || candidate.y < 0.0 || candidate.y > height
            {
                return None;
            }

            if !self.threatens(agent, candidate, bullet, world, config) {
                return Some(candidate);
            }
        }

        None
    }
}
