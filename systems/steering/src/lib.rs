#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns a [`GoalPlan`] into the wire-level [`UnitCommand`]
//! for one tick.

use sidearm_core::{
    GoalPlan, TacticsConfig, TileGrid, TileKind, UnitCommand, UnitSnapshot, WorldProperties,
};
use sidearm_world::query;

/// Command shaper translating target positions into velocity, jump and
/// weapon-handling fields.
#[derive(Debug, Default)]
pub struct CommandShaper;

impl CommandShaper {
    /// Creates a new command shaper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Shapes the plan into a command.
    ///
    /// The horizontal request is amplified in bands so short gaps are still
    /// closed within a tick, with a final additive boost below the last band
    /// that depends on whether the target shares the agent's row. The result
    /// is clamped to the world's speed cap and always keeps the sign of the
    /// remaining gap. Jumping is requested when the target is above the agent
    /// or a wall blocks the next column in the direction of travel; otherwise
    /// the command drops through platforms so downward targets stay
    /// reachable.
    #[must_use]
    pub fn shape(
        &self,
        agent: &UnitSnapshot,
        plan: &GoalPlan,
        grid: &TileGrid,
        properties: &WorldProperties,
        config: &TacticsConfig,
    ) -> UnitCommand {
        let gap = plan.target.x - agent.position.x;
        let velocity = self.velocity_for(gap, agent, plan, properties, config);

        let jump = plan.target.y > agent.position.y
            || (gap > 0.0 && query::tile_at(grid, agent.position, 1.0, 0.0) == TileKind::Wall)
            || (gap < 0.0 && query::tile_at(grid, agent.position, -1.0, 0.0) == TileKind::Wall);

        UnitCommand {
            velocity,
            jump,
            jump_down: !jump,
            aim: plan.aim,
            shoot: plan.shoot,
            reload: plan.reload,
            swap_weapon: plan.swap_weapon,
            plant_mine: false,
        }
    }

    fn velocity_for(
        &self,
        gap: f64,
        agent: &UnitSnapshot,
        plan: &GoalPlan,
        properties: &WorldProperties,
        config: &TacticsConfig,
    ) -> f64 {
        let distance = gap.abs();

        let requested = if distance >= config.full_speed_gap {
            gap
        } else if distance >= config.double_speed_gap {
            gap * 2.0
        } else if distance >= config.triple_speed_gap {
            gap * 3.0
        } else if gap == 0.0 {
            0.0
        } else {
            let boost = if plan.target.y as i64 == agent.position.y as i64 {
                config.boost_same_row
            } else {
                config.boost_cross_row
            };
            gap + gap.signum() * boost
        };

        let cap = properties.unit_max_horizontal_speed;
        requested.clamp(-cap, cap)
    }
}
