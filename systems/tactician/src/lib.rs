#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Top-level per-tick controller composing goal arbitration and command
//! shaping behind a single entry point.

use sidearm_core::{TacticsConfig, TickTrace, TraceSink, UnitCommand, UnitSnapshot};
use sidearm_system_arbiter::GoalArbiter;
use sidearm_system_steering::CommandShaper;
use sidearm_world::WorldSnapshot;

/// Per-tick tactical controller for one unit.
///
/// The controller is stateless across ticks: every call to [`Tactician::act`]
/// derives the command from the snapshot alone, so identical snapshots always
/// produce identical commands.
#[derive(Debug, Default)]
pub struct Tactician {
    config: TacticsConfig,
    arbiter: GoalArbiter,
    shaper: CommandShaper,
}

impl Tactician {
    /// Creates a controller with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a controller with explicit tuning.
    #[must_use]
    pub fn with_config(config: TacticsConfig) -> Self {
        Self {
            config,
            arbiter: GoalArbiter::new(),
            shaper: CommandShaper::new(),
        }
    }

    /// Active tuning parameters.
    #[must_use]
    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    /// Produces the command for `agent` against the current world snapshot
    /// and records one diagnostic trace in `sink`.
    pub fn act(
        &self,
        agent: &UnitSnapshot,
        world: &WorldSnapshot,
        sink: &mut dyn TraceSink,
    ) -> UnitCommand {
        let plan = self.arbiter.decide(agent, world, &self.config);
        let command = self
            .shaper
            .shape(agent, &plan, &world.grid, &world.properties, &self.config);

        sink.record(&TickTrace {
            objective: plan.objective,
            dodge: plan.dodge,
            target: plan.target,
            shoot: command.shoot,
        });

        command
    }
}
