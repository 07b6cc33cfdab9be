#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that forward-simulates projectile and agent kinematics to
//! detect future collisions within a bounded tick horizon.

use sidearm_core::{
    BulletSnapshot, Rect, TacticsConfig, TileGrid, TileKind, UnitSnapshot, Vec2, WorldProperties,
};

/// Threat predictor evaluating candidate trajectories against one projectile.
#[derive(Debug, Default)]
pub struct ThreatPredictor;

impl ThreatPredictor {
    /// Creates a new threat predictor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reports whether moving the agent toward `target` collides with
    /// `bullet` within the configured horizon.
    ///
    /// Each simulated tick advances the bullet by its velocity and the agent
    /// by the velocity implied by the candidate target: full horizontal speed
    /// toward the target (stopping on arrival), rising at jump speed while
    /// the target is above and the jump state permits it, otherwise falling
    /// at terminal speed unless a wall supports the agent from below. All
    /// rates are scaled by the world's ticks-per-second. Three conditions
    /// count as a collision: a direct overlap with the bullet, a blast
    /// overlap once the bullet detonates inside a wall, and the agent's own
    /// predicted position ending up inside a wall, so callers never certify
    /// an impossible trajectory. A bullet that stops in a wall without
    /// reaching the agent is harmless from then on, but the agent keeps
    /// being simulated for the rest of the horizon.
    #[must_use]
    pub fn collides(
        &self,
        agent: &UnitSnapshot,
        target: Vec2,
        bullet: &BulletSnapshot,
        grid: &TileGrid,
        properties: &WorldProperties,
        config: &TacticsConfig,
    ) -> bool {
        if properties.ticks_per_second <= 0.0 {
            return false;
        }
        let dt = 1.0 / properties.ticks_per_second;

        let mut bullet_position = bullet.position;
        let mut agent_position = agent.position;
        let mut bullet_live = true;

        for _ in 0..config.horizon_ticks {
            if bullet_live {
                bullet_position.x += bullet.velocity.x * dt;
                bullet_position.y += bullet.velocity.y * dt;
            }

            let max_step = properties.unit_max_horizontal_speed * dt;
            agent_position.x += (target.x - agent_position.x).clamp(-max_step, max_step);

            let fall_step = properties.unit_fall_speed * dt;
            if target.y > agent_position.y && agent.jump.can_jump {
                agent_position.y += rise_speed(agent, properties) * dt;
            } else {
                let support = Vec2::new(agent_position.x, agent_position.y - fall_step);
                if grid.kind_at_point(support) != TileKind::Wall {
                    agent_position.y -= fall_step;
                }
            }

            let agent_box = Rect::bottom_center(agent_position, agent.size);

            if bullet_live {
                if Rect::around(bullet_position, bullet.size).overlaps(&agent_box) {
                    return true;
                }

                if grid.kind_at_point(bullet_position) == TileKind::Wall {
                    // The bullet is spent: it detonates here or it is
                    // harmless for the rest of the horizon.
                    if let Some(explosion) = bullet.explosion {
                        if Rect::around(bullet_position, explosion.blast_radius * 2.0)
                            .overlaps(&agent_box)
                        {
                            return true;
                        }
                    }
                    bullet_live = false;
                }
            }

            if grid.kind_at_point(agent_position) == TileKind::Wall {
                return true;
            }
        }

        false
    }
}

fn rise_speed(agent: &UnitSnapshot, properties: &WorldProperties) -> f64 {
    if agent.jump.speed > 0.0 {
        agent.jump.speed
    } else {
        properties.unit_jump_speed
    }
}
