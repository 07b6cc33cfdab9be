#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that ranks competing goals for one agent and produces a
//! [`GoalPlan`] for the tick.

use sidearm_core::{
    BulletSnapshot, DodgeKind, GoalPlan, LootBoxSnapshot, Objective, TacticsConfig, TileKind,
    UnitSnapshot, Vec2, WeaponKind, WeaponSnapshot,
};
use sidearm_system_evasion::EvasionPlanner;
use sidearm_world::{query, WorldSnapshot};

/// Goal arbiter combining objective selection, evasion overrides and the
/// fire-control decision into one plan per tick.
#[derive(Debug, Default)]
pub struct GoalArbiter {
    planner: EvasionPlanner,
}

impl GoalArbiter {
    /// Creates a new goal arbiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the plan for the current tick.
    ///
    /// Objectives are ranked in fixed priority order: acquire a first weapon,
    /// seek health, upgrade an unsatisfying weapon, engage the nearest enemy,
    /// and finally hold position. Evasion is applied strictly after the
    /// primary goal: when a hostile projectile sits inside the threat radius
    /// the chosen target is handed to the evasion planner and the corrected
    /// position replaces it.
    #[must_use]
    pub fn decide(
        &self,
        agent: &UnitSnapshot,
        world: &WorldSnapshot,
        config: &TacticsConfig,
    ) -> GoalPlan {
        let enemy = query::nearest_enemy(agent, world);
        let weapon_box = query::nearest_weapon_box(agent, world);
        let boxed_kind = weapon_box.and_then(query::boxed_weapon_kind);

        let (objective, target) = self.rank_objectives(agent, world, config, enemy, weapon_box);

        let (dodge, target) = self.apply_evasion(agent, world, config, target);

        let aim = match enemy {
            Some(enemy) => Vec2::new(
                enemy.position.x - agent.position.x,
                enemy.position.y - agent.position.y,
            ),
            None => Vec2::ZERO,
        };

        let shoot = match (agent.weapon.as_ref(), enemy) {
            (Some(_), Some(enemy)) => self.clear_shot(agent, enemy, world, config),
            _ => false,
        };

        let reload = !shoot
            && agent
                .weapon
                .as_ref()
                .map_or(false, |weapon| weapon.magazine < weapon.magazine_capacity / 2);

        let swap_weapon = wants_swap(agent.weapon.as_ref(), boxed_kind, config);

        GoalPlan {
            objective,
            dodge,
            target,
            aim,
            shoot,
            reload,
            swap_weapon,
        }
    }

    fn rank_objectives(
        &self,
        agent: &UnitSnapshot,
        world: &WorldSnapshot,
        config: &TacticsConfig,
        enemy: Option<&UnitSnapshot>,
        weapon_box: Option<&LootBoxSnapshot>,
    ) -> (Objective, Vec2) {
        if agent.weapon.is_none() {
            if let Some(found) = weapon_box {
                return (Objective::AcquireWeapon, found.position);
            }
        }

        if let Some(pack) = query::nearest_health_box(agent, world) {
            let mut target = pack.position;
            // Packs resting on a platform are approached from slightly above
            // so the pickup box is actually entered.
            if query::tile_below(&world.grid, pack.position) == TileKind::Platform {
                target.y += config.platform_nudge;
            }
            return (Objective::SeekHealth, target);
        }

        if let Some(found) = weapon_box {
            let boxed_kind = query::boxed_weapon_kind(found);
            if wants_swap(agent.weapon.as_ref(), boxed_kind, config) {
                return (Objective::UpgradeWeapon, found.position);
            }
        }

        if let Some(enemy) = enemy {
            return (Objective::Engage, enemy.position);
        }

        (Objective::Hold, agent.position)
    }

    fn apply_evasion(
        &self,
        agent: &UnitSnapshot,
        world: &WorldSnapshot,
        config: &TacticsConfig,
        intended: Vec2,
    ) -> (Option<DodgeKind>, Vec2) {
        let center = agent.center();
        let in_radius = |bullet: &&BulletSnapshot| {
            bullet.player != agent.player
                && center.distance_sq(bullet.position) <= config.threat_radius_sq
        };

        // Explosive projectiles outrank plain bullets regardless of order.
        let threat = world
            .bullets
            .iter()
            .filter(|bullet| in_radius(bullet))
            .find(|bullet| bullet.explosion.is_some())
            .map(|bullet| (DodgeKind::Explosive, bullet))
            .or_else(|| {
                world
                    .bullets
                    .iter()
                    .find(|bullet| in_radius(bullet))
                    .map(|bullet| (DodgeKind::Bullet, bullet))
            });

        match threat {
            Some((kind, bullet)) => {
                let corrected = self.planner.plan(agent, bullet, intended, world, config);
                (Some(kind), corrected)
            }
            None => (None, intended),
        }
    }

    /// Fire-control gate: a vertically aligned enemy is always shootable,
    /// otherwise no wall may sit strictly closer than the enemy along the
    /// aim line.
    fn clear_shot(
        &self,
        agent: &UnitSnapshot,
        enemy: &UnitSnapshot,
        world: &WorldSnapshot,
        config: &TacticsConfig,
    ) -> bool {
        if (enemy.position.x - agent.position.x).abs() <= config.aim_column_tolerance {
            return true;
        }

        let aim = Vec2::new(
            enemy.position.x - agent.position.x,
            enemy.position.y - agent.position.y,
        );

        match query::raycast_nearest_wall(&world.grid, agent.position, aim, config.raycast_step) {
            Some(hit) => {
                agent.position.distance_sq(hit) >= agent.position.distance_sq(enemy.position)
            }
            None => true,
        }
    }
}

fn wants_swap(
    weapon: Option<&WeaponSnapshot>,
    boxed_kind: Option<WeaponKind>,
    config: &TacticsConfig,
) -> bool {
    let Some(weapon) = weapon else {
        return true;
    };

    let upgrade_available = boxed_kind == Some(WeaponKind::AssaultRifle)
        && weapon.kind != WeaponKind::AssaultRifle
        && !weapon.is_ready();

    upgrade_available || weapon.magazine <= config.swap_ammo_floor
}

#[cfg(test)]
mod tests {
    use sidearm_core::{
        BulletSnapshot, DodgeKind, ExplosionSpec, JumpState, LootBoxSnapshot, LootPayload,
        Objective, PlayerId, TacticsConfig, TileGrid, TileKind, UnitId, UnitSnapshot, Vec2,
        WeaponKind, WeaponSnapshot, WorldProperties,
    };
    use sidearm_world::WorldSnapshot;

    use super::GoalArbiter;

    fn agent_at(x: f64, y: f64, weapon: Option<WeaponSnapshot>) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(1),
            player: PlayerId::new(1),
            position: Vec2::new(x, y),
            size: Vec2::new(0.9, 1.8),
            health: 100,
            weapon,
            jump: JumpState::grounded(),
        }
    }

    fn enemy_at(x: f64, y: f64) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(2),
            player: PlayerId::new(2),
            ..agent_at(x, y, None)
        }
    }

    fn rifle(magazine: u32) -> WeaponSnapshot {
        WeaponSnapshot {
            kind: WeaponKind::AssaultRifle,
            magazine,
            magazine_capacity: 30,
            fire_timer: None,
        }
    }

    fn weapon_box(x: f64, y: f64, kind: WeaponKind) -> LootBoxSnapshot {
        LootBoxSnapshot {
            position: Vec2::new(x, y),
            payload: LootPayload::Weapon(kind),
        }
    }

    fn health_box(x: f64, y: f64) -> LootBoxSnapshot {
        LootBoxSnapshot {
            position: Vec2::new(x, y),
            payload: LootPayload::HealthPack(50),
        }
    }

    fn world(
        grid: TileGrid,
        units: Vec<UnitSnapshot>,
        loot: Vec<LootBoxSnapshot>,
        bullets: Vec<BulletSnapshot>,
    ) -> WorldSnapshot {
        WorldSnapshot::new(WorldProperties::default(), grid, units, loot, bullets)
    }

    fn open_grid() -> TileGrid {
        TileGrid::filled(30, 10, TileKind::Empty)
    }

    #[test]
    fn unarmed_agent_pursues_the_nearest_weapon_box() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, None);
        let world = world(
            open_grid(),
            vec![agent, enemy_at(20.0, 1.0)],
            vec![weapon_box(10.0, 1.0, WeaponKind::Pistol)],
            Vec::new(),
        );

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::AcquireWeapon);
        assert_eq!(plan.target, Vec2::new(10.0, 1.0));
        assert!(!plan.shoot, "no weapon means no shot");
        assert!(plan.swap_weapon, "unarmed agent always wants the pickup");
    }

    #[test]
    fn health_pack_outranks_engaging_the_enemy() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let world = world(
            open_grid(),
            vec![agent, enemy_at(8.0, 1.0)],
            vec![health_box(15.0, 1.0)],
            Vec::new(),
        );

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::SeekHealth);
        assert_eq!(plan.target, Vec2::new(15.0, 1.0));
    }

    #[test]
    fn platform_mounted_health_pack_is_targeted_from_above() {
        let arbiter = GoalArbiter::new();
        let config = TacticsConfig::default();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let mut grid = open_grid();
        grid.set(15, 3, TileKind::Platform);
        let world = world(
            grid,
            vec![agent],
            vec![health_box(15.5, 4.0)],
            Vec::new(),
        );

        let plan = arbiter.decide(&agent, &world, &config);

        assert_eq!(plan.objective, Objective::SeekHealth);
        assert_eq!(plan.target, Vec2::new(15.5, 4.0 + config.platform_nudge));
    }

    #[test]
    fn cooling_pistol_upgrades_to_a_boxed_rifle() {
        let arbiter = GoalArbiter::new();
        let pistol = WeaponSnapshot {
            kind: WeaponKind::Pistol,
            magazine: 8,
            magazine_capacity: 8,
            fire_timer: Some(0.5),
        };
        let agent = agent_at(5.0, 1.0, Some(pistol));
        let world = world(
            open_grid(),
            vec![agent, enemy_at(20.0, 1.0)],
            vec![weapon_box(10.0, 1.0, WeaponKind::AssaultRifle)],
            Vec::new(),
        );

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::UpgradeWeapon);
        assert!(plan.swap_weapon);
    }

    #[test]
    fn low_magazine_requests_a_swap_without_changing_course() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(2)));
        let world = world(
            open_grid(),
            vec![agent, enemy_at(8.0, 1.0)],
            Vec::new(),
            Vec::new(),
        );

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        // No weapon box in the world: the agent keeps engaging but flags the
        // swap so any pickup it crosses is taken.
        assert_eq!(plan.objective, Objective::Engage);
        assert!(plan.swap_weapon);
    }

    #[test]
    fn armed_agent_engages_the_nearest_enemy() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let near = enemy_at(9.0, 1.0);
        let far = enemy_at(25.0, 1.0);
        let world = world(open_grid(), vec![agent, near, far], Vec::new(), Vec::new());

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::Engage);
        assert_eq!(plan.target, near.position);
        assert_eq!(plan.aim, Vec2::new(4.0, 0.0));
        assert!(plan.shoot, "open line of fire");
        assert!(!plan.reload);
    }

    #[test]
    fn empty_world_holds_position() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let world = world(open_grid(), vec![agent], Vec::new(), Vec::new());

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::Hold);
        assert_eq!(plan.target, agent.position);
        assert_eq!(plan.aim, Vec2::ZERO);
        assert!(!plan.shoot);
    }

    #[test]
    fn wall_between_agent_and_enemy_vetoes_the_shot() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(2.0, 1.0, Some(rifle(30)));
        let enemy = enemy_at(10.0, 1.0);
        let mut grid = open_grid();
        for row in 0..10 {
            grid.set(5, row, TileKind::Wall);
        }
        let world = world(grid, vec![agent, enemy], Vec::new(), Vec::new());

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.objective, Objective::Engage);
        assert!(!plan.shoot, "wall is strictly closer than the enemy");
        assert!(!plan.reload, "full magazine never reloads");
    }

    #[test]
    fn vertically_aligned_enemy_is_always_shootable() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let enemy = enemy_at(5.2, 6.0);
        // A platform between the two would confuse any raycast; vertical
        // alignment bypasses it entirely.
        let mut grid = open_grid();
        grid.set(5, 3, TileKind::Wall);
        let world = world(grid, vec![agent, enemy], Vec::new(), Vec::new());

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert!(plan.shoot);
    }

    #[test]
    fn half_empty_magazine_reloads_when_no_shot_is_available() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(2.0, 1.0, Some(rifle(10)));
        let enemy = enemy_at(10.0, 1.0);
        let mut grid = open_grid();
        for row in 0..10 {
            grid.set(5, row, TileKind::Wall);
        }
        let world = world(grid, vec![agent, enemy], Vec::new(), Vec::new());

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert!(!plan.shoot);
        assert!(plan.reload);
    }

    #[test]
    fn no_projectile_in_radius_means_no_dodge() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let enemy = enemy_at(9.0, 1.0);
        let distant = BulletSnapshot {
            position: Vec2::new(25.0, 8.0),
            velocity: Vec2::new(-50.0, 0.0),
            size: 0.2,
            player: PlayerId::new(2),
            weapon: WeaponKind::AssaultRifle,
            explosion: None,
        };
        let world = world(open_grid(), vec![agent, enemy], Vec::new(), vec![distant]);

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.dodge, None);
        assert_eq!(plan.target, enemy.position);
    }

    #[test]
    fn explosive_projectile_in_radius_outranks_a_closer_bullet() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let plain = BulletSnapshot {
            position: Vec2::new(6.0, 1.9),
            velocity: Vec2::new(-50.0, 0.0),
            size: 0.2,
            player: PlayerId::new(2),
            weapon: WeaponKind::AssaultRifle,
            explosion: None,
        };
        let rocket = BulletSnapshot {
            position: Vec2::new(8.0, 1.9),
            velocity: Vec2::new(-30.0, 0.0),
            size: 0.4,
            weapon: WeaponKind::RocketLauncher,
            explosion: Some(ExplosionSpec { blast_radius: 3.0 }),
            ..plain
        };
        let mut grid = open_grid();
        for column in 0..30 {
            grid.set(column, 0, TileKind::Wall);
        }
        let world = world(grid, vec![agent], Vec::new(), vec![plain, rocket]);

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.dodge, Some(DodgeKind::Explosive));
    }

    #[test]
    fn own_bullets_never_trigger_a_dodge() {
        let arbiter = GoalArbiter::new();
        let agent = agent_at(5.0, 1.0, Some(rifle(30)));
        let own = BulletSnapshot {
            position: Vec2::new(6.0, 1.9),
            velocity: Vec2::new(50.0, 0.0),
            size: 0.2,
            player: agent.player,
            weapon: WeaponKind::AssaultRifle,
            explosion: None,
        };
        let world = world(open_grid(), vec![agent], Vec::new(), vec![own]);

        let plan = arbiter.decide(&agent, &world, &TacticsConfig::default());

        assert_eq!(plan.dodge, None);
    }
}
