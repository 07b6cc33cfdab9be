#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick world snapshot and read-only query layer for sidearm.
//!
//! The external simulation delivers one [`WorldSnapshot`] per tick. The
//! snapshot is immutable for the duration of the tick; decision systems
//! interrogate it exclusively through the free functions in [`query`], which
//! keeps query logic off the plain data entities and makes every lookup
//! independently testable.

use serde::{Deserialize, Serialize};
use sidearm_core::{
    BulletSnapshot, LootBoxSnapshot, TileGrid, UnitSnapshot, WorldProperties,
};

/// Authoritative world state captured at the start of a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Global simulation properties.
    pub properties: WorldProperties,
    /// Static level tile grid.
    pub grid: TileGrid,
    /// Every unit in the arena, the controlled agent included.
    pub units: Vec<UnitSnapshot>,
    /// Loot boxes still waiting to be collected.
    pub loot_boxes: Vec<LootBoxSnapshot>,
    /// Projectiles currently in flight.
    pub bullets: Vec<BulletSnapshot>,
}

impl WorldSnapshot {
    /// Assembles a snapshot from its parts.
    #[must_use]
    pub fn new(
        properties: WorldProperties,
        grid: TileGrid,
        units: Vec<UnitSnapshot>,
        loot_boxes: Vec<LootBoxSnapshot>,
        bullets: Vec<BulletSnapshot>,
    ) -> Self {
        Self {
            properties,
            grid,
            units,
            loot_boxes,
            bullets,
        }
    }
}

/// Read-only lookups over a [`WorldSnapshot`].
pub mod query {
    use sidearm_core::{
        LootBoxSnapshot, LootPayload, TileGrid, TileKind, UnitSnapshot, Vec2, WeaponKind,
    };

    use super::WorldSnapshot;

    /// Returns the opposing unit closest to the agent by squared distance.
    ///
    /// Ties resolve to the first candidate encountered in snapshot order, so
    /// identical inputs always select the identical enemy.
    #[must_use]
    pub fn nearest_enemy<'world>(
        agent: &UnitSnapshot,
        world: &'world WorldSnapshot,
    ) -> Option<&'world UnitSnapshot> {
        let mut nearest: Option<&UnitSnapshot> = None;

        for unit in &world.units {
            if !unit.opposes(agent.player) {
                continue;
            }

            let replace = match nearest {
                None => true,
                Some(current) => {
                    agent.position.distance_sq(unit.position)
                        < agent.position.distance_sq(current.position)
                }
            };
            if replace {
                nearest = Some(unit);
            }
        }

        nearest
    }

    /// Returns the nearest loot box holding a weapon, if any exists.
    #[must_use]
    pub fn nearest_weapon_box<'world>(
        agent: &UnitSnapshot,
        world: &'world WorldSnapshot,
    ) -> Option<&'world LootBoxSnapshot> {
        nearest_loot_box(agent, world, |payload| {
            matches!(payload, LootPayload::Weapon(_))
        })
    }

    /// Returns the nearest loot box holding a health pack, if any exists.
    #[must_use]
    pub fn nearest_health_box<'world>(
        agent: &UnitSnapshot,
        world: &'world WorldSnapshot,
    ) -> Option<&'world LootBoxSnapshot> {
        nearest_loot_box(agent, world, |payload| {
            matches!(payload, LootPayload::HealthPack(_))
        })
    }

    /// Weapon class held by the loot box, when the payload is a weapon.
    #[must_use]
    pub fn boxed_weapon_kind(loot_box: &LootBoxSnapshot) -> Option<WeaponKind> {
        match loot_box.payload {
            LootPayload::Weapon(kind) => Some(kind),
            LootPayload::HealthPack(_) => None,
        }
    }

    fn nearest_loot_box<'world, F>(
        agent: &UnitSnapshot,
        world: &'world WorldSnapshot,
        mut accepts: F,
    ) -> Option<&'world LootBoxSnapshot>
    where
        F: FnMut(&LootPayload) -> bool,
    {
        let mut nearest: Option<&LootBoxSnapshot> = None;

        for loot_box in &world.loot_boxes {
            if !accepts(&loot_box.payload) {
                continue;
            }

            let replace = match nearest {
                None => true,
                Some(current) => {
                    agent.position.distance_sq(loot_box.position)
                        < agent.position.distance_sq(current.position)
                }
            };
            if replace {
                nearest = Some(loot_box);
            }
        }

        nearest
    }

    /// Tile kind at the given offset from a position, truncated to the grid
    /// and clamped into the valid index range.
    #[must_use]
    pub fn tile_at(grid: &TileGrid, position: Vec2, dx: f64, dy: f64) -> TileKind {
        let column = (position.x + dx) as i64;
        let row = (position.y + dy) as i64;
        grid.kind_at_clamped(column, row)
    }

    /// Tile kind directly below the given position.
    #[must_use]
    pub fn tile_below(grid: &TileGrid, position: Vec2) -> TileKind {
        tile_at(grid, position, 0.0, -1.0)
    }

    /// Reports whether any opposing unit stands in the column adjacent to the
    /// agent on the side indicated by `direction`'s sign.
    #[must_use]
    pub fn adjacent_column_occupied(
        agent: &UnitSnapshot,
        world: &WorldSnapshot,
        direction: f64,
    ) -> bool {
        let side: i64 = if direction < 0.0 { -1 } else { 1 };
        let column = agent.position.x as i64 + side;

        world
            .units
            .iter()
            .filter(|unit| unit.opposes(agent.player))
            .any(|unit| unit.position.x as i64 == column)
    }

    /// Walks from `origin` along `direction` in fixed x-axis steps and
    /// returns the first point sampled inside a [`TileKind::Wall`] tile.
    ///
    /// The walk covers the x-extent implied by `direction`, deriving the
    /// y-offset as `dy = direction.y * dx / direction.x` so the sampled ray
    /// keeps the aim angle. A direction with zero x-extent short-circuits to
    /// `None`: vertical aim is treated as unobstructed and the caller's
    /// vertical-alignment rules govern that case instead.
    #[must_use]
    pub fn raycast_nearest_wall(
        grid: &TileGrid,
        origin: Vec2,
        direction: Vec2,
        step: f64,
    ) -> Option<Vec2> {
        if direction.x == 0.0 || step <= 0.0 {
            return None;
        }

        let advance = if direction.x > 0.0 { step } else { -step };
        let mut dx = 0.0;

        while (direction.x > 0.0 && dx <= direction.x)
            || (direction.x < 0.0 && dx >= direction.x)
        {
            let sample = Vec2::new(
                origin.x + dx,
                origin.y + direction.y * dx / direction.x,
            );

            if grid.kind_at_point(sample) == TileKind::Wall {
                return Some(sample);
            }

            dx += advance;
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use sidearm_core::{
        JumpState, LootBoxSnapshot, LootPayload, PlayerId, TileGrid, TileKind, UnitId,
        UnitSnapshot, Vec2, WeaponKind, WorldProperties,
    };

    use super::{query, WorldSnapshot};

    fn unit(id: u32, player: u32, x: f64, y: f64) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            player: PlayerId::new(player),
            position: Vec2::new(x, y),
            size: Vec2::new(0.9, 1.8),
            health: 100,
            weapon: None,
            jump: JumpState::grounded(),
        }
    }

    fn world_with(units: Vec<UnitSnapshot>, loot_boxes: Vec<LootBoxSnapshot>) -> WorldSnapshot {
        WorldSnapshot::new(
            WorldProperties::default(),
            TileGrid::filled(10, 10, TileKind::Empty),
            units,
            loot_boxes,
            Vec::new(),
        )
    }

    #[test]
    fn nearest_enemy_minimizes_squared_distance() {
        let agent = unit(1, 1, 5.0, 5.0);
        let world = world_with(
            vec![agent, unit(2, 2, 9.0, 5.0), unit(3, 2, 6.0, 5.0)],
            Vec::new(),
        );

        let enemy = query::nearest_enemy(&agent, &world).expect("enemy exists");
        assert_eq!(enemy.id, UnitId::new(3));
    }

    #[test]
    fn nearest_enemy_ignores_teammates_and_self() {
        let agent = unit(1, 1, 5.0, 5.0);
        let world = world_with(vec![agent, unit(2, 1, 5.5, 5.0)], Vec::new());

        assert!(query::nearest_enemy(&agent, &world).is_none());
    }

    #[test]
    fn nearest_enemy_ties_resolve_to_first_in_snapshot_order() {
        let agent = unit(1, 1, 5.0, 5.0);
        let world = world_with(
            vec![agent, unit(7, 2, 3.0, 5.0), unit(8, 2, 7.0, 5.0)],
            Vec::new(),
        );

        let enemy = query::nearest_enemy(&agent, &world).expect("enemy exists");
        assert_eq!(enemy.id, UnitId::new(7));
    }

    #[test]
    fn loot_lookup_filters_by_payload() {
        let agent = unit(1, 1, 0.0, 0.0);
        let world = world_with(
            vec![agent],
            vec![
                LootBoxSnapshot {
                    position: Vec2::new(2.0, 0.0),
                    payload: LootPayload::HealthPack(30),
                },
                LootBoxSnapshot {
                    position: Vec2::new(4.0, 0.0),
                    payload: LootPayload::Weapon(WeaponKind::AssaultRifle),
                },
                LootBoxSnapshot {
                    position: Vec2::new(6.0, 0.0),
                    payload: LootPayload::Weapon(WeaponKind::Pistol),
                },
            ],
        );

        let weapon = query::nearest_weapon_box(&agent, &world).expect("weapon box");
        assert_eq!(weapon.position, Vec2::new(4.0, 0.0));
        assert_eq!(
            query::boxed_weapon_kind(weapon),
            Some(WeaponKind::AssaultRifle)
        );

        let health = query::nearest_health_box(&agent, &world).expect("health box");
        assert_eq!(health.position, Vec2::new(2.0, 0.0));
        assert_eq!(query::boxed_weapon_kind(health), None);
    }

    #[test]
    fn missing_loot_kind_yields_none() {
        let agent = unit(1, 1, 0.0, 0.0);
        let world = world_with(vec![agent], Vec::new());

        assert!(query::nearest_weapon_box(&agent, &world).is_none());
        assert!(query::nearest_health_box(&agent, &world).is_none());
    }

    #[test]
    fn tile_at_clamps_out_of_range_offsets() {
        let mut grid = TileGrid::filled(4, 4, TileKind::Empty);
        grid.set(0, 0, TileKind::Wall);
        grid.set(3, 3, TileKind::Platform);

        assert_eq!(
            query::tile_at(&grid, Vec2::new(0.5, 0.5), -10.0, -10.0),
            TileKind::Wall
        );
        assert_eq!(
            query::tile_at(&grid, Vec2::new(0.5, 0.5), 50.0, 50.0),
            TileKind::Platform
        );
    }

    #[test]
    fn tile_below_reads_the_supporting_cell() {
        let mut grid = TileGrid::filled(4, 4, TileKind::Empty);
        grid.set(2, 1, TileKind::Platform);

        assert_eq!(
            query::tile_below(&grid, Vec2::new(2.5, 2.0)),
            TileKind::Platform
        );
    }

    #[test]
    fn adjacent_column_detects_opposing_units_only() {
        let agent = unit(1, 1, 5.4, 0.0);
        let world = world_with(
            vec![agent, unit(2, 2, 6.9, 0.0), unit(3, 1, 4.2, 0.0)],
            Vec::new(),
        );

        assert!(query::adjacent_column_occupied(&agent, &world, 1.0));
        assert!(!query::adjacent_column_occupied(&agent, &world, -1.0));
    }

    #[test]
    fn raycast_finds_first_wall_along_the_aim() {
        let mut grid = TileGrid::filled(12, 6, TileKind::Empty);
        grid.set(8, 2, TileKind::Wall);

        let hit = query::raycast_nearest_wall(
            &grid,
            Vec2::new(2.0, 2.5),
            Vec2::new(9.0, 0.0),
            0.6,
        )
        .expect("wall on the ray");

        assert_eq!(hit.x as i64, 8);
        assert_eq!(hit.y as i64, 2);
    }

    #[test]
    fn raycast_is_deterministic() {
        let mut grid = TileGrid::filled(12, 12, TileKind::Empty);
        grid.set(7, 8, TileKind::Wall);

        let origin = Vec2::new(1.3, 2.7);
        let direction = Vec2::new(8.0, 7.5);
        let first = query::raycast_nearest_wall(&grid, origin, direction, 0.6);
        let second = query::raycast_nearest_wall(&grid, origin, direction, 0.6);

        assert_eq!(first, second);
        assert!(first.is_some());
    }

    #[test]
    fn vertical_aim_short_circuits_to_no_wall() {
        let grid = TileGrid::filled(4, 4, TileKind::Wall);
        assert!(query::raycast_nearest_wall(
            &grid,
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 3.0),
            0.6
        )
        .is_none());
    }

    #[test]
    fn raycast_stops_at_the_direction_extent() {
        let mut grid = TileGrid::filled(12, 6, TileKind::Empty);
        grid.set(9, 2, TileKind::Wall);

        // The wall sits past the x-extent of the aim vector.
        assert!(query::raycast_nearest_wall(
            &grid,
            Vec2::new(2.0, 2.5),
            Vec2::new(4.0, 0.0),
            0.6
        )
        .is_none());
    }
}
