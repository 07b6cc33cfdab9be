#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the sidearm controller.
//!
//! This crate defines the data surface that connects the external simulation
//! to the pure decision systems. The simulation delivers one immutable world
//! snapshot per tick, the systems consume the snapshot through read-only
//! value types defined here, and the tick ends with exactly one
//! [`UnitCommand`] handed back to the transport. Diagnostics flow through the
//! optional [`TraceSink`] contract and never influence control flow.

use serde::{Deserialize, Serialize};

/// Pair of real coordinates expressed in arena units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

impl Vec2 {
    /// Origin vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Reports whether both components are exactly zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Axis-aligned rectangle expressed through its corner coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Constructs a rectangle from its lower-left and upper-right corners.
    #[must_use]
    pub const fn from_corners(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Constructs a square of the given side length centered on a point.
    #[must_use]
    pub fn around(center: Vec2, side: f64) -> Self {
        let half = side / 2.0;
        Self {
            min: Vec2::new(center.x - half, center.y - half),
            max: Vec2::new(center.x + half, center.y + half),
        }
    }

    /// Constructs a unit bounding box anchored at its bottom-center point.
    #[must_use]
    pub fn bottom_center(anchor: Vec2, size: Vec2) -> Self {
        let half_width = size.x / 2.0;
        Self {
            min: Vec2::new(anchor.x - half_width, anchor.y),
            max: Vec2::new(anchor.x + half_width, anchor.y + size.y),
        }
    }

    /// Lower-left corner of the rectangle.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Upper-right corner of the rectangle.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Inclusive-boundary overlap test between two rectangles.
    ///
    /// Touching edges count as an overlap, matching the collision rules the
    /// simulation applies to bullets and blast areas.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Enumerates the tile kinds composing the level grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Traversable empty space.
    Empty,
    /// Solid wall that blocks movement, shots and detonates rockets.
    Wall,
    /// One-way platform a unit can stand on or drop through.
    Platform,
    /// Climbable ladder tile.
    Ladder,
    /// Pad that launches units upward on contact.
    JumpPad,
}

/// Immutable level tile grid indexed by truncated integer coordinates.
///
/// All accessors are bounds-safe: lookups outside `[0, width) x [0, height)`
/// resolve to [`TileKind::Empty`] rather than faulting, and the clamped
/// accessor pins both axes to the nearest valid index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    kinds: Vec<TileKind>,
    width: u32,
    height: u32,
}

impl TileGrid {
    /// Creates a grid of the given dimensions filled with one tile kind.
    #[must_use]
    pub fn filled(width: u32, height: u32, kind: TileKind) -> Self {
        let cells = (width as usize).saturating_mul(height as usize);
        Self {
            kinds: vec![kind; cells],
            width,
            height,
        }
    }

    /// Creates a grid from column-major tile data.
    ///
    /// Columns shorter than the tallest column are padded with
    /// [`TileKind::Empty`] so every accessor observes a rectangular grid.
    #[must_use]
    pub fn from_columns(columns: Vec<Vec<TileKind>>) -> Self {
        let width = u32::try_from(columns.len()).unwrap_or(u32::MAX);
        let height = columns
            .iter()
            .map(|column| column.len())
            .max()
            .unwrap_or(0);
        let height_u32 = u32::try_from(height).unwrap_or(u32::MAX);

        let mut kinds = Vec::with_capacity(columns.len() * height);
        for column in &columns {
            for row in 0..height {
                kinds.push(column.get(row).copied().unwrap_or(TileKind::Empty));
            }
        }

        Self {
            kinds,
            width,
            height: height_u32,
        }
    }

    /// Number of tile columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of tile rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Replaces the tile kind stored at the given cell.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set(&mut self, column: u32, row: u32, kind: TileKind) {
        if column < self.width && row < self.height {
            let index = column as usize * self.height as usize + row as usize;
            if let Some(slot) = self.kinds.get_mut(index) {
                *slot = kind;
            }
        }
    }

    /// Returns the tile kind at the given cell, or [`TileKind::Empty`] when
    /// either coordinate falls outside the grid.
    #[must_use]
    pub fn kind_at(&self, column: i64, row: i64) -> TileKind {
        if column < 0 || row < 0 {
            return TileKind::Empty;
        }
        if column >= i64::from(self.width) || row >= i64::from(self.height) {
            return TileKind::Empty;
        }

        let index = column as usize * self.height as usize + row as usize;
        self.kinds.get(index).copied().unwrap_or(TileKind::Empty)
    }

    /// Returns the tile kind under the given point after truncation.
    #[must_use]
    pub fn kind_at_point(&self, point: Vec2) -> TileKind {
        self.kind_at(point.x as i64, point.y as i64)
    }

    /// Returns the tile kind at the given cell with both axes clamped into
    /// the valid index range.
    ///
    /// An empty grid resolves to [`TileKind::Empty`].
    #[must_use]
    pub fn kind_at_clamped(&self, column: i64, row: i64) -> TileKind {
        if self.width == 0 || self.height == 0 {
            return TileKind::Empty;
        }

        let column = column.clamp(0, i64::from(self.width) - 1);
        let row = row.clamp(0, i64::from(self.height) - 1);
        self.kind_at(column, row)
    }
}

/// Unique identifier assigned to a player.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Classes of weapons a unit may carry or find in a loot box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Short-range automatic sidearm.
    Pistol,
    /// Automatic rifle, the preferred mid-range weapon.
    AssaultRifle,
    /// Launcher firing exploding rockets.
    RocketLauncher,
}

/// State of the weapon carried by a unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    /// Class of the weapon.
    pub kind: WeaponKind,
    /// Rounds remaining in the current magazine.
    pub magazine: u32,
    /// Rounds a full magazine holds.
    pub magazine_capacity: u32,
    /// Seconds until the weapon can fire again, when still cooling down.
    pub fire_timer: Option<f64>,
}

impl WeaponSnapshot {
    /// Reports whether the weapon can fire this tick.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.fire_timer.map_or(true, |timer| timer <= 0.0)
    }
}

/// Per-unit kinematic descriptor of the current jump.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JumpState {
    /// Vertical speed while the jump is active, in units per second.
    pub speed: f64,
    /// Seconds the jump can still be extended.
    pub max_time: f64,
    /// Whether the unit may keep rising this tick.
    pub can_jump: bool,
    /// Whether the active jump may be cancelled early.
    pub can_cancel: bool,
}

impl JumpState {
    /// Jump state of a unit standing on solid ground with a fresh jump
    /// available.
    #[must_use]
    pub const fn grounded() -> Self {
        Self {
            speed: 0.0,
            max_time: 0.55,
            can_jump: true,
            can_cancel: false,
        }
    }

    /// Reports whether the unit is currently moving upward.
    #[must_use]
    pub fn is_rising(&self) -> bool {
        self.speed > 0.0
    }
}

/// Immutable representation of a single unit's state for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unique identifier assigned to the unit.
    pub id: UnitId,
    /// Player controlling the unit; determines friend or foe.
    pub player: PlayerId,
    /// Bottom-center anchor point of the unit.
    pub position: Vec2,
    /// Width and height of the unit's bounding box.
    pub size: Vec2,
    /// Remaining health points.
    pub health: i32,
    /// Weapon currently carried, if any.
    pub weapon: Option<WeaponSnapshot>,
    /// Kinematic state of the unit's jump.
    pub jump: JumpState,
}

impl UnitSnapshot {
    /// Vertical-center point of the unit's bounding box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.y + self.size.y / 2.0)
    }

    /// Bounding box of the unit anchored at its feet.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::bottom_center(self.position, self.size)
    }

    /// Reports whether this unit opposes the given player.
    #[must_use]
    pub fn opposes(&self, player: PlayerId) -> bool {
        self.player != player
    }
}

/// Payload stored inside a loot box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum LootPayload {
    /// A weapon of the given class.
    Weapon(WeaponKind),
    /// A pickup restoring the given amount of health.
    HealthPack(i32),
}

/// Static pickup waiting to be collected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LootBoxSnapshot {
    /// Bottom-center anchor point of the box.
    pub position: Vec2,
    /// Contents granted on collection.
    pub payload: LootPayload,
}

/// Blast parameters of an exploding projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExplosionSpec {
    /// Radius of the square blast area around the detonation point.
    pub blast_radius: f64,
}

/// Immutable representation of an in-flight projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    /// Center point of the projectile.
    pub position: Vec2,
    /// Velocity in units per second.
    pub velocity: Vec2,
    /// Side length of the projectile's square collision box.
    pub size: f64,
    /// Player whose unit fired the projectile.
    pub player: PlayerId,
    /// Weapon class that fired the projectile.
    pub weapon: WeaponKind,
    /// Blast parameters when the projectile detonates on impact.
    pub explosion: Option<ExplosionSpec>,
}

/// Global simulation properties delivered with every snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldProperties {
    /// Number of simulation ticks per second.
    pub ticks_per_second: f64,
    /// Maximum health a unit can hold.
    pub unit_max_health: i32,
    /// Fastest horizontal speed a unit can request, in units per second.
    pub unit_max_horizontal_speed: f64,
    /// Rising speed of a freshly started jump, in units per second.
    pub unit_jump_speed: f64,
    /// Terminal falling speed, in units per second.
    pub unit_fall_speed: f64,
}

impl Default for WorldProperties {
    fn default() -> Self {
        Self {
            ticks_per_second: 60.0,
            unit_max_health: 100,
            unit_max_horizontal_speed: 10.0,
            unit_jump_speed: 10.0,
            unit_fall_speed: 10.0,
        }
    }
}

/// Movement and combat command emitted once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitCommand {
    /// Requested horizontal velocity in units per second.
    pub velocity: f64,
    /// Whether the unit should jump this tick.
    pub jump: bool,
    /// Whether the unit should drop through the platform it stands on.
    pub jump_down: bool,
    /// Direction the unit should aim.
    pub aim: Vec2,
    /// Whether the unit should fire its weapon.
    pub shoot: bool,
    /// Whether the unit should reload instead of firing.
    pub reload: bool,
    /// Whether the unit should pick up the weapon it stands on.
    pub swap_weapon: bool,
    /// Whether the unit should plant a mine. Present for the wire contract;
    /// the controller never requests it.
    pub plant_mine: bool,
}

/// Primary goal selected by the arbiter for the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Objective {
    /// Move to the nearest weapon box because no weapon is carried.
    AcquireWeapon,
    /// Move to or hold the nearest health pack.
    SeekHealth,
    /// Move to a weapon box offering a better or fresher weapon.
    UpgradeWeapon,
    /// Close in on the nearest enemy.
    Engage,
    /// Stay at the current position.
    Hold,
}

impl Objective {
    /// Stable label used by the diagnostic trace.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AcquireWeapon => "acquire-weapon",
            Self::SeekHealth => "seek-health",
            Self::UpgradeWeapon => "upgrade-weapon",
            Self::Engage => "engage",
            Self::Hold => "hold",
        }
    }
}

/// Kind of projectile threat the evasion override reacted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DodgeKind {
    /// A rocket-class projectile entered the threat radius.
    Explosive,
    /// A non-exploding projectile entered the threat radius.
    Bullet,
}

impl DodgeKind {
    /// Stable label used by the diagnostic trace.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Explosive => "dodge-explosive",
            Self::Bullet => "dodge-bullet",
        }
    }
}

/// Complete decision produced by the arbiter before command shaping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalPlan {
    /// Primary goal driving the target position.
    pub objective: Objective,
    /// Evasion override applied on top of the primary goal, if any.
    pub dodge: Option<DodgeKind>,
    /// Final target position for this tick; never absent.
    pub target: Vec2,
    /// Aim direction toward the nearest enemy, or zero.
    pub aim: Vec2,
    /// Whether firing is sanctioned this tick.
    pub shoot: bool,
    /// Whether reloading is requested this tick.
    pub reload: bool,
    /// Whether picking up a nearby weapon is requested this tick.
    pub swap_weapon: bool,
}

/// Thresholds and ceilings steering the decision pipeline.
///
/// Kinematic constants stay in [`WorldProperties`]; this structure only
/// carries the tunable decision parameters so historical revisions of the
/// routine collapse into one parameterized implementation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TacticsConfig {
    /// Squared distance under which a projectile triggers evasion planning.
    pub threat_radius_sq: f64,
    /// Ticks of forward simulation performed by the threat predictor.
    pub horizon_ticks: u32,
    /// Axis offset applied per evasion correction step, in arena units.
    pub evasion_step: f64,
    /// Hard ceiling on correction steps per evasion branch.
    pub evasion_max_steps: u32,
    /// Magazine level at or below which swapping weapons becomes attractive.
    pub swap_ammo_floor: u32,
    /// Horizontal tolerance within which an enemy counts as vertically
    /// aligned, making the shot unconditional.
    pub aim_column_tolerance: f64,
    /// Projected x-axis step length used by the wall raycast.
    pub raycast_step: f64,
    /// Upward nudge applied to health-pack targets resting on a platform.
    pub platform_nudge: f64,
    /// Horizontal gap at or above which the raw offset is requested as the
    /// velocity verbatim.
    pub full_speed_gap: f64,
    /// Horizontal gap at or above which the offset is requested doubled.
    pub double_speed_gap: f64,
    /// Horizontal gap at or above which the offset is requested tripled.
    pub triple_speed_gap: f64,
    /// Additive velocity boost toward targets on the agent's own row.
    pub boost_same_row: f64,
    /// Additive velocity boost toward targets on a different row.
    pub boost_cross_row: f64,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            threat_radius_sq: 36.0,
            horizon_ticks: 12,
            evasion_step: 0.1,
            evasion_max_steps: 100,
            swap_ammo_floor: 3,
            aim_column_tolerance: 0.5,
            raycast_step: 0.6,
            platform_nudge: 0.3,
            full_speed_gap: 2.7,
            double_speed_gap: 1.7,
            triple_speed_gap: 0.7,
            boost_same_row: 0.7,
            boost_cross_row: 0.4,
        }
    }
}

/// Diagnostic record describing one tick's decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickTrace {
    /// Primary goal selected for the tick.
    pub objective: Objective,
    /// Evasion override applied to the goal, if any.
    pub dodge: Option<DodgeKind>,
    /// Final target position handed to command shaping.
    pub target: Vec2,
    /// Whether the emitted command requests a shot.
    pub shoot: bool,
}

/// Write-only sink receiving one [`TickTrace`] per tick.
///
/// Implementations must never fail the tick: delivery errors are swallowed
/// inside the sink, not surfaced to the decision pipeline.
pub trait TraceSink {
    /// Records the trace for the current tick.
    fn record(&mut self, trace: &TickTrace);
}

/// Sink that discards every trace.
#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn record(&mut self, _trace: &TickTrace) {}
}
