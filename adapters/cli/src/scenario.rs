use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};
use sidearm_core::{
    BulletSnapshot, ExplosionSpec, JumpState, LootBoxSnapshot, LootPayload, PlayerId, TileGrid,
    TileKind, UnitId, UnitSnapshot, Vec2, WeaponKind, WeaponSnapshot, WorldProperties,
};
use sidearm_world::WorldSnapshot;

/// Default unit footprint applied when a scenario omits one.
const DEFAULT_UNIT_SIZE: (f64, f64) = (0.9, 1.8);

/// Hand-editable arena description loaded from a JSON file.
///
/// The grid is drawn as rows of characters, top row first: `.` empty,
/// `#` wall, `-` platform, `H` ladder and `^` jump pad.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioFile {
    /// Arena rows, drawn top-to-bottom.
    pub grid: Vec<String>,
    /// World constants; defaults apply when absent.
    #[serde(default)]
    pub properties: Option<WorldProperties>,
    /// Units present at the start of the scenario.
    pub units: Vec<ScenarioUnit>,
    /// Pickups present at the start of the scenario.
    #[serde(default)]
    pub loot: Vec<ScenarioLoot>,
    /// Projectiles already in flight.
    #[serde(default)]
    pub bullets: Vec<ScenarioBullet>,
}

/// Unit entry within a scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioUnit {
    /// Unique unit identifier.
    pub id: u32,
    /// Owning player identifier.
    pub player: u32,
    /// Bottom-center x coordinate.
    pub x: f64,
    /// Bottom-center y coordinate.
    pub y: f64,
    /// Starting health; the world maximum applies when absent.
    #[serde(default)]
    pub health: Option<i32>,
    /// Carried weapon, if any.
    #[serde(default)]
    pub weapon: Option<ScenarioWeapon>,
}

/// Weapon entry within a scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioWeapon {
    /// Weapon class.
    pub kind: WeaponKind,
    /// Rounds in the magazine.
    pub magazine: u32,
    /// Rounds a full magazine holds.
    pub magazine_capacity: u32,
    /// Remaining cooldown in seconds, if still cooling down.
    #[serde(default)]
    pub fire_timer: Option<f64>,
}

/// Pickup entry within a scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioLoot {
    /// Bottom-center x coordinate.
    pub x: f64,
    /// Bottom-center y coordinate.
    pub y: f64,
    /// Contents of the box.
    pub payload: LootPayload,
}

/// Projectile entry within a scenario file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct ScenarioBullet {
    /// Current x coordinate.
    pub x: f64,
    /// Current y coordinate.
    pub y: f64,
    /// Horizontal velocity in units per second.
    pub vx: f64,
    /// Vertical velocity in units per second.
    pub vy: f64,
    /// Firing player identifier.
    pub player: u32,
    /// Weapon class that fired the projectile.
    pub weapon: WeaponKind,
    /// Edge length of the projectile's square hitbox.
    #[serde(default = "default_bullet_size")]
    pub size: f64,
    /// Blast radius for detonating projectiles.
    #[serde(default)]
    pub blast_radius: Option<f64>,
}

fn default_bullet_size() -> f64 {
    0.2
}

impl ScenarioFile {
    /// Parses a scenario from its JSON source text.
    pub(crate) fn parse(source: &str) -> Result<Self, ScenarioError> {
        serde_json::from_str(source).map_err(ScenarioError::InvalidJson)
    }

    /// Builds the starting world snapshot described by the scenario.
    pub(crate) fn into_world(self) -> Result<WorldSnapshot, ScenarioError> {
        let grid = parse_grid(&self.grid)?;
        let properties = self.properties.unwrap_or_default();

        if self.units.is_empty() {
            return Err(ScenarioError::NoUnits);
        }

        let units = self
            .units
            .into_iter()
            .map(|unit| build_unit(unit, &properties))
            .collect();

        let loot_boxes = self
            .loot
            .into_iter()
            .map(|entry| LootBoxSnapshot {
                position: Vec2::new(entry.x, entry.y),
                payload: entry.payload,
            })
            .collect();

        let bullets = self
            .bullets
            .into_iter()
            .map(|entry| BulletSnapshot {
                position: Vec2::new(entry.x, entry.y),
                velocity: Vec2::new(entry.vx, entry.vy),
                size: entry.size,
                player: PlayerId::new(entry.player),
                weapon: entry.weapon,
                explosion: entry
                    .blast_radius
                    .map(|blast_radius| ExplosionSpec { blast_radius }),
            })
            .collect();

        Ok(WorldSnapshot::new(
            properties, grid, units, loot_boxes, bullets,
        ))
    }
}

fn build_unit(unit: ScenarioUnit, properties: &WorldProperties) -> UnitSnapshot {
    UnitSnapshot {
        id: UnitId::new(unit.id),
        player: PlayerId::new(unit.player),
        position: Vec2::new(unit.x, unit.y),
        size: Vec2::new(DEFAULT_UNIT_SIZE.0, DEFAULT_UNIT_SIZE.1),
        health: unit.health.unwrap_or(properties.unit_max_health),
        weapon: unit.weapon.map(|weapon| WeaponSnapshot {
            kind: weapon.kind,
            magazine: weapon.magazine,
            magazine_capacity: weapon.magazine_capacity,
            fire_timer: weapon.fire_timer,
        }),
        jump: JumpState::grounded(),
    }
}

fn parse_grid(rows: &[String]) -> Result<TileGrid, ScenarioError> {
    if rows.is_empty() {
        return Err(ScenarioError::EmptyGrid);
    }

    let width = rows[0].chars().count();
    if width == 0 {
        return Err(ScenarioError::EmptyGrid);
    }

    for (index, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(ScenarioError::RaggedRow {
                row: index,
                expected: width,
                found: row.chars().count(),
            });
        }
    }

    // Rows are drawn top first; the grid stores row zero at the bottom.
    let mut columns = vec![Vec::with_capacity(rows.len()); width];
    for row in rows.iter().rev() {
        for (column, symbol) in row.chars().enumerate() {
            let kind = tile_for(symbol).ok_or(ScenarioError::UnknownTile(symbol))?;
            columns[column].push(kind);
        }
    }

    Ok(TileGrid::from_columns(columns))
}

fn tile_for(symbol: char) -> Option<TileKind> {
    match symbol {
        '.' => Some(TileKind::Empty),
        '#' => Some(TileKind::Wall),
        '-' => Some(TileKind::Platform),
        'H' => Some(TileKind::Ladder),
        '^' => Some(TileKind::JumpPad),
        _ => None,
    }
}

/// Errors that can occur while loading a scenario file.
#[derive(Debug)]
pub(crate) enum ScenarioError {
    /// The file was not valid JSON for the scenario schema.
    InvalidJson(serde_json::Error),
    /// The grid contained no rows or no columns.
    EmptyGrid,
    /// A grid row disagreed with the width of the first row.
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width actually found.
        found: usize,
    },
    /// The grid used a character with no tile meaning.
    UnknownTile(char),
    /// The scenario declared no units.
    NoUnits,
}

impl fmt::Display for ScenarioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidJson(error) => write!(f, "could not parse scenario: {error}"),
            Self::EmptyGrid => write!(f, "scenario grid has no tiles"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "grid row {row} is {found} tiles wide, expected {expected}"
            ),
            Self::UnknownTile(symbol) => write!(f, "unknown grid character '{symbol}'"),
            Self::NoUnits => write!(f, "scenario declares no units"),
        }
    }
}

impl Error for ScenarioError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(error) => Some(error),
            _ => None,
        }
    }
}
