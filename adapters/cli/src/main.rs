#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line harness that loads or generates an arena and drives the
//! tactical controller tick by tick, printing one trace line per decision.

mod scenario;

use std::{
    fs,
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::Parser;
use rand::{Rng as _, SeedableRng as _};
use rand_chacha::ChaCha8Rng;
use sidearm_core::{
    BulletSnapshot, DodgeKind, JumpState, LootBoxSnapshot, LootPayload, PlayerId, TickTrace,
    TileGrid, TileKind, TraceSink, UnitCommand, UnitId, UnitSnapshot, Vec2, WeaponKind,
    WeaponSnapshot, WorldProperties,
};
use sidearm_tactician::Tactician;
use sidearm_world::WorldSnapshot;

use crate::scenario::ScenarioFile;

/// Ticks between shots fired by the scripted enemy.
const ENEMY_FIRE_INTERVAL: u32 = 30;
/// Muzzle speed of the scripted enemy's bullets, in units per second.
const ENEMY_BULLET_SPEED: f64 = 48.0;

#[derive(Debug, Parser)]
#[command(name = "sidearm", about = "Tick-by-tick tactical controller harness")]
struct Args {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 120)]
    ticks: u32,
    /// Seed for the generated arena when no scenario file is given.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Path to a JSON scenario file describing the arena.
    #[arg(long)]
    scenario: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut world = match &args.scenario {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            ScenarioFile::parse(&source)?.into_world()?
        }
        None => generated_arena(args.seed),
    };

    anyhow::ensure!(
        world.properties.ticks_per_second > 0.0,
        "ticks per second must be positive"
    );
    let dt = 1.0 / world.properties.ticks_per_second;

    let tactician = Tactician::new();
    let mut sink = StdoutTraceSink::default();

    for tick in 0..args.ticks {
        if tick % ENEMY_FIRE_INTERVAL == 0 {
            spawn_enemy_fire(&mut world);
        }

        let Some(agent) = world.units.first().copied() else {
            break;
        };
        let command = tactician.act(&agent, &world, &mut sink);
        advance(&mut world, command, dt);
    }

    println!("simulated {} ticks", args.ticks);
    Ok(())
}

/// Sink printing one line per tick to standard output.
///
/// Write failures are swallowed so a closed pipe never aborts the run.
#[derive(Debug, Default)]
struct StdoutTraceSink {
    tick: u32,
}

impl TraceSink for StdoutTraceSink {
    fn record(&mut self, trace: &TickTrace) {
        let dodge = trace.dodge.map_or("none", DodgeKind::label);
        let mut stdout = io::stdout().lock();
        let _ = writeln!(
            stdout,
            "tick {:>4} objective={} dodge={} target=({:.2}, {:.2}) shoot={}",
            self.tick,
            trace.objective.label(),
            dodge,
            trace.target.x,
            trace.target.y,
            trace.shoot
        );
        self.tick += 1;
    }
}

/// Minimal integrator keeping the demo arena moving between decisions.
///
/// Only the controlled agent and the bullets advance; the enemy holds its
/// ground. This is deliberately far simpler than the real game engine, just
/// enough for the printed traces to evolve.
fn advance(world: &mut WorldSnapshot, command: UnitCommand, dt: f64) {
    let properties = world.properties;
    let width = f64::from(world.grid.width());

    for bullet in &mut world.bullets {
        bullet.position.x += bullet.velocity.x * dt;
        bullet.position.y += bullet.velocity.y * dt;
    }
    let grid = &world.grid;
    world.bullets.retain(|bullet| {
        bullet.position.x >= 0.0
            && bullet.position.x <= width
            && grid.kind_at_point(bullet.position) != TileKind::Wall
    });

    if let Some(agent) = world.units.first_mut() {
        let cap = properties.unit_max_horizontal_speed;
        agent.position.x =
            (agent.position.x + command.velocity.clamp(-cap, cap) * dt).clamp(0.0, width);

        if command.jump && agent.jump.can_jump {
            agent.position.y += properties.unit_jump_speed * dt;
        } else {
            let drop = properties.unit_fall_speed * dt;
            let support = Vec2::new(agent.position.x, agent.position.y - drop);
            let kind = world.grid.kind_at_point(support);
            let supported =
                kind == TileKind::Wall || (kind == TileKind::Platform && !command.jump_down);
            if !supported {
                agent.position.y = (agent.position.y - drop).max(0.0);
            }
        }
    }
}

/// Fires one bullet from the first opposing unit toward the agent.
fn spawn_enemy_fire(world: &mut WorldSnapshot) {
    let Some(agent) = world.units.first().copied() else {
        return;
    };
    let Some(enemy) = world
        .units
        .iter()
        .find(|unit| unit.opposes(agent.player))
        .copied()
    else {
        return;
    };

    let origin = enemy.center();
    let aim = Vec2::new(
        agent.center().x - origin.x,
        agent.center().y - origin.y,
    );
    let length = (aim.x * aim.x + aim.y * aim.y).sqrt();
    if length == 0.0 {
        return;
    }

    world.bullets.push(BulletSnapshot {
        position: origin,
        velocity: Vec2::new(
            aim.x / length * ENEMY_BULLET_SPEED,
            aim.y / length * ENEMY_BULLET_SPEED,
        ),
        size: 0.2,
        player: enemy.player,
        weapon: WeaponKind::AssaultRifle,
        explosion: None,
    });
}

/// Builds a small random arena: a walled floor, a few pillars and
/// platforms, an unarmed agent, one armed enemy and two pickups.
fn generated_arena(seed: u64) -> WorldSnapshot {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let width: u32 = 40;
    let height: u32 = 15;

    let mut grid = TileGrid::filled(width, height, TileKind::Empty);
    for column in 0..width {
        grid.set(column, 0, TileKind::Wall);
    }
    for _ in 0..4 {
        let column = rng.gen_range(10..width - 10);
        let top = rng.gen_range(2..5);
        for row in 1..top {
            grid.set(column, row, TileKind::Wall);
        }
    }
    for _ in 0..3 {
        let column = rng.gen_range(5..width - 8);
        let row = rng.gen_range(3..6);
        for offset in 0..3 {
            grid.set(column + offset, row, TileKind::Platform);
        }
    }

    let agent = UnitSnapshot {
        id: UnitId::new(1),
        player: PlayerId::new(1),
        position: Vec2::new(4.0, 1.0),
        size: Vec2::new(0.9, 1.8),
        health: 100,
        weapon: None,
        jump: JumpState::grounded(),
    };
    let enemy = UnitSnapshot {
        id: UnitId::new(2),
        player: PlayerId::new(2),
        position: Vec2::new(f64::from(width) - 5.0, 1.0),
        weapon: Some(WeaponSnapshot {
            kind: WeaponKind::AssaultRifle,
            magazine: 30,
            magazine_capacity: 30,
            fire_timer: None,
        }),
        ..agent
    };

    let loot_boxes = vec![
        LootBoxSnapshot {
            position: Vec2::new(f64::from(rng.gen_range(8..width - 8)) + 0.5, 1.0),
            payload: LootPayload::Weapon(WeaponKind::AssaultRifle),
        },
        LootBoxSnapshot {
            position: Vec2::new(f64::from(rng.gen_range(8..width - 8)) + 0.5, 1.0),
            payload: LootPayload::HealthPack(50),
        },
    ];

    WorldSnapshot::new(
        WorldProperties::default(),
        grid,
        vec![agent, enemy],
        loot_boxes,
        Vec::new(),
    )
}
