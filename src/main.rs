//! Abyss Crew - headless demo
//!
//! Builds a small outpost scene, lets the crew AI work for a number of
//! ticks, then queues every crew member's treatable afflictions at the
//! medical clinic and pays for them. Prints a JSON summary to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use abyss_crew::ai::{FindDivingGear, ObjectiveManager, OperateItem, RepairItem};
use abyss_crew::clinic::{ClinicHost, ClinicPayload, ClinicRequest, HealRequestResult, MedicalClinic, NetCrewMember};
use abyss_crew::core::config::{config, set_config, SimulationConfig};
use abyss_crew::core::error::Result;
use abyss_crew::core::types::{CrewId, EntityId, HullId, LevelType, Team, Vec2};
use abyss_crew::ecs::World;
use abyss_crew::health::AfflictionRegistry;
use abyss_crew::world::{Campaign, Character, Item, Location, Repairable, SlotType};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

/// Afflictions the demo rolls onto the crew
const INJURIES: [&str; 5] = ["burn", "lacerations", "blunttrauma", "bloodloss", "internaldamage"];

const ENGINE_ROOM: HullId = HullId(1);
const BALLAST: HullId = HullId(2);

/// Abyss Crew - run the crew AI and the medical clinic headless
#[derive(Parser, Debug)]
#[command(name = "abyss-crew")]
#[command(about = "Run a headless crew AI and medical clinic scenario")]
struct Args {
    /// Random seed for the injuries rolled onto the crew
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of AI ticks to run before visiting the clinic
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0)]
    dt: f32,

    /// Starting campaign money
    #[arg(long, default_value_t = 500)]
    money: i32,

    /// Simulation config (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Affliction definitions (TOML); the builtin set is used when omitted
    #[arg(long)]
    afflictions: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("abyss_crew=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let loaded = SimulationConfig::load(path)?;
        if set_config(loaded).is_err() {
            tracing::warn!("config already initialized, ignoring {}", path.display());
        }
    }
    let registry = Arc::new(match &args.afflictions {
        Some(path) => AfflictionRegistry::load(path)?,
        None => AfflictionRegistry::builtin()?,
    });
    tracing::info!(afflictions = registry.len(), seed = args.seed, "Abyss Crew starting");

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut world = World::new(
        LevelType::Outpost,
        Campaign::new(args.money, Some(Location::outpost("Ballast Station", 1.2))),
    );
    world.flood_hull(BALLAST);

    let crew = spawn_crew(&mut world, &registry, &mut rng)?;
    let pump = spawn_equipment(&mut world);

    let mut managers = Vec::new();
    for (index, &character) in crew.iter().enumerate() {
        let mut manager = ObjectiveManager::new(character);
        manager.add_objective(FindDivingGear::new(false));
        match index {
            0 => {
                manager.add_objective(RepairItem::new(&world, pump)?.with_priority(30.0));
            }
            1 => {
                manager.set_order(OperateItem::new(&world, pump, "pumpwater", false, true)?.looping());
            }
            _ => {}
        }
        managers.push(manager);
    }

    for tick in 0..args.ticks {
        for manager in &mut managers {
            if let Some(kind) = manager.update(&mut world, args.dt) {
                tracing::debug!(tick, character = ?manager.character(), kind, "acted");
            }
        }
        world.update(args.dt);
    }

    let mut clinic = MedicalClinic::new(registry);
    for crew_id in world.crew_ids() {
        let afflictions = clinic.crew_afflictions(&world, crew_id);
        if afflictions.is_empty() {
            continue;
        }
        clinic.handle_request(&mut world, ClinicRequest::AddPending(NetCrewMember::new(crew_id, afflictions)))?;
    }
    let quoted = clinic.total_cost();
    let replies = clinic.handle_request(&mut world, ClinicRequest::HealPending)?;
    let result = replies
        .iter()
        .find_map(|out| match &out.envelope.payload {
            ClinicPayload::HealRequest(request) => Some(request.result),
            _ => None,
        })
        .unwrap_or_default();
    if result != HealRequestResult::Success {
        tracing::warn!(?result, quoted, "clinic visit failed");
    }

    let crew_summary: Vec<_> = crew
        .iter()
        .filter_map(|&id| world.character(id))
        .map(|c| {
            json!({
                "name": c.name,
                "hull": c.hull.map(|h| h.0),
                "oxygen": c.oxygen_available,
                "selected_item": c.selected_item.and_then(|i| world.item(i)).map(|i| i.name.clone()),
                "lines": c.speech.lines().iter().map(|l| l.key).collect::<Vec<_>>(),
                "afflictions": c.health.afflictions().iter()
                    .map(|a| json!({ "identifier": a.identifier(), "strength": a.strength() }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();
    let summary = json!({
        "seed": args.seed,
        "ticks": args.ticks,
        "elapsed": world.time,
        "walk_speed": config().walk_speed,
        "pump_condition": world.item(pump).map(|p| p.condition),
        "crew": crew_summary,
        "clinic": {
            "quoted": quoted,
            "result": result,
            "money": world.money(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Three crew members with random injuries; the last one starts in the
/// flooded ballast tank without gear.
fn spawn_crew(world: &mut World, registry: &AfflictionRegistry, rng: &mut ChaCha8Rng) -> Result<Vec<EntityId>> {
    let roster = [
        ("Ada Kovacs", Vec2::new(0.0, 0.0), ENGINE_ROOM, 70.0),
        ("Ben Osei", Vec2::new(80.0, 0.0), ENGINE_ROOM, 30.0),
        ("Cora Lind", Vec2::new(600.0, -40.0), BALLAST, 20.0),
    ];
    let mut ids = Vec::new();
    for (index, (name, position, hull, mechanical)) in roster.into_iter().enumerate() {
        let mut character = Character::new(name, Team::Crew)
            .with_crew_id(CrewId(index as i32 + 1))
            .with_skill("mechanical", mechanical)
            .at(position, Some(hull));
        for _ in 0..rng.gen_range(1..=2) {
            let identifier = INJURIES[rng.gen_range(0..INJURIES.len())];
            let strength = rng.gen_range(5.0..60.0);
            character.health.apply(registry.require(identifier)?.clone(), strength);
        }
        ids.push(world.spawn_character(character));
    }
    Ok(ids)
}

/// The damaged ballast pump, its control panel and the gear the crew needs
fn spawn_equipment(world: &mut World) -> EntityId {
    let controls = world.spawn_item(
        Item::new("pumpcontrols", "Pump Controls", Vec2::new(340.0, 0.0), Some(ENGINE_ROOM)).as_controller(),
    );
    let mut pump = Item::new("pump", "Ballast Pump", Vec2::new(300.0, 0.0), Some(ENGINE_ROOM))
        .with_operable(5.0)
        .with_condition(35.0)
        .with_repairable(
            Repairable::new(4.0)
                .with_required_item(&["wrench"])
                .with_required_skill("mechanical", 40.0),
        );
    pump.deterioration_rate = 0.2;
    pump.connections = vec![controls];
    let pump = world.spawn_item(pump);

    world.spawn_item(
        Item::new("wrench", "Wrench", Vec2::new(150.0, 0.0), Some(ENGINE_ROOM))
            .with_tags(&["tool"])
            .with_pickable(&[SlotType::RightHand, SlotType::LeftHand]),
    );
    world.spawn_item(
        Item::new("divingmask", "Diving Mask", Vec2::new(500.0, -40.0), Some(BALLAST))
            .with_tags(&["diving"])
            .with_pickable(&[SlotType::Head])
            .with_container(1),
    );
    world.spawn_item(
        Item::new("oxygentank", "Oxygen Tank", Vec2::new(520.0, -40.0), Some(BALLAST))
            .with_pickable(&[SlotType::Any]),
    );
    pump
}
