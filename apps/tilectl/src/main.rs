use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::{bounded, Receiver};
use serde::Serialize;
use serde_json::json;
use shared::{
    domain::{EntityId, EntityState, HassSnapshot},
    protocol::ServiceCall,
};
use tile_core::{
    feature::multiroom_stub_config,
    supported_features, ConsumableFeature, Gesture, LinkSelection, MultiroomFeature,
};
use tracing::info;

mod config;

use config::{load_json, load_settings, load_snapshot};

#[derive(Parser, Debug)]
#[command(about = "Render tile features and emit their service calls from a dashboard snapshot")]
struct Cli {
    /// Snapshot JSON with states and entity/device/area registries.
    #[arg(long)]
    snapshot: Option<PathBuf>,
    #[arg(long)]
    log_filter: Option<String>,
    /// Prefer area icons over entity state icons.
    #[arg(long)]
    area_icons: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PowerState {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tile features an entity supports.
    Features { entity: EntityId },
    /// Print the multiroom player views for a sync group.
    Players { group: EntityId },
    /// Toggle a grouped player's power.
    Power {
        group: EntityId,
        player: EntityId,
        #[arg(value_enum)]
        state: PowerState,
    },
    /// Link a player to the group leader, or unlink it.
    Link {
        group: EntityId,
        player: EntityId,
        selection: LinkSelection,
    },
    /// Print the consumable gauge for a vacuum.
    Gauge {
        entity: EntityId,
        #[arg(long)]
        config: PathBuf,
    },
    /// Press the consumable's reset button.
    GaugeReset {
        entity: EntityId,
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Serialize)]
struct FeatureSummary {
    #[serde(rename = "type")]
    kind: String,
    name: &'static str,
    configurable: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(path) = cli.snapshot {
        settings.snapshot_path = path;
    }
    if let Some(filter) = cli.log_filter {
        settings.log_filter = filter;
    }
    if cli.area_icons {
        settings.use_area_icons = true;
    }

    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .with_writer(std::io::stderr)
        .init();

    let snapshot = load_snapshot(&settings.snapshot_path)?;
    info!(
        snapshot = %settings.snapshot_path.display(),
        states = snapshot.states.len(),
        entities = snapshot.entities.len(),
        "loaded dashboard snapshot"
    );

    match cli.command {
        Command::Features { entity } => {
            let state = entity_state(&snapshot, &entity)?;
            let features: Vec<FeatureSummary> = supported_features(state)
                .map(|feature| FeatureSummary {
                    kind: feature.config_type(),
                    name: feature.name,
                    configurable: feature.configurable,
                })
                .collect();
            print_json(&features)?;
        }
        Command::Players { group } => {
            let feature = multiroom(settings.use_area_icons)?;
            let views = feature
                .render(entity_state(&snapshot, &group)?, &snapshot)
                .unwrap_or_default();
            print_json(&views)?;
        }
        Command::Power {
            group,
            player,
            state,
        } => {
            let checked = matches!(state, PowerState::On);
            let feature = multiroom(settings.use_area_icons)?;
            run_gesture(&feature, &snapshot, &group, &player, Gesture::PowerToggled { checked })?;
        }
        Command::Link {
            group,
            player,
            selection,
        } => {
            let feature = multiroom(settings.use_area_icons)?;
            run_gesture(&feature, &snapshot, &group, &player, Gesture::LinkSelected(selection))?;
        }
        Command::Gauge { entity, config } => {
            let feature = consumable(&config)?;
            let gauge = feature.render(entity_state(&snapshot, &entity)?, &snapshot);
            print_json(&gauge)?;
        }
        Command::GaugeReset { entity, config } => {
            entity_state(&snapshot, &entity)?;
            let feature = consumable(&config)?;
            let (tx, rx) = bounded::<ServiceCall>(1);
            feature.press_reset(&tx);
            print_json(&drain(rx))?;
        }
    }

    Ok(())
}

fn entity_state<'a>(snapshot: &'a HassSnapshot, entity_id: &EntityId) -> Result<&'a EntityState> {
    snapshot
        .state(entity_id)
        .with_context(|| format!("snapshot has no state for '{entity_id}'"))
}

fn multiroom(use_area_icons: bool) -> Result<MultiroomFeature> {
    let mut raw = multiroom_stub_config();
    raw["useAreaIcons"] = json!(use_area_icons);
    let mut feature = MultiroomFeature::new();
    feature.set_config(Some(&raw))?;
    Ok(feature)
}

fn consumable(path: &Path) -> Result<ConsumableFeature> {
    let raw = load_json(path)?;
    let mut feature = ConsumableFeature::new();
    feature
        .set_config(Some(&raw))
        .with_context(|| format!("invalid consumable config '{}'", path.display()))?;
    Ok(feature)
}

fn run_gesture(
    feature: &MultiroomFeature,
    snapshot: &HassSnapshot,
    group: &EntityId,
    player: &EntityId,
    gesture: Gesture,
) -> Result<()> {
    let group_state = entity_state(snapshot, group)?;
    let (tx, rx) = bounded::<ServiceCall>(1);
    if !feature.handle(&tx, group_state, snapshot, player, gesture) {
        bail!("'{player}' is not a resolvable player of '{group}'");
    }
    print_json(&drain(rx))
}

fn drain(rx: Receiver<ServiceCall>) -> Vec<ServiceCall> {
    rx.try_iter().collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
