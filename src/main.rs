use greenhouse_planner::Config;
use std::error::Error;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use greenhouse_planner::adapters::inbound::InMemoryEventStore;
use greenhouse_planner::adapters::outbound::{init_buffered_logger, init_combined_logger, FilesystemMapStore};
use greenhouse_planner::application::EditorService;
use greenhouse_planner::domains::editor::{EditorMode, FloorClick};

const DEMO_MAP: &str = "demo";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    // Installed without the `log` bridge: `log` belongs to fast_log when a log file is configured.
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting greenhouse planner");
    info!(
        "Greenhouse {} x {} x {} m, {} beds",
        config.greenhouse.dimensions.width,
        config.greenhouse.dimensions.length,
        config.greenhouse.dimensions.height,
        config.greenhouse.beds.count
    );

    let logger = init_buffered_logger(
        init_combined_logger(config.logging.file.as_deref(), config.logging.file_level),
        config.logging.buffer_capacity,
    );
    let map_store = Arc::new(FilesystemMapStore::new(Some(config.storage.map_dir.clone().into())));
    let event_store = Arc::new(InMemoryEventStore::new());

    let (service, actor) = EditorService::start(&config, logger, map_store, event_store);
    let editor = service.commands();

    // Demo layout: one robot with a three-point path and a work zone around it.
    editor.set_mode(EditorMode::Robot).await?;
    let robot_id = match editor.floor_click(0.0, -10.0).await? {
        FloorClick::RobotPlaced(id) => id,
        other => return Err(format!("unexpected click outcome: {:?}", other).into()),
    };

    editor.set_mode(EditorMode::Path).await?;
    for (x, z) in [(0.0, -10.0), (8.0, 0.0), (0.0, 10.0)] {
        editor.floor_click(x, z).await?;
    }

    editor.set_mode(EditorMode::Zone).await?;
    for (x, z) in [(-6.0, -14.0), (12.0, -14.0), (12.0, 14.0), (-6.0, 14.0), (-5.5, -13.5)] {
        if let FloorClick::ZoneCreated(zone_id) = editor.floor_click(x, z).await? {
            editor.toggle_zone_assignment(&zone_id, &robot_id).await?;
        }
    }
    editor.set_mode(EditorMode::View).await?;

    match service.save_map(DEMO_MAP).await {
        Ok(()) => info!("Demo map saved as {}", DEMO_MAP),
        Err(e) => warn!("Could not save demo map: {}", e),
    }

    editor.set_playing(true).await?;
    info!("Simulation running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;

    editor.set_playing(false).await?;
    let status = editor.status().await?;
    info!(
        "Stopping with {} robots, {} waypoints, {} zones",
        status.robot_count, status.waypoint_count, status.zone_count
    );
    info!("{} editor events journalled", service.journal(0).await?.len());

    service.shutdown().await?;
    if let Err(e) = actor.await {
        error!("Editor actor ended abnormally: {}", e);
    }

    info!("Greenhouse planner stopped");
    Ok(())
}
