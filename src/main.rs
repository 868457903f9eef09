use log::{info, warn};
use std::time::Instant;
use threadworms::{
    errors::WormError,
    presets::init_preset_manager,
    settings::{Settings, DEFAULT_SETTINGS_FILE},
    World,
};

const PRESET_ENV_VAR: &str = "THREADWORMS_PRESET";

fn main() -> Result<(), WormError> {
    dotenv::dotenv().ok();
    env_logger::init();

    let settings = load_settings()?;
    let frame_time = settings.frame_time();
    let run_time = settings.run_time();
    let print_snapshots = settings.print_snapshots;

    let mut world = World::new(settings)?;
    world.populate()?;

    let started = Instant::now();
    let mut frames = 0u64;
    while started.elapsed() < run_time {
        let frame_started = Instant::now();

        let snapshot = world.snapshot();
        if print_snapshots {
            println!("{}", snapshot);
        }
        frames += 1;

        if let Some(remaining) = frame_time.checked_sub(frame_started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    info!("drew {} frames in {:?}", frames, started.elapsed());

    world.request_stop();
    let worms = world.join()?;
    for worm in &worms {
        info!(
            "{} ended {} long (max {}): {:?}",
            worm.name(),
            worm.body().len(),
            worm.max_length(),
            worm.stats()
        );
    }

    Ok(())
}

/// A preset named by `THREADWORMS_PRESET` wins. Otherwise read the optional
/// settings file plus `THREADWORMS_*` overrides, falling back to the defaults
/// if either can't be parsed.
fn load_settings() -> Result<Settings, WormError> {
    if let Ok(name) = std::env::var(PRESET_ENV_VAR) {
        let preset_manager = init_preset_manager();
        info!(
            "using preset '{}' (available: {})",
            name,
            preset_manager.get_preset_names().join(", ")
        );
        return preset_manager.settings_for(&name);
    }

    match Settings::load_from_file(DEFAULT_SETTINGS_FILE) {
        Ok(settings) => Ok(settings),
        Err(WormError::Config(e)) => {
            warn!(
                "couldn't load settings from '{}', using the defaults: {}",
                DEFAULT_SETTINGS_FILE, e
            );
            Ok(Settings::default())
        }
        Err(e) => Err(e),
    }
}
