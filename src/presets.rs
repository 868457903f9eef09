//! Named bundles of settings

use crate::{
    errors::WormError,
    palette::{Palette, Rgb},
    settings::Settings,
    worm::TrimPolicy,
};

pub const DEFAULT_PRESET: &str = "default";

const HELLO_WORLD: &str = r#"
...........................
...........................
...........................
.H..H..EEE..L....L.....OO..
.H..H..E....L....L....O..O.
.HHHH..EE...L....L....O..O.
.H..H..E....L....L....O..O.
.H..H..EEE..LLL..LLL...OO..
...........................
.W.....W...OO...RRR..MM.MM.
.W.....W..O..O..R.R..M.M.M.
.W..W..W..O..O..RR...M.M.M.
.W..W..W..O..O..R.R..M...M.
..WW.WW....OO...R.R..M...M.
...........................
...........................
"#;

pub struct Preset {
    pub name: String,
    pub settings: Settings,
}

impl Preset {
    pub fn new(name: String, settings: Settings) -> Self {
        Self { name, settings }
    }
}

pub struct PresetManager {
    presets: Vec<Preset>,
}

impl PresetManager {
    pub fn new() -> Self {
        Self { presets: vec![] }
    }

    pub fn add_preset(&mut self, preset: Preset) {
        self.presets.push(preset);
    }

    pub fn get_preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Like `get_preset` but hands back a copy of the settings.
    pub fn settings_for(&self, name: &str) -> Result<Settings, WormError> {
        self.get_preset(name)
            .map(|preset| preset.settings.clone())
            .ok_or_else(|| WormError::UnknownPreset(name.to_owned()))
    }

    pub fn get_preset_names(&self) -> Vec<String> {
        self.presets.iter().map(|p| p.name.clone()).collect()
    }
}

impl Default for PresetManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_preset_manager() -> PresetManager {
    let mut preset_manager = PresetManager::new();
    preset_manager.add_preset(Preset::new(DEFAULT_PRESET.to_string(), Settings::default()));
    preset_manager.add_preset(Preset::new(
        "hello_world".to_string(),
        Settings {
            wall_pattern: Some(HELLO_WORLD.to_string()),
            ..Settings::default()
        },
    ));
    preset_manager.add_preset(Preset::new(
        "crowded".to_string(),
        Settings {
            grid_width: 16,
            grid_height: 12,
            worm_count: 40,
            worm_size_min: 3,
            worm_size_max: 6,
            long_worm_chance: 0.0,
            trim_policy: TrimPolicy::Shrink,
            ..Settings::default()
        },
    ));
    preset_manager.add_preset(Preset::new(
        "sprinters".to_string(),
        Settings {
            worm_speed_min_ms: 5,
            worm_speed_max_ms: 30,
            probe_timeout_ms: 50,
            trim_timeout_ms: 100,
            frames_per_second: 60,
            ..Settings::default()
        },
    ));
    preset_manager.add_preset(Preset::new(
        "long_worms".to_string(),
        Settings {
            worm_count: 8,
            long_worm_chance: 1.0,
            long_worm_bonus_min: 20,
            long_worm_bonus_max: 40,
            palette: Palette::Swatch(vec![
                Rgb::new(255, 99, 71),
                Rgb::new(255, 215, 0),
                Rgb::new(50, 205, 50),
                Rgb::new(30, 144, 255),
                Rgb::new(238, 130, 238),
            ]),
            ..Settings::default()
        },
    ));
    preset_manager
}
