use crate::{errors::WormError, palette::Palette, worm::TrimPolicy};
use log::info;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_SETTINGS_FILE: &str = "threadworms";
pub const ENV_PREFIX: &str = "THREADWORMS";

// Board settings
pub const GRID_WIDTH: usize = 32;
pub const GRID_HEIGHT: usize = 24;

// Worm settings
pub const WORM_COUNT: usize = 24;
pub const WORM_SIZE_MIN: usize = 4;
pub const WORM_SIZE_MAX: usize = 10;
/// Chance that a new worm gets a bonus on top of its size
pub const LONG_WORM_CHANCE: f64 = 0.2;
pub const LONG_WORM_BONUS_MIN: usize = 10;
pub const LONG_WORM_BONUS_MAX: usize = 20;
pub const WORM_SPEED_MIN_MS: u64 = 20;
pub const WORM_SPEED_MAX_MS: u64 = 500;

// Lock timeouts
pub const PROBE_TIMEOUT_MS: u64 = 1000;
pub const TRIM_TIMEOUT_MS: u64 = 2000;
pub const SNAPSHOT_TIMEOUT_MS: u64 = 20;

// Driver settings
pub const FRAMES_PER_SECOND: u32 = 30;
pub const RUN_SECONDS: u64 = 10;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: usize,
    pub grid_height: usize,
    pub worm_count: usize,
    pub worm_size_min: usize,
    pub worm_size_max: usize,
    pub long_worm_chance: f64,
    pub long_worm_bonus_min: usize,
    pub long_worm_bonus_max: usize,
    pub worm_speed_min_ms: u64,
    pub worm_speed_max_ms: u64,
    pub palette: Palette,
    pub probe_timeout_ms: u64,
    pub trim_timeout_ms: u64,
    pub trim_policy: TrimPolicy,
    pub snapshot_timeout_ms: u64,
    /// See `Board::paint` for the pattern format
    pub wall_pattern: Option<String>,
    pub frames_per_second: u32,
    pub run_seconds: u64,
    /// Print every snapshot to stdout as text
    pub print_snapshots: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: GRID_WIDTH,
            grid_height: GRID_HEIGHT,
            worm_count: WORM_COUNT,
            worm_size_min: WORM_SIZE_MIN,
            worm_size_max: WORM_SIZE_MAX,
            long_worm_chance: LONG_WORM_CHANCE,
            long_worm_bonus_min: LONG_WORM_BONUS_MIN,
            long_worm_bonus_max: LONG_WORM_BONUS_MAX,
            worm_speed_min_ms: WORM_SPEED_MIN_MS,
            worm_speed_max_ms: WORM_SPEED_MAX_MS,
            palette: Palette::default(),
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            trim_timeout_ms: TRIM_TIMEOUT_MS,
            trim_policy: TrimPolicy::default(),
            snapshot_timeout_ms: SNAPSHOT_TIMEOUT_MS,
            wall_pattern: None,
            frames_per_second: FRAMES_PER_SECOND,
            run_seconds: RUN_SECONDS,
            print_snapshots: false,
        }
    }
}

impl Settings {
    /// Load settings from `settings_file_name` (any format the `config` crate
    /// recognises by extension), then let `THREADWORMS_*` environment
    /// variables override individual keys. The file is optional; keys found
    /// in neither place keep their defaults.
    pub fn load_from_file(settings_file_name: &str) -> Result<Self, WormError> {
        let mut settings = config::Config::default();
        settings
            .merge(config::File::with_name(settings_file_name).required(false))?
            .merge(config::Environment::with_prefix(ENV_PREFIX))?;
        let settings: Settings = settings.try_into()?;
        settings.validate()?;

        info!(
            "successfully loaded settings from '{}'",
            &settings_file_name
        );

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), WormError> {
        let invalid = |reason: String| Err(WormError::InvalidSettings(reason));

        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid(format!(
                "the board must have at least one cell, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if self.worm_size_min == 0 {
            return invalid("worm_size_min must be at least 1".to_owned());
        }
        if self.worm_size_min > self.worm_size_max {
            return invalid(format!(
                "worm_size_min ({}) is larger than worm_size_max ({})",
                self.worm_size_min, self.worm_size_max
            ));
        }
        if self.long_worm_bonus_min > self.long_worm_bonus_max {
            return invalid(format!(
                "long_worm_bonus_min ({}) is larger than long_worm_bonus_max ({})",
                self.long_worm_bonus_min, self.long_worm_bonus_max
            ));
        }
        if !(0.0..=1.0).contains(&self.long_worm_chance) {
            return invalid(format!(
                "long_worm_chance must be between 0 and 1, got {}",
                self.long_worm_chance
            ));
        }
        if self.worm_speed_min_ms > self.worm_speed_max_ms {
            return invalid(format!(
                "worm_speed_min_ms ({}) is larger than worm_speed_max_ms ({})",
                self.worm_speed_min_ms, self.worm_speed_max_ms
            ));
        }
        if self.palette == Palette::Swatch(vec![]) {
            return invalid("a swatch palette needs at least one color".to_owned());
        }
        if self.frames_per_second == 0 {
            return invalid("frames_per_second must be at least 1".to_owned());
        }
        if self.worm_count > self.grid_width * self.grid_height {
            return invalid(format!(
                "{} worms won't fit on a {}x{} board",
                self.worm_count, self.grid_width, self.grid_height
            ));
        }

        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn trim_timeout(&self) -> Duration {
        Duration::from_millis(self.trim_timeout_ms)
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs(1) / self.frames_per_second.max(1)
    }

    pub fn run_time(&self) -> Duration {
        Duration::from_secs(self.run_seconds)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_an_empty_board() {
        let settings = Settings {
            grid_width: 0,
            ..Settings::default()
        };

        assert!(matches!(
            settings.validate(),
            Err(WormError::InvalidSettings(_))
        ));
    }

    #[test]
    fn validate_rejects_inverted_ranges() {
        let sizes = Settings {
            worm_size_min: 8,
            worm_size_max: 2,
            ..Settings::default()
        };
        let speeds = Settings {
            worm_speed_min_ms: 100,
            worm_speed_max_ms: 10,
            ..Settings::default()
        };

        assert!(sizes.validate().is_err());
        assert!(speeds.validate().is_err());
    }

    #[test]
    fn validate_rejects_more_worms_than_cells() {
        let settings = Settings {
            grid_width: 3,
            grid_height: 3,
            worm_count: 10,
            ..Settings::default()
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_rejects_an_empty_swatch() {
        let settings = Settings {
            palette: Palette::Swatch(vec![]),
            ..Settings::default()
        };

        assert!(settings.validate().is_err());
    }

    // The only test touching THREADWORMS_* variables, so nothing races on them.
    #[test]
    fn environment_overrides_apply_without_a_settings_file() {
        let missing = "this-settings-file-does-not-exist";

        std::env::set_var("THREADWORMS_GRID_WIDTH", "7");
        let settings = Settings::load_from_file(missing);
        std::env::set_var("THREADWORMS_GRID_WIDTH", "wide");
        let garbled = Settings::load_from_file(missing);
        std::env::remove_var("THREADWORMS_GRID_WIDTH");

        let settings = settings.expect("a missing file is not an error");
        assert_eq!(settings.grid_width, 7);
        assert_eq!(settings.grid_height, GRID_HEIGHT);
        assert!(matches!(garbled, Err(WormError::Config(_))));
    }

    #[test]
    fn frame_time_matches_frames_per_second() {
        let settings = Settings {
            frames_per_second: 50,
            ..Settings::default()
        };

        assert_eq!(settings.frame_time(), Duration::from_millis(20));
    }
}
