pub mod board;
pub mod errors;
pub mod palette;
pub mod point2;
pub mod presets;
pub mod rect;
pub mod settings;
pub mod snapshot;
pub mod world;
pub mod worm;

pub use board::Board;
pub use errors::WormError;
pub use palette::{Palette, Rgb};
pub use point2::{Direction, Point2};
pub use settings::Settings;
pub use snapshot::{Observation, Snapshot};
pub use world::{Placement, World};
pub use worm::{Step, StopSignal, TrimPolicy, Worm, WormStats};
