use crate::{
    board::Board,
    errors::WormError,
    palette::Rgb,
    settings::Settings,
    snapshot::Snapshot,
    worm::{StopSignal, Worm},
    Point2,
};
use log::{error, info, warn};
use rand::prelude::*;
use rand::rngs::SmallRng;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const WALL_COLOR: Rgb = Rgb::new(192, 192, 192);

/// Where new worms start out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Keep picking random cells until an empty one turns up
    Random,
    /// One worm per listed cell; every cell must be empty
    At(Vec<Point2>),
}

struct RunningWorm {
    name: String,
    handle: JoinHandle<Worm>,
}

/// Owns the board, the worm threads and the stop signal they share.
pub struct World {
    board: Arc<Board>,
    stop: StopSignal,
    worms: Vec<RunningWorm>,
    snapshot: Snapshot,
    settings: Settings,
    rng: SmallRng,
}

impl World {
    pub fn new(settings: Settings) -> Result<Self, WormError> {
        settings.validate()?;

        info!(
            "building a {}x{} board for {} worms",
            settings.grid_width, settings.grid_height, settings.worm_count
        );
        info!(
            r#"
WORM_SIZE	{}..={}
LONG_WORM_CHANCE	{}
WORM_SPEED_MS	{}..={}
PROBE_TIMEOUT_MS	{}
TRIM_TIMEOUT_MS	{}
TRIM_POLICY	{:?}
PALETTE	{:?}
"#,
            settings.worm_size_min,
            settings.worm_size_max,
            settings.long_worm_chance,
            settings.worm_speed_min_ms,
            settings.worm_speed_max_ms,
            settings.probe_timeout_ms,
            settings.trim_timeout_ms,
            settings.trim_policy,
            settings.palette,
        );

        let board = Arc::new(Board::new(settings.grid_width, settings.grid_height));
        if let Some(pattern) = &settings.wall_pattern {
            let walls = board.paint(pattern, WALL_COLOR);
            info!("painted {} wall cells", walls);

            if settings.worm_count > board.len() - walls {
                return Err(WormError::InvalidSettings(format!(
                    "{} worms won't fit in the {} cells left between the walls",
                    settings.worm_count,
                    board.len() - walls
                )));
            }
        }

        let snapshot = Snapshot::new(board.width(), board.height());

        Ok(Self {
            board,
            stop: StopSignal::new(),
            worms: Vec::new(),
            snapshot,
            settings,
            rng: SmallRng::from_entropy(),
        })
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A handle external code (an input handler, a signal hook) can keep to
    /// stop the worms later.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Spawn the number of worms the settings ask for at random places.
    pub fn populate(&mut self) -> Result<(), WormError> {
        self.spawn(self.settings.worm_count, &Placement::Random)
    }

    /// Create `count` worms, claim a starting cell for each and start each one
    /// on its own thread. With `Placement::At`, `count` is capped at the
    /// number of listed cells.
    pub fn spawn(&mut self, count: usize, placement: &Placement) -> Result<(), WormError> {
        for i in 0..count {
            let marker = self.settings.palette.pick(&mut self.rng);
            let head = match placement {
                Placement::Random => self.place_randomly(marker),
                Placement::At(cells) => match cells.get(i) {
                    Some(cell) => self.place_at(*cell, marker)?,
                    None => break,
                },
            };

            let name = format!("worm {}", self.worms.len());
            let worm = Worm::new_from_settings(
                name,
                Arc::clone(&self.board),
                head,
                marker,
                &self.settings,
            );
            self.start(worm)?;
        }

        info!("{} worms are running", self.running());
        Ok(())
    }

    /// Start an already built worm. Its body must already be on the board.
    pub fn start(&mut self, worm: Worm) -> Result<(), WormError> {
        let name = worm.name().to_owned();
        let stop = self.stop.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || worm.run(stop))?;

        self.worms.push(RunningWorm { name, handle });
        Ok(())
    }

    /// Keeps sampling until it finds an empty cell, so the board has to have
    /// room. Settings validation makes sure it does at startup.
    fn place_randomly(&mut self, marker: Rgb) -> Point2 {
        loop {
            let at = Point2::new(
                self.rng.gen_range(0..self.board.width()) as isize,
                self.rng.gen_range(0..self.board.height()) as isize,
            );

            if self.board.claim(at, marker) {
                return at;
            }
        }
    }

    fn place_at(&self, at: Point2, marker: Rgb) -> Result<Point2, WormError> {
        if !self.board.contains(at) {
            return Err(WormError::OutOfBounds(
                at,
                self.board.width(),
                self.board.height(),
            ));
        }

        if self.board.claim(at, marker) {
            Ok(at)
        } else {
            Err(WormError::CellOccupied(at))
        }
    }

    /// Refresh and return the best-effort view of the board.
    pub fn snapshot(&mut self) -> &Snapshot {
        self.snapshot
            .refresh(&self.board, self.settings.snapshot_timeout());
        &self.snapshot
    }

    /// Tell every worm to stop after its current step. Doesn't wait.
    pub fn request_stop(&self) {
        if !self.stop.is_raised() {
            info!("asking {} worms to stop", self.worms.len());
        }
        self.stop.raise();
    }

    pub fn is_stopping(&self) -> bool {
        self.stop.is_raised()
    }

    /// Worm threads that haven't finished yet.
    pub fn running(&self) -> usize {
        self.worms
            .iter()
            .filter(|worm| !worm.handle.is_finished())
            .count()
    }

    /// Stop every worm and wait for all of them. A worm that panicked doesn't
    /// keep the others from being collected; it is reported once they are.
    pub fn join(mut self) -> Result<Vec<Worm>, WormError> {
        self.request_stop();

        let worms = std::mem::take(&mut self.worms);
        let mut finished = Vec::with_capacity(worms.len());
        let mut panicked = None;

        for RunningWorm { name, handle } in worms {
            match handle.join() {
                Ok(worm) => finished.push(worm),
                Err(_) => {
                    error!("{} panicked", name);
                    panicked.get_or_insert(name);
                }
            }
        }

        match panicked {
            Some(name) => Err(WormError::WormPanicked(name)),
            None => Ok(finished),
        }
    }
}

impl Drop for World {
    fn drop(&mut self) {
        if !self.worms.is_empty() && !self.stop.is_raised() {
            warn!("world dropped without joining; stopping its worms");
            self.stop.raise();
        }
    }
}
