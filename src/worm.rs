use crate::{
    board::Board,
    palette::Rgb,
    settings::Settings,
    Direction, Point2,
};
use log::{debug, trace};
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// Chance per step that a worm wanders off in a new random direction
pub const TURN_CHANCE: f64 = 0.2;

/// Shared flag that tells every worm to finish its current step and exit.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Safe to call any number of times, from any thread.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a worm does when it can't get the lock on its own tail in time.
///
/// Either way the tail cell is left alone: a cell is only ever cleared while
/// its lock is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimPolicy {
    /// Keep the target length and try again next step
    Skip,
    /// Give up one unit of target length (never below one)
    Shrink,
}

impl Default for TrimPolicy {
    fn default() -> Self {
        TrimPolicy::Skip
    }
}

/// The outcome of a single step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The head advanced one cell. `trimmed` is how many tail cells were
    /// released afterwards.
    Moved { trimmed: usize },
    /// Couldn't lock the cell in front of the head in time; nothing changed.
    Skipped,
    /// Another worm took the chosen cell between deciding and claiming it.
    Contended,
    /// No open neighbour at either end of the body.
    Boxed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WormStats {
    pub steps: u64,
    pub moves: u64,
    pub skipped: u64,
    pub contended: u64,
    pub boxed: u64,
    pub reversals: u64,
    pub trims: u64,
    pub trim_timeouts: u64,
}

impl WormStats {
    fn record(&mut self, step: Step) {
        self.steps += 1;
        match step {
            Step::Moved { trimmed } => {
                self.moves += 1;
                self.trims += trimmed as u64;
            }
            Step::Skipped => self.skipped += 1,
            Step::Contended => self.contended += 1,
            Step::Boxed => self.boxed += 1,
        }
    }
}

#[derive(TypedBuilder)]
pub struct Worm {
    #[builder(setter(into))]
    name: String,
    board: Arc<Board>,
    /// Head first. Every cell in here holds `marker` on the board.
    #[builder(setter(into))]
    body: VecDeque<Point2>,
    #[builder(default = Direction::Up)]
    direction: Direction,
    max_length: usize,
    #[builder(default)]
    speed: Duration,
    marker: Rgb,
    #[builder(default = Duration::from_millis(crate::settings::PROBE_TIMEOUT_MS))]
    probe_timeout: Duration,
    #[builder(default = Duration::from_millis(crate::settings::TRIM_TIMEOUT_MS))]
    trim_timeout: Duration,
    #[builder(default)]
    trim_policy: TrimPolicy,
    #[builder(default = default_rng())]
    rng: SmallRng,
    #[builder(default)]
    stats: WormStats,
}

impl Worm {
    /// A one-cell worm at `head` with its size, speed and heading drawn from
    /// `settings`. The caller must already have claimed `head` with `marker`.
    pub fn new_from_settings(
        name: String,
        board: Arc<Board>,
        head: Point2,
        marker: Rgb,
        settings: &Settings,
    ) -> Self {
        let mut rng = default_rng();

        let mut max_length = rng.gen_range(settings.worm_size_min..=settings.worm_size_max);
        if rng.gen_bool(settings.long_worm_chance) {
            max_length +=
                rng.gen_range(settings.long_worm_bonus_min..=settings.long_worm_bonus_max);
        }
        let speed = Duration::from_millis(
            rng.gen_range(settings.worm_speed_min_ms..=settings.worm_speed_max_ms),
        );
        let direction = rng.gen();

        Worm::builder()
            .name(name)
            .board(board)
            .body(vec![head])
            .direction(direction)
            .max_length(max_length)
            .speed(speed)
            .marker(marker)
            .probe_timeout(settings.probe_timeout())
            .trim_timeout(settings.trim_timeout())
            .trim_policy(settings.trim_policy)
            .rng(rng)
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &VecDeque<Point2> {
        &self.body
    }

    pub fn head(&self) -> Point2 {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The body never trims below one cell, whatever `max_length` was built with.
    pub fn max_length(&self) -> usize {
        self.max_length.max(1)
    }

    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn marker(&self) -> Rgb {
        self.marker
    }

    pub fn stats(&self) -> &WormStats {
        &self.stats
    }

    /// Step until `stop` is raised, sleeping `speed` between steps. The cells
    /// the worm covers are left on the board when it exits.
    pub fn run(mut self, stop: StopSignal) -> Self {
        debug!("{} starting at {}", self.name, self.head());

        while !stop.is_raised() {
            let step = self.step();
            trace!("{}: {:?}", self.name, step);
            self.stats.record(step);

            thread::sleep(self.speed);
        }

        debug!(
            "{} stopped at {} with length {}: {:?}",
            self.name,
            self.head(),
            self.body.len(),
            self.stats
        );

        self
    }

    /// One iteration of the movement protocol, without the trailing sleep.
    pub fn step(&mut self) -> Step {
        if self.rng.gen_bool(TURN_CHANCE) {
            self.direction = self.rng.gen();
        }

        let board = Arc::clone(&self.board);
        let probe = self.head().step(self.direction);
        let probe_guard = if board.contains(probe) {
            match board.try_lock_for(probe, self.probe_timeout) {
                Some(guard) => Some(guard),
                None => return Step::Skipped,
            }
        } else {
            None
        };

        // Off the board, or somebody (maybe us) is already there.
        let blocked = probe_guard.as_ref().map_or(true, |occupant| occupant.is_some());

        let mut target = Some(probe);
        if blocked {
            let mut heading = self.open_direction();
            if heading.is_none() {
                self.reverse();
                heading = self.open_direction();
            }

            target = heading.map(|direction| {
                self.direction = direction;
                self.head().step(direction)
            });
        }

        // Must go before the target is locked: the target may be the probe.
        drop(probe_guard);

        let target = match target {
            Some(target) => target,
            None => {
                self.direction = self.rng.gen();
                return Step::Boxed;
            }
        };

        if !board.claim(target, self.marker) {
            return Step::Contended;
        }
        self.body.push_front(target);

        Step::Moved {
            trimmed: self.trim(),
        }
    }

    /// Pick uniformly among the head's neighbours that are on the board and
    /// look empty right now.
    ///
    /// A neighbour whose lock is held at that instant counts as taken, even
    /// if it is empty; a snapshot refresh passing over it is enough. So a
    /// reversal can follow from brief contention rather than a real dead end.
    fn open_direction(&mut self) -> Option<Direction> {
        let head = self.head();
        let board = &self.board;

        let open: Vec<Direction> = Direction::ALL
            .iter()
            .copied()
            .filter(|direction| {
                let next = head.step(*direction);
                board.contains(next) && board.peek(next) == Some(None)
            })
            .collect();

        open.choose(&mut self.rng).copied()
    }

    /// Turn the worm around in place: the tail becomes the head.
    fn reverse(&mut self) {
        self.body.make_contiguous().reverse();
        self.stats.reversals += 1;
    }

    /// Release tail cells until the body is back within `max_length`.
    /// Returns how many were released.
    fn trim(&mut self) -> usize {
        let mut trimmed = 0;

        while self.body.len() > self.max_length() {
            let tail = match self.body.back() {
                Some(tail) => *tail,
                None => break,
            };

            match self.board.try_lock_for(tail, self.trim_timeout) {
                Some(mut occupant) => {
                    *occupant = None;
                    drop(occupant);
                    self.body.pop_back();
                    trimmed += 1;
                }
                None => {
                    self.stats.trim_timeouts += 1;
                    if self.trim_policy == TrimPolicy::Shrink {
                        self.max_length = self.max_length().saturating_sub(1).max(1);
                    }
                    trace!("{} couldn't lock its tail at {}", self.name, tail);
                    break;
                }
            }
        }

        trimmed
    }
}

fn default_rng() -> SmallRng {
    SmallRng::from_entropy()
}
