//! Best-effort view of the board for anything outside the worms (renderers,
//! logging, tests).
//!
//! A refresh tries each cell's lock for a short time. Cells that are busy keep
//! whatever was seen last time, so one snapshot can mix cells from different
//! moments.

use crate::{board::Board, palette::Rgb, Point2};
use grid::Grid;
use log::debug;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The cell's lock has never been won by a refresh
    Unknown,
    Empty,
    Occupied(Rgb),
}

impl Default for Observation {
    fn default() -> Self {
        Observation::Unknown
    }
}

pub struct Snapshot {
    cells: Grid<Observation>,
    stale: usize,
    refreshes: u64,
}

impl Snapshot {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: Grid::init(height, width, Observation::Unknown),
            stale: 0,
            refreshes: 0,
        }
    }

    /// Walk every cell once, reading it if its lock comes free within
    /// `timeout`. Returns the number of cells that were read.
    pub fn refresh(&mut self, board: &Board, timeout: Duration) -> usize {
        debug_assert_eq!((board.width(), board.height()), (self.width(), self.height()));

        let mut read = 0;
        let mut stale = 0;

        for (observation, at) in self.cells.iter_mut().zip(board.points()) {
            match board.read(at, timeout) {
                Some(occupant) => {
                    *observation = match occupant {
                        Some(marker) => Observation::Occupied(marker),
                        None => Observation::Empty,
                    };
                    read += 1;
                }
                None => stale += 1,
            }
        }

        self.stale = stale;
        self.refreshes += 1;
        if stale > 0 {
            debug!(
                "snapshot #{} kept {} stale cells",
                self.refreshes, stale
            );
        }

        read
    }

    pub fn width(&self) -> usize {
        self.cells.cols()
    }

    pub fn height(&self) -> usize {
        self.cells.rows()
    }

    pub fn get(&self, at: Point2) -> Option<Observation> {
        self.cells.get(at.y, at.x).copied()
    }

    /// Cells skipped by the most recent refresh because their lock was busy.
    pub fn stale(&self) -> usize {
        self.stale
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .filter(|observation| matches!(observation, Observation::Occupied(_)))
            .count()
    }

    /// Every cell with its coordinate, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Point2, Observation)> + '_ {
        self.cells.indexed_iter().map(|((row, col), observation)| {
            (Point2::new(col as isize, row as isize), *observation)
        })
    }
}

/// One line per row: `.` empty, `#` occupied, `?` never read.
impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.iter_rows() {
            for observation in row {
                let square = match observation {
                    Observation::Unknown => '?',
                    Observation::Empty => '.',
                    Observation::Occupied(_) => '#',
                };
                write!(f, "{}", square)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
