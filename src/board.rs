//! The shared grid every worm writes into.
//!
//! Each cell is its own `Mutex`, and the occupant marker lives inside that
//! mutex, so the only way to look at or change a cell is through a guard for
//! that one cell. There is no board-wide lock.

use crate::{palette::Rgb, rect::Rect, Point2};
use grid::Grid;
use log::debug;
use parking_lot::{Mutex, MutexGuard};
use std::time::Duration;

/// `None` for an empty cell, otherwise the marker of whatever covers it.
pub type Occupant = Option<Rgb>;

pub type CellGuard<'a> = MutexGuard<'a, Occupant>;

pub struct Board {
    cells: Grid<Mutex<Occupant>>,
    bounds: Rect<isize>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        let cells: Vec<_> = (0..width * height).map(|_| Mutex::new(None)).collect();
        let cells = Grid::from_vec(cells, width);

        debug!(
            "Created new board with {} rows and {} columns",
            cells.rows(),
            cells.cols()
        );

        Self {
            cells,
            bounds: Rect::new(0, 0, width as isize, height as isize),
        }
    }

    pub fn width(&self) -> usize {
        self.cells.cols()
    }

    pub fn height(&self) -> usize {
        self.cells.rows()
    }

    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> Rect<isize> {
        self.bounds
    }

    pub fn contains(&self, at: Point2) -> bool {
        self.bounds.contains(&at)
    }

    /// Every coordinate on the board in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point2> {
        self.bounds.points()
    }

    fn cell(&self, at: Point2) -> Option<&Mutex<Occupant>> {
        debug_assert!(
            self.contains(at),
            "tried to lock {} on a {}x{} board",
            at,
            self.width(),
            self.height()
        );

        if !self.contains(at) {
            return None;
        }

        self.cells.get(at.y as usize, at.x as usize)
    }

    /// Blocks until the cell's lock is held. `None` only for off-board points.
    pub fn lock(&self, at: Point2) -> Option<CellGuard<'_>> {
        self.cell(at).map(|cell| cell.lock())
    }

    /// Waits at most `timeout` for the cell's lock.
    pub fn try_lock_for(&self, at: Point2, timeout: Duration) -> Option<CellGuard<'_>> {
        self.cell(at).and_then(|cell| cell.try_lock_for(timeout))
    }

    /// Look at a cell only if nobody else is holding it right now.
    ///
    /// A contended cell reports `None`, the same as an off-board point.
    pub fn peek(&self, at: Point2) -> Option<Occupant> {
        self.cell(at)
            .and_then(|cell| cell.try_lock())
            .map(|occupant| *occupant)
    }

    /// Write `marker` into the cell if its lock can be had within `timeout`.
    /// Returns `false`, leaving the cell untouched, on timeout.
    pub fn try_occupy(&self, at: Point2, marker: Rgb, timeout: Duration) -> bool {
        match self.try_lock_for(at, timeout) {
            Some(mut occupant) => {
                *occupant = Some(marker);
                true
            }
            None => false,
        }
    }

    /// Block for the cell's lock and take the cell, but only if it is empty.
    pub fn claim(&self, at: Point2, marker: Rgb) -> bool {
        match self.lock(at) {
            Some(mut occupant) if occupant.is_none() => {
                *occupant = Some(marker);
                true
            }
            _ => false,
        }
    }

    /// Timed read. `None` means the lock was contended and the caller should
    /// keep whatever it saw last time.
    pub fn read(&self, at: Point2, timeout: Duration) -> Option<Occupant> {
        self.try_lock_for(at, timeout).map(|occupant| *occupant)
    }

    /// Paint a text pattern onto the board, one character per cell starting
    /// at the top left. `.` leaves a cell alone, a space empties it and any
    /// other character fills it with `marker`. An empty first or last line is
    /// dropped so patterns can be written as raw strings starting on their own
    /// line; a line of spaces still clears its row. Anything beyond the edge
    /// of the board is ignored.
    ///
    /// Returns the number of cells that were filled.
    pub fn paint(&self, pattern: &str, marker: Rgb) -> usize {
        let mut lines: Vec<&str> = pattern.split('\n').collect();
        if lines.first().map_or(false, |line| line.is_empty()) {
            lines.remove(0);
        }
        if lines.last().map_or(false, |line| line.is_empty()) {
            lines.pop();
        }

        let mut filled = 0;
        for (y, line) in lines.iter().take(self.height()).enumerate() {
            for (x, square) in line.chars().take(self.width()).enumerate() {
                let at = Point2::new(x as isize, y as isize);
                let new_occupant = match square {
                    '.' => continue,
                    ' ' => None,
                    _ => Some(marker),
                };

                if let Some(mut occupant) = self.lock(at) {
                    *occupant = new_occupant;
                    if new_occupant.is_some() {
                        filled += 1;
                    }
                }
            }
        }

        debug!("painted {} cells onto the board", filled);
        filled
    }
}
