// facade_core/src/cursor.rs

use serde::{Deserialize, Serialize};

use crate::frames::ScanPoint;

/// Sense of travel along Y for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    Forward,
    Reverse,
}

impl SweepDirection {
    /// `+1.0` for forward, `-1.0` for reverse.
    pub fn sign(self) -> f64 {
        match self {
            SweepDirection::Forward => 1.0,
            SweepDirection::Reverse => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SweepDirection::Forward => SweepDirection::Reverse,
            SweepDirection::Reverse => SweepDirection::Forward,
        }
    }
}

/// The executor's only mutable planning state, created at takeoff and
/// dropped at landing.
#[derive(Debug, Clone)]
pub struct FlightCursor {
    current_position: ScanPoint,
    sweep_start: ScanPoint,
    altitude_band: f64,
    direction: SweepDirection,
    snapshot_index: u64,
    passes_completed: u32,
}

impl FlightCursor {
    /// `start` is the position the first pass departs from; the first band is
    /// `initial_altitude`. The snapshot index starts at zero for every flight.
    pub fn new(start: ScanPoint, initial_altitude: f64) -> Self {
        Self {
            current_position: start,
            sweep_start: start,
            altitude_band: initial_altitude,
            direction: SweepDirection::Forward,
            snapshot_index: 0,
            passes_completed: 0,
        }
    }

    /// Starts a pass from the recorded sweep start and returns the entry point
    /// at the current altitude band.
    pub fn begin_pass(&mut self) -> ScanPoint {
        self.current_position =
            ScanPoint::new(self.sweep_start.x, self.sweep_start.y, self.altitude_band);
        self.current_position
    }

    /// True while the cursor has not left the facade's width, measured from
    /// the sweep start. The bound is inclusive.
    pub fn within_sweep(&self, building_width: f64) -> bool {
        (self.current_position.y - self.sweep_start.y).abs() <= building_width
    }

    /// Steps the cursor one interval along the current direction and returns
    /// the next target.
    pub fn advance(&mut self, interval: f64) -> ScanPoint {
        self.current_position.y += self.direction.sign() * interval;
        self.current_position
    }

    /// Closes a pass: the measured position becomes the next sweep start, the
    /// band shrinks by `lateral_overlap` and the direction flips.
    pub fn complete_pass(&mut self, measured: ScanPoint, lateral_overlap: f64) {
        self.sweep_start = measured;
        self.current_position = measured;
        self.altitude_band *= lateral_overlap;
        self.direction = self.direction.flipped();
        self.passes_completed += 1;
    }

    /// Index the next saved image will carry.
    pub fn snapshot_index(&self) -> u64 {
        self.snapshot_index
    }

    /// Marks the current index as used. Call only after the image is on disk.
    pub fn commit_snapshot(&mut self) -> u64 {
        let used = self.snapshot_index;
        self.snapshot_index += 1;
        used
    }

    pub fn current_position(&self) -> ScanPoint {
        self.current_position
    }

    pub fn sweep_start(&self) -> ScanPoint {
        self.sweep_start
    }

    pub fn altitude_band(&self) -> f64 {
        self.altitude_band
    }

    pub fn direction(&self) -> SweepDirection {
        self.direction
    }

    pub fn passes_completed(&self) -> u32 {
        self.passes_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Counts trigger points of one pass the way the executor walks them.
    fn count_triggers(cursor: &mut FlightCursor, width: f64, interval: f64) -> Vec<f64> {
        let mut ys = Vec::new();
        cursor.begin_pass();
        while cursor.within_sweep(width) {
            ys.push(cursor.current_position().y);
            cursor.advance(interval);
        }
        ys
    }

    #[test]
    fn pass_over_reference_facade_has_fourteen_triggers() {
        let mut cursor = FlightCursor::new(ScanPoint::new(0.0, 0.0, 0.0), 11.0);
        let ys = count_triggers(&mut cursor, 26.0, 2.0);

        assert_eq!(ys.len(), 14);
        assert_eq!(ys.first().copied(), Some(0.0));
        assert_eq!(ys.last().copied(), Some(26.0));
        // The loop exits after stepping to y = 28.
        assert_abs_diff_eq!(cursor.current_position().y, 28.0);
    }

    #[test]
    fn reverse_pass_walks_back_from_measured_end() {
        let mut cursor = FlightCursor::new(ScanPoint::new(0.0, 0.0, 0.0), 11.0);
        count_triggers(&mut cursor, 26.0, 2.0);
        cursor.complete_pass(ScanPoint::new(0.1, 28.0, 11.0), 0.8);
        assert_eq!(cursor.sweep_start(), ScanPoint::new(0.1, 28.0, 11.0));

        let ys = count_triggers(&mut cursor, 26.0, 2.0);
        assert_eq!(ys.len(), 14);
        assert_abs_diff_eq!(ys[13], 2.0);
        assert_abs_diff_eq!(cursor.begin_pass().x, 0.1);
    }

    #[test]
    fn direction_alternates_starting_forward() {
        let mut cursor = FlightCursor::new(ScanPoint::origin(), 10.0);
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(cursor.direction());
            cursor.complete_pass(ScanPoint::origin(), 0.8);
        }
        assert_eq!(seen[0], SweepDirection::Forward);
        for pair in seen.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn altitude_band_shrinks_geometrically() {
        let mut cursor = FlightCursor::new(ScanPoint::origin(), 13.0);
        let mut previous = cursor.altitude_band();
        for _ in 0..8 {
            cursor.complete_pass(ScanPoint::origin(), 0.6);
            assert_abs_diff_eq!(cursor.altitude_band(), previous * 0.6, epsilon = 1e-12);
            assert!(cursor.altitude_band() < previous);
            previous = cursor.altitude_band();
        }
        assert_eq!(cursor.passes_completed(), 8);
    }

    #[test]
    fn snapshot_indices_are_gap_free() {
        let mut cursor = FlightCursor::new(ScanPoint::origin(), 10.0);
        let used: Vec<u64> = (0..5).map(|_| cursor.commit_snapshot()).collect();
        assert_eq!(used, vec![0, 1, 2, 3, 4]);
        assert_eq!(cursor.snapshot_index(), 5);
    }

    #[test]
    fn sweep_bound_is_inclusive() {
        let mut cursor = FlightCursor::new(ScanPoint::origin(), 10.0);
        cursor.begin_pass();
        cursor.advance(26.0);
        assert!(cursor.within_sweep(26.0));
        cursor.advance(0.001);
        assert!(!cursor.within_sweep(26.0));
    }
}
