// facade_core/src/frames.rs

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A position in the planner's frame: X toward the facade, Y along it and Z
/// the altitude above the takeoff point (up is positive, never negated).
pub type ScanPoint = Point3<f64>;

/// A position in the vehicle's north-east-down frame, as the vehicle API
/// consumes and reports it. Z is negative above the takeoff point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NedPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl NedPoint {
    pub const ORIGIN: NedPoint = NedPoint {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance_to(&self, other: &NedPoint) -> f64 {
        nalgebra::distance(&self.to_point(), &other.to_point())
    }

    fn to_point(self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

// =========================================================================
// == Scan <-> NED Conversion ==
// These two functions are the only place the altitude sign is flipped.
// =========================================================================

/// Converts a planner position into the vehicle's NED frame.
pub fn scan_to_ned(point: &ScanPoint) -> NedPoint {
    NedPoint {
        x: point.x,  // Toward the facade -> North
        y: point.y,  // Along the facade -> East
        z: -point.z, // Up -> -Down
    }
}

/// Converts a vehicle NED position into the planner's frame.
pub fn ned_to_scan(point: &NedPoint) -> ScanPoint {
    ScanPoint::new(point.x, point.y, -point.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn altitude_becomes_negative_down() {
        let ned = scan_to_ned(&ScanPoint::new(1.0, 2.0, 11.0));
        assert_eq!(ned, NedPoint::new(1.0, 2.0, -11.0));
    }

    #[test]
    fn scan_to_ned_and_back() {
        let original = ScanPoint::new(-4.5, 26.0, 3.25);
        let back = ned_to_scan(&scan_to_ned(&original));
        assert_abs_diff_eq!(back.x, original.x);
        assert_abs_diff_eq!(back.y, original.y);
        assert_abs_diff_eq!(back.z, original.z);
    }

    #[test]
    fn ground_level_is_shared() {
        assert_eq!(scan_to_ned(&ScanPoint::origin()), NedPoint::ORIGIN);
    }

    #[test]
    fn ned_distance() {
        let a = NedPoint::new(0.0, 0.0, -13.0);
        let b = NedPoint::new(0.0, 26.0, -13.0);
        assert_abs_diff_eq!(a.distance_to(&b), 26.0, epsilon = 1e-12);
    }
}
