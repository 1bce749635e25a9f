// facade_core/src/geometry.rs

//! Camera footprint geometry used to space triggers along a pass and to decide
//! how far the altitude bands may shrink.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::params::ScanParameters;

/// Reasons a scan configuration or stand-off reading cannot produce a usable
/// sweep pattern.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("stand-off distance must be positive, got {0}")]
    NonPositiveStandoff(f64),

    #[error("stand-off distance {distance} exceeds the plausible sensor range of {max}")]
    ImplausibleStandoff { distance: f64, max: f64 },

    #[error("horizontal field of view must lie in (0, 180) degrees, got {0}")]
    DegenerateFieldOfView(f64),

    #[error("image aspect ratio must be positive, got {0}")]
    NonPositiveAspectRatio(f64),

    #[error("{name} overlap must lie in (0, 1), got {value}")]
    OverlapOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be positive, got {value}")]
    NonPositiveExtent { name: &'static str, value: f64 },

    #[error("horizontal capture interval is not positive ({0})")]
    NonPositiveInterval(f64),
}

// =========================================================================
// == Pure Footprint Functions ==
// =========================================================================

/// Vertical field of view of a pinhole camera, derived from the horizontal
/// field of view and the image aspect ratio (width / height).
///
/// `aspect_ratio` must be positive; this is not checked here.
pub fn compute_vertical_fov(horizontal_fov_deg: f64, aspect_ratio: f64) -> f64 {
    let half_h = (horizontal_fov_deg / 2.0).to_radians();
    (2.0 * (half_h.tan() / aspect_ratio).atan()).to_degrees()
}

/// Distance between consecutive trigger points along a pass.
///
/// The footprint width at `standoff` is `2·d·tan(hfov/2)`; consecutive frames
/// re-cover `longitudinal_overlap` of it.
pub fn compute_horizontal_interval(
    standoff: f64,
    horizontal_fov_deg: f64,
    longitudinal_overlap: f64,
) -> Result<f64, GeometryError> {
    if !(standoff > 0.0) || !standoff.is_finite() {
        return Err(GeometryError::NonPositiveStandoff(standoff));
    }
    if !(horizontal_fov_deg > 0.0 && horizontal_fov_deg < 180.0) {
        return Err(GeometryError::DegenerateFieldOfView(horizontal_fov_deg));
    }

    let ground_distance = 2.0 * standoff * (horizontal_fov_deg / 2.0).to_radians().tan();
    let interval = ground_distance * (1.0 - longitudinal_overlap);

    if !(interval > 0.0) || !interval.is_finite() {
        return Err(GeometryError::NonPositiveInterval(interval));
    }
    Ok(interval)
}

/// Vertical extent of the surface visible at `standoff`.
pub fn compute_vertical_coverage(standoff: f64, vertical_fov_deg: f64) -> f64 {
    2.0 * standoff * (vertical_fov_deg / 2.0).to_radians().tan()
}

// =========================================================================
// == Per-Flight Derived Geometry ==
// =========================================================================

/// Footprint quantities fixed for the whole flight once the stand-off has been
/// measured. They are not refreshed as the altitude band changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedGeometry {
    /// The stand-off reading everything below was derived from.
    pub standoff: f64,
    pub vertical_fov_deg: f64,
    /// Step along Y between two triggers. Always strictly positive.
    pub horizontal_capture_interval: f64,
    /// Vertical footprint at `standoff`; the termination threshold is a
    /// fraction of it.
    pub vertical_coverage: f64,
}

impl DerivedGeometry {
    /// Derives the flight geometry from one stand-off reading.
    ///
    /// Rejects readings that are non-positive, non-finite, or beyond
    /// `max_standoff`, and any configuration whose interval would not be
    /// strictly positive.
    pub fn from_standoff(
        params: &ScanParameters,
        standoff: f64,
        max_standoff: f64,
    ) -> Result<Self, GeometryError> {
        if !(standoff > 0.0) || !standoff.is_finite() {
            return Err(GeometryError::NonPositiveStandoff(standoff));
        }
        if standoff > max_standoff {
            return Err(GeometryError::ImplausibleStandoff {
                distance: standoff,
                max: max_standoff,
            });
        }

        let horizontal_capture_interval = compute_horizontal_interval(
            standoff,
            params.camera_horizontal_fov_deg,
            params.longitudinal_overlap,
        )?;
        let vertical_fov_deg =
            compute_vertical_fov(params.camera_horizontal_fov_deg, params.image_aspect_ratio);

        Ok(Self {
            standoff,
            vertical_fov_deg,
            horizontal_capture_interval,
            vertical_coverage: compute_vertical_coverage(standoff, vertical_fov_deg),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const EPS: f64 = 1e-9;

    #[test]
    fn vertical_fov_for_wide_sensor() {
        // 2560x1280 sensor behind a 90 degree lens.
        let vfov = compute_vertical_fov(90.0, 2.0);
        assert_abs_diff_eq!(vfov, 53.130_102_354_156, epsilon = 1e-6);
    }

    #[test]
    fn vertical_fov_equals_horizontal_for_square_images() {
        assert_abs_diff_eq!(compute_vertical_fov(70.0, 1.0), 70.0, epsilon = EPS);
    }

    #[test]
    fn vertical_fov_stays_in_open_range_and_is_monotonic() {
        for &aspect in &[0.25, 0.75, 1.0, 1.5, 2.0, 4.0] {
            let mut previous = 0.0;
            for step in 1..180 {
                let vfov = compute_vertical_fov(step as f64, aspect);
                assert!(vfov > 0.0 && vfov < 180.0, "vfov {vfov} out of range");
                assert!(vfov > previous, "not increasing at hfov={step}, aspect={aspect}");
                previous = vfov;
            }
        }
    }

    #[test]
    fn interval_for_reference_configuration() {
        // 10 m off the wall: a 20 m footprint, 90 % re-covered.
        let interval = compute_horizontal_interval(10.0, 90.0, 0.9).unwrap();
        assert_abs_diff_eq!(interval, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn interval_is_positive_and_vanishes_as_overlap_approaches_one() {
        for &standoff in &[0.5, 3.0, 10.0, 35.0] {
            for &overlap in &[0.05, 0.5, 0.9, 0.99] {
                let interval = compute_horizontal_interval(standoff, 90.0, overlap).unwrap();
                assert!(interval > 0.0);
            }
        }
        let tight = compute_horizontal_interval(10.0, 90.0, 0.999_999).unwrap();
        assert!(tight < 1e-4);
    }

    #[test]
    fn interval_rejects_bad_standoff() {
        assert_eq!(
            compute_horizontal_interval(0.0, 90.0, 0.9),
            Err(GeometryError::NonPositiveStandoff(0.0))
        );
        assert!(matches!(
            compute_horizontal_interval(-3.0, 90.0, 0.9),
            Err(GeometryError::NonPositiveStandoff(_))
        ));
        assert!(matches!(
            compute_horizontal_interval(f64::NAN, 90.0, 0.9),
            Err(GeometryError::NonPositiveStandoff(_))
        ));
    }

    #[test]
    fn interval_rejects_degenerate_fov_and_full_overlap() {
        assert!(matches!(
            compute_horizontal_interval(10.0, 180.0, 0.5),
            Err(GeometryError::DegenerateFieldOfView(_))
        ));
        assert!(matches!(
            compute_horizontal_interval(10.0, 90.0, 1.0),
            Err(GeometryError::NonPositiveInterval(_))
        ));
    }

    #[test]
    fn vertical_coverage_is_linear_in_standoff() {
        let base = compute_vertical_coverage(1.0, 53.13);
        for &k in &[2.0, 5.5, 17.0] {
            assert_abs_diff_eq!(compute_vertical_coverage(k, 53.13), k * base, epsilon = EPS);
        }
    }

    #[test]
    fn derived_geometry_for_dense_preset() {
        let params = ScanParameters::default();
        let geometry = DerivedGeometry::from_standoff(&params, 10.0, 40.0).unwrap();
        assert_abs_diff_eq!(geometry.horizontal_capture_interval, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(geometry.vertical_coverage, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn derived_geometry_rejects_implausible_reading() {
        let params = ScanParameters::default();
        assert_eq!(
            DerivedGeometry::from_standoff(&params, 55.0, 40.0),
            Err(GeometryError::ImplausibleStandoff {
                distance: 55.0,
                max: 40.0
            })
        );
    }
}
