// facade_sim/src/vehicle/camera.rs

use facade_core::frames::NedPoint;
use facade_core::vehicle::ImageType;

const SKY: [u8; 3] = [135, 180, 235];
const GROUND: [u8; 3] = [86, 125, 70];
const MORTAR: [u8; 3] = [200, 200, 195];

const COURSE_HEIGHT: f64 = 0.3;
const BRICK_LENGTH: f64 = 0.8;
/// Depth images saturate at this range, meters.
const MAX_DEPTH: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Sky,
    Ground,
    Facade,
}

/// A forward-looking pinhole camera facing a brick facade that stands on the
/// plane `x = wall_x` and spans `y` in `[0, facade_width]`.
///
/// Frames come out as binary PPM (`P6`), which any image viewer opens.
#[derive(Debug, Clone)]
pub struct SceneCamera {
    width: u32,
    height: u32,
    horizontal_fov_deg: f64,
    facade_width: f64,
    facade_height: f64,
}

impl SceneCamera {
    pub fn new(
        width: u32,
        height: u32,
        horizontal_fov_deg: f64,
        facade_width: f64,
        facade_height: f64,
    ) -> Self {
        Self {
            width,
            height,
            horizontal_fov_deg,
            facade_width,
            facade_height,
        }
    }

    pub fn render(&self, eye: &NedPoint, wall_x: f64, image_type: ImageType) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let pixels = self.width as usize * self.height as usize;
        let mut frame = Vec::with_capacity(header.len() + pixels * 3);
        frame.extend_from_slice(header.as_bytes());

        let standoff = (wall_x - eye.x).max(0.05);
        let half_width = standoff * (self.horizontal_fov_deg.to_radians() / 2.0).tan();
        let half_height = half_width * f64::from(self.height) / f64::from(self.width);
        let altitude = -eye.z;

        for v in 0..self.height {
            let ndc_v = 1.0 - 2.0 * (f64::from(v) + 0.5) / f64::from(self.height);
            let alt = altitude + ndc_v * half_height;
            for u in 0..self.width {
                let ndc_u = 2.0 * (f64::from(u) + 0.5) / f64::from(self.width) - 1.0;
                let y = eye.y + ndc_u * half_width;
                let surface = self.surface_at(y, alt);
                let rgb = match image_type {
                    ImageType::Scene => scene_color(surface, y, alt),
                    ImageType::DepthPlanar => depth_color(surface, standoff),
                    ImageType::Segmentation => segmentation_color(surface),
                };
                frame.extend_from_slice(&rgb);
            }
        }
        frame
    }

    fn surface_at(&self, y: f64, alt: f64) -> Surface {
        if alt < 0.0 {
            Surface::Ground
        } else if (0.0..=self.facade_width).contains(&y) && alt <= self.facade_height {
            Surface::Facade
        } else {
            Surface::Sky
        }
    }
}

fn scene_color(surface: Surface, y: f64, alt: f64) -> [u8; 3] {
    match surface {
        Surface::Sky => SKY,
        Surface::Ground => GROUND,
        Surface::Facade => brick_color(y, alt),
    }
}

/// Running bond: every other course is shifted by half a brick.
fn brick_color(y: f64, alt: f64) -> [u8; 3] {
    let course = (alt / COURSE_HEIGHT).floor();
    let shift = if (course as i64).rem_euclid(2) == 1 {
        BRICK_LENGTH / 2.0
    } else {
        0.0
    };
    let along = (y + shift) / BRICK_LENGTH;
    let brick = along.floor();

    if alt / COURSE_HEIGHT - course < 0.1 || along - brick < 0.05 {
        return MORTAR;
    }
    let shade = ((course as i64) * 31 + (brick as i64) * 17).rem_euclid(5) as u8;
    [160 + shade * 8, 70 + shade * 4, 50]
}

fn depth_color(surface: Surface, standoff: f64) -> [u8; 3] {
    let level = match surface {
        Surface::Sky => 255,
        _ => ((standoff / MAX_DEPTH).min(1.0) * 255.0).round() as u8,
    };
    [level; 3]
}

fn segmentation_color(surface: Surface) -> [u8; 3] {
    match surface {
        Surface::Sky => [0, 0, 0],
        Surface::Ground => [0, 255, 0],
        Surface::Facade => [255, 0, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[u8] = b"P6\n64 32\n255\n";

    fn camera() -> SceneCamera {
        SceneCamera::new(64, 32, 90.0, 26.0, 12.0)
    }

    fn pixel(frame: &[u8], u: usize, v: usize) -> [u8; 3] {
        let at = HEADER.len() + (v * 64 + u) * 3;
        [frame[at], frame[at + 1], frame[at + 2]]
    }

    #[test]
    fn frame_is_a_complete_binary_ppm() {
        let frame = camera().render(&NedPoint::new(0.0, 13.0, -6.0), 10.0, ImageType::Scene);
        assert!(frame.starts_with(HEADER));
        assert_eq!(frame.len(), HEADER.len() + 64 * 32 * 3);
    }

    #[test]
    fn facade_fills_the_view_in_front_of_it() {
        let frame = camera().render(
            &NedPoint::new(0.0, 13.0, -6.0),
            10.0,
            ImageType::Segmentation,
        );
        // Footprint is 20 m x 10 m around (13, 6): all facade.
        for (u, v) in [(0, 0), (63, 31), (32, 16)] {
            assert_eq!(pixel(&frame, u, v), [255, 0, 0]);
        }
    }

    #[test]
    fn low_camera_sees_ground_below_and_sky_past_the_edge() {
        let frame = camera().render(
            &NedPoint::new(0.0, 0.0, -1.0),
            10.0,
            ImageType::Segmentation,
        );
        // Bottom rows fall below the takeoff plane.
        assert_eq!(pixel(&frame, 40, 31), [0, 255, 0]);
        // Left half looks past the facade's near edge at y = 0.
        assert_eq!(pixel(&frame, 5, 10), [0, 0, 0]);
        assert_eq!(pixel(&frame, 40, 10), [255, 0, 0]);
    }

    #[test]
    fn depth_encodes_the_standoff() {
        let frame = camera().render(
            &NedPoint::new(0.0, 13.0, -6.0),
            20.0,
            ImageType::DepthPlanar,
        );
        assert_eq!(pixel(&frame, 32, 16), [128, 128, 128]);
    }

    #[test]
    fn bricks_and_mortar_both_appear() {
        let frame = camera().render(&NedPoint::new(0.0, 13.0, -6.0), 10.0, ImageType::Scene);
        let pixels: Vec<[u8; 3]> = (0..64).map(|u| pixel(&frame, u, 16)).collect();
        assert!(pixels.iter().any(|p| *p != MORTAR));
        let column: Vec<[u8; 3]> = (0..32).map(|v| pixel(&frame, 10, v)).collect();
        assert!(column.contains(&MORTAR));
        assert!(!pixels.contains(&SKY));
    }
}
