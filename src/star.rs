// One star of the spiral backdrop. A star sits on the spiral at its arrival
// fraction, then springs outward along a fixed offset once the drawing
// progress passes it. Everything here is fixed at construction.

use crate::math::{clamp, ease_out_elastic, lerp, random_between, Vector2};
use crate::spiral::{FrameParams, ProjectedDot, SpiralSettings};
use rand::Rng;
use std::f64::consts::PI;

// Keeps the outward spring subtle
const DISPLACEMENT_SCALE: f64 = 0.7;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Star {
    pub angle: f64,
    pub distance: f64,
    pub rotation_direction: f64,
    pub expansion_rate: f64,
    pub final_scale: f64,
    pub offset: Vector2,
    pub spiral_arrival: f64,
    pub stroke_weight: f64,
    pub z: f64,
}

impl Star {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, settings: &SpiralSettings) -> Star {
        let angle = rng.gen::<f64>() * PI * 2.0;
        let distance = 25.0 * rng.gen::<f64>() + 10.0;
        let rotation_direction = if rng.gen::<f64>() > 0.5 { 1.0 } else { -1.0 };
        let expansion_rate = 1.0 + rng.gen::<f64>() * 0.5;
        let final_scale = 0.5 + rng.gen::<f64>() * 0.4;

        // Cubic bias toward late arrivals, kept under 1/1.3
        let spiral_arrival = (1.0 - (1.0 - rng.gen::<f64>()).powf(3.0)) / 1.3;

        let z = random_between(
            rng,
            0.5 * settings.camera_z,
            settings.camera_travel + settings.camera_z,
        );
        let z = lerp(z, settings.camera_travel / 2.0, 0.3 * spiral_arrival);
        let stroke_weight = rng.gen::<f64>().powf(2.0) * 0.7;

        Star {
            angle,
            distance,
            rotation_direction,
            expansion_rate,
            final_scale,
            offset: glm::vec2(distance * angle.cos(), distance * angle.sin()),
            spiral_arrival,
            stroke_weight,
            z,
        }
    }

    /// Star with a chosen arrival and depth; the offset points along +x.
    #[cfg(test)]
    pub fn fixed(spiral_arrival: f64, z: f64, distance: f64, stroke_weight: f64) -> Star {
        Star {
            angle: 0.0,
            distance,
            rotation_direction: 1.0,
            expansion_rate: 1.0,
            final_scale: 1.0,
            offset: glm::vec2(distance, 0.0),
            spiral_arrival,
            stroke_weight,
            z,
        }
    }

    pub fn is_launched(&self, t1: f64) -> bool {
        t1 - self.spiral_arrival > 0.0
    }

    /// Where this star lands on screen for the given frame, if anywhere.
    pub fn project(&self, settings: &SpiralSettings, frame: &FrameParams) -> Option<ProjectedDot> {
        if !self.is_launched(frame.t1) {
            return None;
        }
        let q = frame.t1 - self.spiral_arrival;

        let displacement = clamp(3.0 * q, 0.0, 1.0);
        let easing = ease_out_elastic(displacement);
        let anchor = settings.spiral_path(self.spiral_arrival);
        let screen = anchor + self.offset * (easing * DISPLACEMENT_SCALE);

        // Lift the screen point into world space at this star's depth, as
        // seen from the resting camera
        let lift = (self.z - settings.camera_z) / settings.view_zoom;
        let position = glm::vec3(screen.x * lift, screen.y * lift, self.z);

        let size_multiplier = 0.8 + displacement * 0.4;
        let dot_size = 4.0 * self.stroke_weight * size_multiplier;
        settings.project(position, dot_size, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_random_star_invariants() {
        let settings = SpiralSettings::default();
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..2000 {
            let star = Star::random(&mut rng, &settings);
            assert!(star.spiral_arrival >= 0.0 && star.spiral_arrival < 1.0);
            assert!(star.distance >= 10.0 && star.distance < 35.0);
            assert!(star.stroke_weight >= 0.0 && star.stroke_weight < 0.7);
            // Depth range is [-200, 3000) before the pull toward 1700
            assert!(star.z >= -200.0 && star.z < 3000.0, "z={}", star.z);
            assert!((glm::length(&star.offset) - star.distance).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_stars() {
        let settings = SpiralSettings::default();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(Star::random(&mut a, &settings), Star::random(&mut b, &settings));
        }
    }

    #[test]
    fn test_unlaunched_star_projects_nothing() {
        let settings = SpiralSettings::default();
        let star = Star::fixed(0.4, 1000.0, 20.0, 0.5);
        let before = settings.frame(settings.time_for_t1(0.39));
        let after = settings.frame(settings.time_for_t1(0.41));
        assert!(star.project(&settings, &before).is_none());
        assert!(star.project(&settings, &after).is_some());
    }

    #[test]
    fn test_nearer_star_is_larger() {
        let settings = SpiralSettings::default();
        let near = Star::fixed(0.1, 300.0, 20.0, 0.5);
        let far = Star::fixed(0.1, 2000.0, 20.0, 0.5);
        let frame = settings.frame(0.3);
        let near_dot = near.project(&settings, &frame).expect("near star visible");
        let far_dot = far.project(&settings, &frame).expect("far star visible");
        assert!(near_dot.size > far_dot.size);
    }
}
