// Single decorative point of a particle field: position, velocity, glow size,
// and a phase that drives its breathing opacity

use crate::color::Color;
use crate::math::{random_between, Vector2};
use crate::viewport::Viewport;
use rand::Rng;
use std::f64::consts::PI;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lifetime {
    pub life: f64,
    pub max_life: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vector2,
    pub vel: Vector2,
    pub size: f64,
    pub opacity: f64,
    pub phase: f64,
    pub phase_speed: f64,
    pub lifetime: Option<Lifetime>,
    // Own hue in degrees instead of the field color
    pub hue: Option<f64>,
}

/// Ranges a field draws fresh particles from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpawnRanges {
    pub speed: f64,
    pub min_size: f64,
    pub size_spread: f64,
    pub opacity: f64,
    pub opacity_floor: f64,
    pub pulse: bool,
    // (min, spread) of max_life in reference frames
    pub lifetime: Option<(f64, f64)>,
    // (min, spread) of the hue in degrees
    pub hue: Option<(f64, f64)>,
}

impl Particle {
    pub fn new(pos_x: f64, pos_y: f64, vel_x: f64, vel_y: f64, size: f64, opacity: f64) -> Particle {
        Particle {
            pos: glm::vec2(pos_x, pos_y),
            vel: glm::vec2(vel_x, vel_y),
            size,
            opacity,
            // sin(pi/2) = 1, so a fresh particle starts at full pulse
            phase: PI / 2.0,
            phase_speed: 0.0,
            lifetime: None,
            hue: None,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, bounds: Viewport, ranges: &SpawnRanges) -> Particle {
        let pos_x = rng.gen::<f64>() * bounds.width;
        let pos_y = rng.gen::<f64>() * bounds.height;
        let vel_x = (rng.gen::<f64>() - 0.5) * ranges.speed;
        let vel_y = (rng.gen::<f64>() - 0.5) * ranges.speed;
        let size = rng.gen::<f64>() * ranges.size_spread + ranges.min_size;
        let opacity = rng.gen::<f64>() * ranges.opacity + ranges.opacity_floor;

        let mut particle = Particle::new(pos_x, pos_y, vel_x, vel_y, size, opacity);
        if ranges.pulse {
            particle.phase = rng.gen::<f64>() * PI * 2.0;
            particle.phase_speed = random_between(rng, 0.02, 0.04);
        }
        if let Some((min, spread)) = ranges.lifetime {
            particle.lifetime = Some(Lifetime {
                life: 0.0,
                max_life: min + rng.gen::<f64>() * spread,
            });
        }
        if let Some((min, spread)) = ranges.hue {
            particle.hue = Some(min + rng.gen::<f64>() * spread);
        }
        particle
    }

    /// `base` unless the particle carries its own hue.
    pub fn color(&self, base: Color) -> Color {
        match self.hue {
            Some(hue) => Color::from_hsl(hue, 0.7, 0.6),
            None => base,
        }
    }

    // `step` is measured in reference frames (1/60 s)
    pub fn advance(&mut self, step: f64, bounds: Viewport) {
        self.pos += self.vel * step;
        self.phase += self.phase_speed * step;
        self.pos.x = wrap(self.pos.x, bounds.width);
        self.pos.y = wrap(self.pos.y, bounds.height);
        if let Some(lifetime) = self.lifetime.as_mut() {
            lifetime.life += step;
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.lifetime {
            Some(lifetime) => lifetime.life >= lifetime.max_life,
            None => false,
        }
    }

    /// Base opacity modulated by the phase sine and, for lifetime particles,
    /// the fraction of life remaining.
    pub fn pulse_opacity(&self) -> f64 {
        let pulse = 0.5 + 0.5 * self.phase.sin();
        let fade = match self.lifetime {
            Some(lifetime) if lifetime.max_life > 0.0 => {
                (1.0 - lifetime.life / lifetime.max_life).max(0.0)
            }
            _ => 1.0,
        };
        self.opacity * pulse * fade
    }
}

// Re-enter from the opposite edge; result always lands in [0, extent)
pub fn wrap(value: f64, extent: f64) -> f64 {
    if !(extent > 0.0) {
        return 0.0;
    }
    let wrapped = value.rem_euclid(extent);
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn ranges() -> SpawnRanges {
        SpawnRanges {
            speed: 0.3,
            min_size: 1.0,
            size_spread: 2.0,
            opacity: 0.4,
            opacity_floor: 0.1,
            pulse: true,
            lifetime: None,
            hue: None,
        }
    }

    #[test]
    fn test_wrap_reenters_opposite_edge() {
        assert_eq!(wrap(-1.0, 100.0), 99.0);
        assert_eq!(wrap(101.0, 100.0), 1.0);
        assert_eq!(wrap(100.0, 100.0), 0.0);
        assert_eq!(wrap(42.0, 100.0), 42.0);
        assert!(wrap(-1e-20, 100.0) < 100.0);
        assert_eq!(wrap(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_random_particle_respects_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Viewport::new(640.0, 480.0);
        for _ in 0..500 {
            let p = Particle::random(&mut rng, bounds, &ranges());
            assert!(p.pos.x >= 0.0 && p.pos.x < 640.0);
            assert!(p.pos.y >= 0.0 && p.pos.y < 480.0);
            assert!(p.vel.x.abs() <= 0.15 && p.vel.y.abs() <= 0.15);
            assert!(p.size >= 1.0 && p.size < 3.0);
            assert!(p.opacity >= 0.1 && p.opacity < 0.5);
            assert!(p.phase_speed >= 0.02 && p.phase_speed < 0.04);
            assert!(p.lifetime.is_none());
        }
    }

    #[test]
    fn test_hued_particles_pick_their_own_color() {
        let mut rng = StdRng::seed_from_u64(8);
        let hued = SpawnRanges {
            hue: Some((180.0, 40.0)),
            ..ranges()
        };
        for _ in 0..200 {
            let p = Particle::random(&mut rng, Viewport::new(100.0, 100.0), &hued);
            let hue = p.hue.expect("hue drawn");
            assert!(hue >= 180.0 && hue < 220.0);
            assert_eq!(p.color(Color::TEAL), Color::from_hsl(hue, 0.7, 0.6));
        }
        let plain = Particle::new(0.0, 0.0, 0.0, 0.0, 1.0, 1.0);
        assert_eq!(plain.color(Color::TEAL), Color::TEAL);
    }

    #[test]
    fn test_advance_moves_by_velocity_per_frame() {
        let mut p = Particle::new(10.0, 10.0, 1.0, -2.0, 1.0, 1.0);
        p.advance(1.0, Viewport::new(100.0, 100.0));
        assert_eq!(p.pos, glm::vec2(11.0, 8.0));
        p.advance(0.5, Viewport::new(100.0, 100.0));
        assert_eq!(p.pos, glm::vec2(11.5, 7.0));
    }

    #[test]
    fn test_lifetime_fades_and_expires() {
        let mut p = Particle::new(0.0, 0.0, 0.0, 0.0, 1.0, 0.8);
        p.lifetime = Some(Lifetime {
            life: 0.0,
            max_life: 4.0,
        });
        let bounds = Viewport::new(10.0, 10.0);
        p.advance(2.0, bounds);
        assert!((p.pulse_opacity() - 0.4).abs() < 1e-9);
        assert!(!p.is_expired());
        p.advance(2.0, bounds);
        assert!(p.is_expired());
        assert_eq!(p.pulse_opacity(), 0.0);
    }
}
