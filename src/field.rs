// Flat particle field: a fixed population drifting across the viewport,
// wrapping at the edges, with faint lines between close neighbours.
//
// Connections are found by checking every unordered pair each frame. That is
// fine for the populations used on the page (well under a few hundred); a
// much larger field would need spatial binning first.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::particle::{Particle, SpawnRanges};
use crate::surface::Surface;
use crate::timeline::reference_frames;
use crate::viewport::Viewport;
use rand::rngs::StdRng;

/// How a connection line's alpha is derived besides its length.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineAlpha {
    // Dimmed by the fainter of the two particles
    FollowParticles,
    DistanceOnly,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub name: &'static str,
    pub count: usize,
    pub connection_distance: f64,
    // Scales every connection alpha
    pub connection_strength: f64,
    pub connection_width: f64,
    pub line_alpha: LineAlpha,
    // Soft halo under each particle
    pub glow: bool,
    pub color: Color,
    pub spawn: SpawnRanges,
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig::background(50, 100.0, 0.3, 0.4)
    }
}

impl FieldConfig {
    /// Ambient background field: pulsing particles that live forever.
    pub fn background(count: usize, connection_distance: f64, speed: f64, opacity: f64) -> Self {
        FieldConfig {
            name: "particles",
            count,
            connection_distance,
            connection_strength: 1.0,
            connection_width: 0.5,
            line_alpha: LineAlpha::FollowParticles,
            glow: true,
            color: Color::TEAL,
            spawn: SpawnRanges {
                speed,
                min_size: 1.0,
                size_spread: 2.0,
                opacity,
                opacity_floor: 0.1,
                pulse: true,
                lifetime: None,
                hue: None,
            },
        }
    }

    /// Field shown behind the intro card: particles fade out over a few
    /// seconds and are replaced by fresh ones.
    pub fn intro() -> Self {
        FieldConfig {
            name: "intro-particles",
            count: 30,
            connection_distance: 80.0,
            connection_strength: 0.3,
            connection_width: 0.5,
            line_alpha: LineAlpha::FollowParticles,
            glow: false,
            color: Color::TEAL,
            spawn: SpawnRanges {
                speed: 0.5,
                min_size: 0.5,
                size_spread: 2.0,
                opacity: 0.5,
                opacity_floor: 0.2,
                pulse: false,
                lifetime: Some((300.0, 200.0)),
                hue: None,
            },
        }
    }

    /// Dense, fast field where every particle has its own shade between
    /// teal and blue. Lines fade with distance only.
    pub fn hued() -> Self {
        FieldConfig {
            name: "hued-particles",
            count: 200,
            connection_distance: 100.0,
            connection_strength: 0.3,
            connection_width: 0.5,
            line_alpha: LineAlpha::DistanceOnly,
            glow: false,
            color: Color::TEAL,
            spawn: SpawnRanges {
                speed: 2.0,
                min_size: 1.0,
                size_spread: 2.0,
                opacity: 0.5,
                opacity_floor: 0.2,
                pulse: false,
                lifetime: None,
                hue: Some((180.0, 40.0)),
            },
        }
    }
}

/// A line to draw between particles `from` and `to` (indices, `from < to`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Connection {
    pub from: usize,
    pub to: usize,
    pub alpha: f64,
}

pub struct ParticleField {
    config: FieldConfig,
    bounds: Viewport,
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(config: FieldConfig, bounds: Viewport, rng: StdRng) -> Self {
        let mut field = ParticleField {
            config,
            bounds,
            particles: Vec::new(),
            rng,
        };
        field.initialize();
        field
    }

    /// Field with a caller-supplied population, used when exact positions matter.
    #[cfg(test)]
    pub fn from_particles(
        config: FieldConfig,
        bounds: Viewport,
        particles: Vec<Particle>,
        rng: StdRng,
    ) -> Self {
        ParticleField {
            config,
            bounds,
            particles,
            rng,
        }
    }

    /// Throws away the current population and seeds `count` new particles.
    pub fn initialize(&mut self) {
        self.particles.clear();
        if self.bounds.is_empty() {
            return;
        }
        self.particles.reserve(self.config.count);
        for _ in 0..self.config.count {
            let particle = Particle::random(&mut self.rng, self.bounds, &self.config.spawn);
            self.particles.push(particle);
        }
        log::debug!(
            "particle field seeded: {} particles in {}x{}",
            self.particles.len(),
            self.bounds.width,
            self.bounds.height
        );
    }

    // Entity state does not survive a resize
    pub fn resize(&mut self, bounds: Viewport) {
        self.bounds = bounds;
        self.initialize();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn tick(&mut self, dt: f64) {
        if self.bounds.is_empty() {
            return;
        }
        let step = reference_frames(dt);
        for particle in &mut self.particles {
            particle.advance(step, self.bounds);
            if particle.is_expired() {
                *particle = Particle::random(&mut self.rng, self.bounds, &self.config.spawn);
            }
        }
    }

    pub fn connections(&self) -> Vec<Connection> {
        let max_distance = self.config.connection_distance;
        let mut connections = Vec::new();
        if !(max_distance > 0.0) {
            return connections;
        }

        for (i, a) in self.particles.iter().enumerate() {
            for (offset, b) in self.particles[i + 1..].iter().enumerate() {
                let distance = glm::distance(&a.pos, &b.pos);
                if distance < max_distance {
                    let dimmer = match self.config.line_alpha {
                        LineAlpha::FollowParticles => a.pulse_opacity().min(b.pulse_opacity()),
                        LineAlpha::DistanceOnly => 1.0,
                    };
                    connections.push(Connection {
                        from: i,
                        to: i + 1 + offset,
                        alpha: (1.0 - distance / max_distance) * dimmer * self.config.connection_strength,
                    });
                }
            }
        }
        connections
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if self.bounds.is_empty() {
            return;
        }
        let base = self.config.color;

        for particle in &self.particles {
            let color = particle.color(base).with_alpha(particle.pulse_opacity());
            if self.config.glow {
                surface.fill_glow(particle.pos, particle.size * 3.0, color);
            }
            surface.fill_circle(particle.pos, particle.size, color);
        }

        for connection in self.connections() {
            let from = &self.particles[connection.from];
            let to = &self.particles[connection.to];
            // Lines take the color of their first particle
            surface.stroke_line(
                from.pos,
                to.pos,
                self.config.connection_width,
                from.color(base).with_alpha(connection.alpha),
            );
        }
    }
}

impl Backdrop for ParticleField {
    fn name(&self) -> &'static str {
        self.config.name
    }

    fn resize(&mut self, viewport: Viewport) {
        ParticleField::resize(self, viewport);
    }

    fn advance(&mut self, dt: f64) {
        self.tick(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if self.bounds.is_empty() {
            return;
        }
        surface.clear(self.bounds.width, self.bounds.height);
        self.render(surface);
    }
}
