// Radial particle bursts. Particles fly out from an explosion point, slow
// down under drag and fade out over their lifetime; spent ones are dropped.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::math::{random_between, Vector2};
use crate::surface::Surface;
use crate::timeline::reference_frames;
use crate::viewport::Viewport;
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;

// Velocity kept per reference frame
const DRAG: f64 = 0.99;
// Chance per reference frame of a small random burst while spawning
const SPAWN_CHANCE: f64 = 0.1;
const SPAWN_SIZE: usize = 5;
const OPENING_SIZE: usize = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BurstKind {
    Spark,
    Glow,
}

impl BurstKind {
    fn color(self) -> Color {
        match self {
            BurstKind::Spark => Color::rgb(255, 255, 255),
            BurstKind::Glow => Color::TEAL,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BurstParticle {
    pub pos: Vector2,
    pub vel: Vector2,
    pub life: f64,
    pub max_life: f64,
    pub size: f64,
    pub kind: BurstKind,
}

impl BurstParticle {
    pub fn alpha(&self) -> f64 {
        1.0 - self.life / self.max_life
    }

    fn advance(&mut self, step: f64) {
        self.pos += self.vel * step;
        self.vel *= DRAG.powf(step);
        self.life += step;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let alpha = self.alpha();
        let color = self.kind.color().with_alpha(alpha);
        match self.kind {
            BurstKind::Glow => surface.fill_glow(self.pos, self.size * 2.0, color),
            BurstKind::Spark => surface.fill_circle(self.pos, self.size * alpha, color),
        }
    }
}

pub struct BurstField {
    viewport: Viewport,
    particles: Vec<BurstParticle>,
    // Keep throwing small bursts at random spots
    spawning: bool,
    rng: StdRng,
}

impl BurstField {
    pub fn new(viewport: Viewport, spawning: bool, rng: StdRng) -> Self {
        let mut field = BurstField {
            viewport,
            particles: Vec::new(),
            spawning,
            rng,
        };
        field.open();
        field
    }

    // Big glow burst from the middle of the viewport
    fn open(&mut self) {
        self.particles.clear();
        if self.viewport.is_empty() {
            return;
        }
        let (cx, cy) = self.viewport.center();
        self.explode(glm::vec2(cx, cy), OPENING_SIZE, BurstKind::Glow);
    }

    pub fn explode(&mut self, origin: Vector2, count: usize, kind: BurstKind) {
        self.particles.reserve(count);
        for i in 0..count {
            let angle = (PI * 2.0 * i as f64) / count as f64 + self.rng.gen::<f64>() * 0.5;
            let speed = random_between(&mut self.rng, 2.0, 8.0);
            let max_life = random_between(&mut self.rng, 60.0, 120.0);
            let size = match kind {
                BurstKind::Glow => random_between(&mut self.rng, 3.0, 8.0),
                BurstKind::Spark => random_between(&mut self.rng, 1.0, 4.0),
            };
            self.particles.push(BurstParticle {
                pos: origin,
                vel: glm::vec2(angle.cos() * speed, angle.sin() * speed),
                life: 0.0,
                max_life,
                size,
                kind,
            });
        }
    }

    pub fn particles(&self) -> &[BurstParticle] {
        &self.particles
    }

    pub fn tick(&mut self, dt: f64) {
        let step = reference_frames(dt);
        for particle in &mut self.particles {
            particle.advance(step);
        }
        self.particles.retain(|p| p.alpha() > 0.0);

        if self.spawning && !self.viewport.is_empty() && self.rng.gen::<f64>() < SPAWN_CHANCE * step {
            let origin = glm::vec2(
                self.rng.gen::<f64>() * self.viewport.width,
                self.rng.gen::<f64>() * self.viewport.height,
            );
            let kind = if self.rng.gen::<f64>() > 0.5 {
                BurstKind::Spark
            } else {
                BurstKind::Glow
            };
            self.explode(origin, SPAWN_SIZE, kind);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if self.viewport.is_empty() {
            return;
        }
        surface.clear(self.viewport.width, self.viewport.height);
        for particle in &self.particles {
            particle.draw(surface);
        }
    }
}

impl Backdrop for BurstField {
    fn name(&self) -> &'static str {
        "burst"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.open();
    }

    fn advance(&mut self, dt: f64) {
        self.tick(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.render(surface);
    }

    fn is_finished(&self) -> bool {
        !self.spawning && self.particles.is_empty()
    }
}
