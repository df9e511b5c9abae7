// Lightweight spiral backdrops: particles circling the viewport center on
// wobbling radii. The lite style just clears and dots; the enhanced style
// adds glows, per-particle tints and optional fading trails.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::math::{random_between, Vector2};
use crate::surface::Surface;
use crate::timeline::reference_frames;
use crate::viewport::Viewport;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::VecDeque;
use std::f64::consts::PI;

const TRAIL_CAPACITY: usize = 20;
// Wobble clock gained per reference frame
const TIME_STEP: f64 = 0.016;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrbitStyle {
    Lite,
    Enhanced,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitConfig {
    pub style: OrbitStyle,
    pub count: usize,
    pub opacity: f64,
    pub show_trails: bool,
}

impl OrbitConfig {
    pub fn lite(count: usize, opacity: f64) -> Self {
        OrbitConfig {
            style: OrbitStyle::Lite,
            count,
            opacity,
            show_trails: false,
        }
    }

    pub fn enhanced(count: usize, opacity: f64, show_trails: bool) -> Self {
        OrbitConfig {
            style: OrbitStyle::Enhanced,
            count,
            opacity,
            show_trails,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Orbiter {
    pub angle: f64,
    pub radius: f64,
    pub speed: f64,
    pub opacity: f64,
    pub size: f64,
    pub color: Color,
    pub trail: VecDeque<Vector2>,
}

impl Orbiter {
    fn random<R: Rng + ?Sized>(rng: &mut R, style: OrbitStyle, index: usize, count: usize) -> Self {
        let spread = index as f64 / count as f64;
        match style {
            OrbitStyle::Lite => Orbiter {
                angle: spread * PI * 2.0,
                radius: random_between(rng, 50.0, 250.0),
                speed: random_between(rng, 0.002, 0.005),
                opacity: random_between(rng, 0.3, 1.0),
                size: random_between(rng, 1.0, 3.0),
                color: Color::TEAL,
                trail: VecDeque::new(),
            },
            OrbitStyle::Enhanced => Orbiter {
                angle: spread * PI * 4.0,
                radius: random_between(rng, 30.0, 330.0),
                speed: random_between(rng, 0.005, 0.015),
                opacity: random_between(rng, 0.4, 1.0),
                size: random_between(rng, 1.0, 5.0),
                color: Color::rgb(
                    random_between(rng, 45.0, 65.0) as u8,
                    random_between(rng, 212.0, 232.0) as u8,
                    random_between(rng, 191.0, 211.0) as u8,
                ),
                trail: VecDeque::with_capacity(TRAIL_CAPACITY),
            },
        }
    }
}

pub struct OrbitField {
    config: OrbitConfig,
    viewport: Viewport,
    orbiters: Vec<Orbiter>,
    time: f64,
    rng: StdRng,
}

impl OrbitField {
    pub fn new(config: OrbitConfig, viewport: Viewport, rng: StdRng) -> Self {
        let mut field = OrbitField {
            config,
            viewport,
            orbiters: Vec::new(),
            time: 0.0,
            rng,
        };
        field.seed();
        field
    }

    // Nothing to orbit until there is a center to orbit around
    fn seed(&mut self) {
        self.time = 0.0;
        if self.viewport.is_empty() {
            self.orbiters.clear();
            return;
        }
        let count = self.config.count;
        let style = self.config.style;
        let rng = &mut self.rng;
        self.orbiters = (0..count)
            .map(|i| Orbiter::random(&mut *rng, style, i, count))
            .collect();
        log::debug!("orbit field seeded with {} orbiters", self.orbiters.len());
    }

    pub fn orbiters(&self) -> &[Orbiter] {
        &self.orbiters
    }

    fn wobble(&self, index: usize) -> f64 {
        let t = self.time;
        let i = index as f64;
        match self.config.style {
            OrbitStyle::Lite => (t + i).sin() * 20.0,
            OrbitStyle::Enhanced => (t * 2.0 + i * 0.1).sin() * 30.0 + (t * 0.5 + i * 0.05).cos() * 15.0,
        }
    }

    pub fn position(&self, index: usize) -> Vector2 {
        let orbiter = &self.orbiters[index];
        let (cx, cy) = self.viewport.center();
        let radius = orbiter.radius + self.wobble(index);
        glm::vec2(cx + orbiter.angle.cos() * radius, cy + orbiter.angle.sin() * radius)
    }

    fn alpha(&self, index: usize) -> f64 {
        let t = self.time;
        let i = index as f64;
        let pulse = match self.config.style {
            OrbitStyle::Lite => 0.5 + 0.5 * (t * 2.0 + i).sin(),
            OrbitStyle::Enhanced => 0.7 + 0.3 * (t * 3.0 + i).sin(),
        };
        self.orbiters[index].opacity * self.config.opacity * pulse
    }

    fn trails_enabled(&self) -> bool {
        self.config.style == OrbitStyle::Enhanced && self.config.show_trails
    }

    pub fn tick(&mut self, dt: f64) {
        let step = reference_frames(dt);
        self.time += TIME_STEP * step;
        for orbiter in &mut self.orbiters {
            orbiter.angle += orbiter.speed * step;
        }

        if self.trails_enabled() {
            for index in 0..self.orbiters.len() {
                let position = self.position(index);
                let trail = &mut self.orbiters[index].trail;
                trail.push_back(position);
                if trail.len() > TRAIL_CAPACITY {
                    trail.pop_front();
                }
            }
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if self.viewport.is_empty() {
            return;
        }
        if self.trails_enabled() {
            // Translucent wash instead of a clear leaves streaks behind
            surface.fill_rect(
                glm::vec2(0.0, 0.0),
                self.viewport.width,
                self.viewport.height,
                Color::NIGHT.with_alpha(0.1),
            );
        } else {
            surface.clear(self.viewport.width, self.viewport.height);
        }

        for (index, orbiter) in self.orbiters.iter().enumerate() {
            if self.trails_enabled() {
                let len = orbiter.trail.len() as f64;
                for (n, point) in orbiter.trail.iter().enumerate() {
                    let fade = n as f64 / len;
                    let alpha = fade * orbiter.opacity * self.config.opacity * 0.5;
                    let size = fade * orbiter.size * 0.5;
                    if size > 0.0 {
                        surface.fill_circle(*point, size, orbiter.color.with_alpha(alpha));
                    }
                }
            }

            let position = self.position(index);
            let alpha = self.alpha(index);
            match self.config.style {
                OrbitStyle::Lite => {
                    surface.fill_circle(position, orbiter.size, orbiter.color.with_alpha(alpha));
                }
                OrbitStyle::Enhanced => {
                    surface.fill_glow(position, orbiter.size * 3.0, orbiter.color.with_alpha(alpha));
                    surface.fill_circle(position, orbiter.size, orbiter.color.with_alpha(alpha));
                }
            }
        }
    }
}

impl Backdrop for OrbitField {
    fn name(&self) -> &'static str {
        match self.config.style {
            OrbitStyle::Lite => "spiral-lite",
            OrbitStyle::Enhanced => "spiral-enhanced",
        }
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.seed();
    }

    fn advance(&mut self, dt: f64) {
        self.tick(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.render(surface);
    }
}
