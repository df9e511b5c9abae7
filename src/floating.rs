// Ambient floating decorations: soft orbs, small dots and thin gradient
// lines, each breathing through a repeating a -> b -> a loop.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::math::{ease_in_out, lerp, random_between, Vector2};
use crate::surface::Surface;
use crate::timeline::{reference_frames, REFERENCE_FPS};
use crate::viewport::Viewport;
use rand::rngs::StdRng;

const LINE_COUNT: usize = 3;
const LINE_LENGTH: f64 = 200.0;
const ORB_RADIUS: f64 = 40.0;
const DOT_RADIUS: f64 = 4.0;

/// Repeating loop timing. Nothing moves before `delay` has passed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LoopTiming {
    pub duration: f64,
    pub delay: f64,
}

impl LoopTiming {
    /// How far the loop is from its resting keyframe, in `[0, 1]`: eased up
    /// to 1 over the first half of each cycle and back to 0 over the second.
    pub fn swell(&self, time: f64) -> f64 {
        let local = time - self.delay;
        if local <= 0.0 || !(self.duration > 0.0) {
            return 0.0;
        }
        let p = (local % self.duration) / self.duration;
        if p < 0.5 {
            ease_in_out(p * 2.0)
        } else {
            1.0 - ease_in_out((p - 0.5) * 2.0)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatingKind {
    Orb,
    Dot,
    Line,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatingElement {
    pub kind: FloatingKind,
    // Fractions of the viewport
    pub anchor: Vector2,
    pub timing: LoopTiming,
}

impl FloatingElement {
    fn orb(i: usize) -> Self {
        let i_f = i as f64;
        FloatingElement {
            kind: FloatingKind::Orb,
            anchor: glm::vec2(0.10 + i_f * 0.20, 0.20 + (i % 2) as f64 * 0.60),
            timing: LoopTiming {
                duration: 6.0 + i_f * 2.0,
                delay: i_f * 1.5,
            },
        }
    }

    fn dot(i: usize, duration: f64) -> Self {
        let i_f = i as f64;
        FloatingElement {
            kind: FloatingKind::Dot,
            anchor: glm::vec2(0.15 + i_f * 0.15, 0.30 + (i % 3) as f64 * 0.20),
            timing: LoopTiming {
                duration,
                delay: i_f * 0.8,
            },
        }
    }

    fn line(i: usize) -> Self {
        let i_f = i as f64;
        FloatingElement {
            kind: FloatingKind::Line,
            anchor: glm::vec2(0.20 + i_f * 0.30, 0.40 + i_f * 0.20),
            timing: LoopTiming {
                duration: 3.0,
                delay: i_f * 2.0,
            },
        }
    }

    fn draw(&self, surface: &mut dyn Surface, viewport: Viewport, time: f64) {
        let s = self.timing.swell(time);
        let origin = glm::vec2(self.anchor.x * viewport.width, self.anchor.y * viewport.height);
        match self.kind {
            FloatingKind::Orb => {
                let center = origin + glm::vec2(30.0, -30.0) * s;
                let alpha = 0.1 * lerp(0.2, 0.5, s);
                surface.fill_glow(center, ORB_RADIUS * lerp(1.0, 1.3, s), Color::TEAL.with_alpha(alpha));
            }
            FloatingKind::Dot => {
                let center = origin + glm::vec2(0.0, -50.0) * s;
                let alpha = 0.4 * lerp(0.2, 0.8, s);
                surface.fill_circle(center, DOT_RADIUS * lerp(0.5, 1.2, s), Color::TEAL.with_alpha(alpha));
            }
            FloatingKind::Line => {
                if s <= 0.0 {
                    return;
                }
                // Grows from the middle of its slot
                let half = LINE_LENGTH * 0.5;
                let from = origin + glm::vec2(half - half * s, 0.0);
                let to = origin + glm::vec2(half + half * s, 0.0);
                let alpha = 0.2 * lerp(0.0, 0.6, s);
                surface.stroke_faded_line(from, to, 1.0, Color::TEAL.with_alpha(alpha));
            }
        }
    }
}

pub struct FloatingField {
    count: usize,
    viewport: Viewport,
    elements: Vec<FloatingElement>,
    time: f64,
    rng: StdRng,
}

impl FloatingField {
    pub fn new(count: usize, viewport: Viewport, rng: StdRng) -> Self {
        let mut field = FloatingField {
            count,
            viewport,
            elements: Vec::new(),
            time: 0.0,
            rng,
        };
        field.seed();
        field
    }

    fn seed(&mut self) {
        self.time = 0.0;
        if self.viewport.is_empty() {
            self.elements.clear();
            return;
        }
        let pairs = self.count / 2;
        let mut elements = Vec::with_capacity(pairs * 2 + LINE_COUNT);
        elements.extend((0..pairs).map(FloatingElement::orb));
        for i in 0..pairs {
            let duration = random_between(&mut self.rng, 4.0, 7.0);
            elements.push(FloatingElement::dot(i, duration));
        }
        elements.extend((0..LINE_COUNT).map(FloatingElement::line));
        self.elements = elements;
    }

    pub fn elements(&self) -> &[FloatingElement] {
        &self.elements
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick(&mut self, dt: f64) {
        self.time += reference_frames(dt) / REFERENCE_FPS;
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if self.viewport.is_empty() {
            return;
        }
        surface.clear(self.viewport.width, self.viewport.height);
        for element in &self.elements {
            element.draw(surface, self.viewport, self.time);
        }
    }
}

impl Backdrop for FloatingField {
    fn name(&self) -> &'static str {
        "floating"
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCall, RecordingSurface};
    use rand::SeedableRng;

    fn field(count: usize) -> FloatingField {
        FloatingField::new(count, Viewport::new(1000.0, 500.0), StdRng::seed_from_u64(3))
    }

    #[test]
    fn test_swell_waits_for_delay() {
        let timing = LoopTiming { duration: 4.0, delay: 2.0 };
        assert_eq!(timing.swell(0.0), 0.0);
        assert_eq!(timing.swell(1.9), 0.0);
        assert!((timing.swell(4.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_swell_returns_to_rest_each_cycle() {
        let timing = LoopTiming { duration: 3.0, delay: 0.0 };
        assert!((timing.swell(1.5) - 1.0).abs() < 1e-9);
        assert!(timing.swell(2.999) < 1e-6);
        assert!(timing.swell(4.5) > 0.999);
        for n in 0..200 {
            let s = timing.swell(n as f64 * 0.037);
            assert!(s >= 0.0 && s <= 1.0);
        }
    }

    #[test]
    fn test_zero_duration_stays_at_rest() {
        let timing = LoopTiming { duration: 0.0, delay: 0.0 };
        assert_eq!(timing.swell(5.0), 0.0);
    }

    #[test]
    fn test_element_population() {
        let field = field(12);
        let count = |kind| field.elements().iter().filter(|e| e.kind == kind).count();
        assert_eq!(count(FloatingKind::Orb), 6);
        assert_eq!(count(FloatingKind::Dot), 6);
        assert_eq!(count(FloatingKind::Line), 3);
        for e in field.elements().iter().filter(|e| e.kind == FloatingKind::Dot) {
            assert!(e.timing.duration >= 4.0 && e.timing.duration < 7.0);
        }
    }

    #[test]
    fn test_odd_count_rounds_down() {
        let field = field(5);
        assert_eq!(field.elements().len(), 2 + 2 + 3);
    }

    #[test]
    fn test_lines_hidden_at_rest() {
        let field = field(12);
        let mut surface = RecordingSurface::new();
        field.render(&mut surface);
        assert_eq!(surface.calls[0], DrawCall::Clear);
        assert!(!surface.calls.iter().any(|c| matches!(c, DrawCall::FadedLine { .. })));
        assert_eq!(surface.paints(), 12);
    }

    #[test]
    fn test_first_line_grows_from_its_middle() {
        let mut field = field(0);
        // Peak of the first line's cycle
        for _ in 0..90 {
            field.tick(1.0 / 60.0);
        }
        let mut surface = RecordingSurface::new();
        field.render(&mut surface);
        let lines: Vec<_> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::FadedLine { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 1);
        let (from, to) = lines[0];
        assert!((glm::distance(&from, &to) - LINE_LENGTH).abs() < 1e-6);
        assert!((from.x - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_unmeasured_field_waits_for_resize() {
        let mut field = FloatingField::new(12, Viewport::new(0.0, 0.0), StdRng::seed_from_u64(3));
        assert!(field.elements().is_empty());
        field.resize(Viewport::new(1000.0, 500.0));
        assert_eq!(field.elements().len(), 15);
    }

    #[test]
    fn test_zero_area_draws_nothing() {
        let mut field = field(12);
        field.resize(Viewport::new(0.0, 0.0));
        let mut surface = RecordingSurface::new();
        field.render(&mut surface);
        assert!(surface.calls.is_empty());
    }
}
