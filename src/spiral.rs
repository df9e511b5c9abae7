// Spiral star field with a receding camera.
//
// A single normalized time in `[0, 1)` drives the whole loop. Two progress
// values are derived from it:
//
// - `t1` runs from time 0 to shortly after the change event and draws the
//   spiral path, launching stars as it passes them;
// - `t2` runs from the change event to the end of the loop and dollies the
//   camera back through the field while rolling the view a quarter turn.
//
// Stars are positioned on the 2D spiral, lifted into 3D at their own depth
// and projected back with a pinhole camera, so the dolly produces real
// perspective.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::math::{clamp, ease_power, map_range, rotate_about_midpoint, Vector2, Vector3};
use crate::star::Star;
use crate::surface::Surface;
use crate::timeline::Timeline;
use crate::viewport::Viewport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

// Closest a visible point may get to the camera plane before dividing
pub const MIN_CAMERA_DEPTH: f64 = 1.0;

// Window after the change event during which the spiral keeps drawing
const DRAW_OVERLAP: f64 = 0.25;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpiralSettings {
    pub change_event_time: f64,
    pub camera_z: f64,
    pub camera_travel: f64,
    pub start_dot_y_offset: f64,
    pub view_zoom: f64,
    pub star_count: usize,
    pub trail_length: usize,
    pub spiral_turns: f64,
    pub spiral_radius: f64,
    pub loop_seconds: f64,
    pub opacity: f64,
    pub show_trail: bool,
    pub seed: u64,
    pub color: Color,
}

impl Default for SpiralSettings {
    fn default() -> Self {
        SpiralSettings {
            change_event_time: 0.32,
            camera_z: -400.0,
            camera_travel: 3400.0,
            start_dot_y_offset: 28.0,
            view_zoom: 100.0,
            star_count: 3000,
            trail_length: 60,
            spiral_turns: 4.0,
            spiral_radius: 120.0,
            loop_seconds: 20.0,
            opacity: 1.0,
            show_trail: true,
            seed: 1234,
            color: Color::TEAL,
        }
    }
}

/// Everything derived from the loop time for one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameParams {
    pub time: f64,
    pub t1: f64,
    pub t2: f64,
    pub camera_z: f64,
    pub view_rotation: f64,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectedDot {
    pub pos: Vector2,
    pub size: f64,
}

impl SpiralSettings {
    fn draw_end(&self) -> f64 {
        self.change_event_time + DRAW_OVERLAP
    }

    pub fn frame(&self, time: f64) -> FrameParams {
        let t1 = clamp(map_range(time, 0.0, self.draw_end(), 0.0, 1.0), 0.0, 1.0);
        let t2 = clamp(map_range(time, self.change_event_time, 1.0, 0.0, 1.0), 0.0, 1.0);
        FrameParams {
            time,
            t1,
            t2,
            camera_z: self.camera_z + ease_power(t2.powf(1.2), 1.8) * self.camera_travel,
            view_rotation: -PI * ease_power(t2, 2.7) * 0.5,
        }
    }

    // Inverse of the t1 mapping, for driving the engine by drawing progress
    #[cfg(test)]
    pub fn time_for_t1(&self, t1: f64) -> f64 {
        t1 * self.draw_end()
    }

    /// Point on the spiral at progress `p`. The square root spreads the
    /// turns out toward the rim and packs them near the core.
    pub fn spiral_path(&self, p: f64) -> Vector2 {
        let p = ease_power(clamp(1.2 * p, 0.0, 1.0), 1.8);
        let theta = 2.0 * PI * self.spiral_turns * p.sqrt();
        let r = self.spiral_radius * p.sqrt();
        glm::vec2(r * theta.cos(), r * theta.sin() + self.start_dot_y_offset)
    }

    /// Pinhole projection through the camera of `frame`. Points on or behind
    /// the camera plane are dropped.
    pub fn project(
        &self,
        position: Vector3,
        size_factor: f64,
        frame: &FrameParams,
    ) -> Option<ProjectedDot> {
        if position.z <= frame.camera_z {
            return None;
        }
        let depth = (position.z - frame.camera_z).max(MIN_CAMERA_DEPTH);
        Some(ProjectedDot {
            pos: glm::vec2(
                self.view_zoom * position.x / depth,
                self.view_zoom * position.y / depth,
            ),
            size: 300.0 * size_factor / depth,
        })
    }
}

pub struct SpiralEngine {
    settings: SpiralSettings,
    stars: Vec<Star>,
}

impl SpiralEngine {
    /// Seeds the star field from `settings.seed`, so every engine with the
    /// same settings draws the same field.
    pub fn new(settings: SpiralSettings) -> Self {
        let mut rng = StdRng::seed_from_u64(settings.seed);
        Self::with_rng(settings, &mut rng)
    }

    pub fn with_rng<R: Rng + ?Sized>(settings: SpiralSettings, rng: &mut R) -> Self {
        let stars = (0..settings.star_count)
            .map(|_| Star::random(&mut *rng, &settings))
            .collect::<Vec<_>>();
        log::debug!("spiral seeded with {} stars", stars.len());
        SpiralEngine { settings, stars }
    }

    #[cfg(test)]
    pub fn from_stars(settings: SpiralSettings, stars: Vec<Star>) -> Self {
        SpiralEngine { settings, stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Screen-space dots of every star visible at `time`, relative to the
    /// view center and before the view rotation.
    #[cfg(test)]
    pub fn visible_dots(&self, time: f64) -> Vec<ProjectedDot> {
        let frame = self.settings.frame(time);
        self.stars
            .iter()
            .filter_map(|star| star.project(&self.settings, &frame))
            .collect()
    }

    fn start_dot(&self, frame: &FrameParams) -> Option<ProjectedDot> {
        if frame.time <= self.settings.change_event_time {
            return None;
        }
        let dy = self.settings.camera_z * self.settings.start_dot_y_offset / self.settings.view_zoom;
        let position = glm::vec3(0.0, dy, self.settings.camera_travel);
        self.settings.project(position, 2.0, frame)
    }

    fn draw_trail(&self, surface: &mut dyn Surface, frame: &FrameParams) {
        let length = self.settings.trail_length;
        let t1 = frame.t1;
        let wobble = (frame.time * PI * 2.0).sin() * 0.3 + 0.5;

        for i in 0..length {
            let f = map_range(i as f64, 0.0, length as f64, 1.0, 0.1);
            let width = (1.0 - t1 + 2.0 * (PI * t1).sin()) * f;
            let alpha = f * 0.6 * self.settings.opacity;

            let position = self.settings.spiral_path(t1 - 0.0002 * i as f64);
            let nudge = position + glm::vec2(3.0, 3.0);
            let rotated = rotate_about_midpoint(position, nudge, wobble, i % 2 == 0);

            surface.fill_circle(rotated, width / 2.0, self.settings.color.with_alpha(alpha));
        }
    }

    /// Draws the frame at loop time `time` centered in `viewport`.
    pub fn render(&self, surface: &mut dyn Surface, viewport: Viewport, time: f64) {
        if viewport.is_empty() {
            return;
        }
        let frame = self.settings.frame(time);
        let (cx, cy) = viewport.center();

        surface.clear(viewport.width, viewport.height);
        surface.save();
        surface.translate(glm::vec2(cx, cy));
        surface.rotate(frame.view_rotation);

        if self.settings.show_trail {
            self.draw_trail(surface, &frame);
        }

        let star_color = self.settings.color.with_alpha(0.8 * self.settings.opacity);
        for star in &self.stars {
            if let Some(dot) = star.project(&self.settings, &frame) {
                surface.fill_circle(dot.pos, dot.size / 2.0, star_color);
            }
        }

        if let Some(dot) = self.start_dot(&frame) {
            surface.fill_circle(dot.pos, dot.size / 2.0, star_color);
        }

        surface.restore();
    }
}

/// Spiral engine paired with the timeline that drives it. The star field
/// does not depend on the viewport, so it is built on the first resize and
/// kept from then on.
pub struct SpiralBackdrop {
    settings: SpiralSettings,
    engine: Option<SpiralEngine>,
    timeline: Timeline,
    viewport: Viewport,
}

impl SpiralBackdrop {
    pub fn new(settings: SpiralSettings) -> Self {
        SpiralBackdrop {
            settings,
            engine: None,
            timeline: Timeline::new(settings.loop_seconds),
            viewport: Viewport::new(0.0, 0.0),
        }
    }

    pub fn engine(&self) -> Option<&SpiralEngine> {
        self.engine.as_ref()
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl Backdrop for SpiralBackdrop {
    fn name(&self) -> &'static str {
        "spiral"
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if self.engine.is_none() && !viewport.is_empty() {
            self.engine = Some(SpiralEngine::new(self.settings));
        }
        self.timeline.reset();
    }

    fn advance(&mut self, dt: f64) {
        self.timeline.advance(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        if let Some(engine) = &self.engine {
            engine.render(surface, self.viewport, self.timeline.phase());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{DrawCall, RecordingSurface};

    fn small_settings() -> SpiralSettings {
        SpiralSettings {
            star_count: 200,
            ..SpiralSettings::default()
        }
    }

    #[test]
    fn test_frame_progress_ranges() {
        let settings = SpiralSettings::default();
        let start = settings.frame(0.0);
        assert_eq!((start.t1, start.t2), (0.0, 0.0));
        assert_eq!(start.camera_z, -400.0);
        assert_eq!(start.view_rotation, 0.0);

        let middle = settings.frame(0.57);
        assert!((middle.t1 - 1.0).abs() < 1e-9);
        assert!(middle.t2 > 0.0 && middle.t2 < 1.0);

        let end = settings.frame(1.0);
        assert_eq!(end.t2, 1.0);
        assert!((end.camera_z - 3000.0).abs() < 1e-9);
        assert!((end.view_rotation + PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_spiral_path_starts_at_offset_and_ends_on_rim() {
        let settings = SpiralSettings::default();
        let origin = settings.spiral_path(0.0);
        assert!(origin.x.abs() < 1e-9);
        assert!((origin.y - 28.0).abs() < 1e-9);

        // 1.2p saturates, so the rim is reached before p = 1
        let rim = settings.spiral_path(1.0 / 1.2);
        let radius = glm::length(&(rim - glm::vec2(0.0, 28.0)));
        assert!((radius - 120.0).abs() < 1e-6);
        assert_eq!(settings.spiral_path(0.9), settings.spiral_path(1.0));
    }

    #[test]
    fn test_projection_skips_points_behind_camera() {
        let settings = SpiralSettings::default();
        let frame = settings.frame(0.0);
        assert!(settings
            .project(glm::vec3(1.0, 1.0, -400.0), 1.0, &frame)
            .is_none());
        assert!(settings
            .project(glm::vec3(1.0, 1.0, -500.0), 1.0, &frame)
            .is_none());
        let dot = settings
            .project(glm::vec3(10.0, -20.0, -300.0), 1.0, &frame)
            .expect("in front of camera");
        assert!((dot.pos.x - 10.0).abs() < 1e-9);
        assert!((dot.pos.y + 20.0).abs() < 1e-9);
        assert!((dot.size - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_projection_clamps_depth_near_camera_plane() {
        let settings = SpiralSettings::default();
        let frame = settings.frame(0.0);
        let dot = settings
            .project(glm::vec3(1.0, 1.0, -400.0 + 1e-12), 1.0, &frame)
            .expect("just in front of camera");
        assert!(dot.pos.x.is_finite() && dot.size.is_finite());
        assert!((dot.pos.x - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_stars_before_launch() {
        let settings = small_settings();
        let stars = vec![Star::fixed(0.5, 800.0, 20.0, 0.5)];
        let engine = SpiralEngine::from_stars(settings, stars);
        assert!(engine.visible_dots(settings.time_for_t1(0.3)).is_empty());
        assert!(engine.visible_dots(settings.time_for_t1(0.499)).is_empty());
        assert_eq!(engine.visible_dots(settings.time_for_t1(0.51)).len(), 1);
    }

    #[test]
    fn test_render_star_only_after_arrival() {
        let settings = SpiralSettings {
            show_trail: false,
            ..small_settings()
        };
        let engine = SpiralEngine::from_stars(settings, vec![Star::fixed(0.5, 800.0, 20.0, 0.5)]);
        let viewport = Viewport::new(800.0, 600.0);

        let mut before = RecordingSurface::new();
        engine.render(&mut before, viewport, settings.time_for_t1(0.45));
        assert_eq!(before.paints(), 0);

        let mut after = RecordingSurface::new();
        // Still before the change event, so no start dot either
        engine.render(&mut after, viewport, settings.time_for_t1(0.55));
        assert_eq!(after.paints(), 1);
    }

    #[test]
    fn test_loop_restart_is_idempotent() {
        let mut backdrop = SpiralBackdrop::new(small_settings());
        backdrop.resize(Viewport::new(640.0, 480.0));

        let mut first = RecordingSurface::new();
        backdrop.draw(&mut first);

        // One full loop at 60 Hz, including the wrap back to the start
        let mut time = 0.0;
        while backdrop.timeline().loops() == 0 {
            backdrop.advance(1.0 / 60.0);
            time += 1.0 / 60.0;
            let mut surface = RecordingSurface::new();
            backdrop.draw(&mut surface);
        }
        assert!(time >= 20.0 - 1e-6);

        let mut restart = SpiralBackdrop::new(small_settings());
        restart.resize(Viewport::new(640.0, 480.0));
        let mut again = RecordingSurface::new();
        restart.draw(&mut again);
        assert_eq!(first.calls, again.calls);

        let engine = backdrop.engine().expect("seeded on resize");
        let mut at_zero = RecordingSurface::new();
        engine.render(&mut at_zero, Viewport::new(640.0, 480.0), 0.0);
        assert_eq!(first.calls, at_zero.calls);
    }

    #[test]
    fn test_stars_built_once_on_first_resize() {
        let mut backdrop = SpiralBackdrop::new(small_settings());
        assert!(backdrop.engine().is_none());
        backdrop.resize(Viewport::new(0.0, 0.0));
        assert!(backdrop.engine().is_none());

        backdrop.resize(Viewport::new(640.0, 480.0));
        let stars = backdrop.engine().map(|e| e.stars().as_ptr());
        assert_eq!(backdrop.engine().map(|e| e.stars().len()), Some(200));
        backdrop.resize(Viewport::new(1024.0, 768.0));
        assert_eq!(backdrop.engine().map(|e| e.stars().as_ptr()), stars);
    }

    #[test]
    fn test_trail_draws_fixed_number_of_points() {
        let settings = SpiralSettings {
            star_count: 0,
            ..SpiralSettings::default()
        };
        let engine = SpiralEngine::new(settings);
        let mut surface = RecordingSurface::new();
        engine.render(&mut surface, Viewport::new(500.0, 500.0), 0.1);
        assert_eq!(surface.circles().len(), 60);
        assert_eq!(surface.calls.first(), Some(&DrawCall::Clear));
        assert_eq!(surface.calls.last(), Some(&DrawCall::Restore));
    }

    #[test]
    fn test_start_dot_appears_after_change_event() {
        let settings = SpiralSettings {
            star_count: 0,
            show_trail: false,
            ..SpiralSettings::default()
        };
        let engine = SpiralEngine::new(settings);
        let viewport = Viewport::new(500.0, 500.0);

        let mut early = RecordingSurface::new();
        engine.render(&mut early, viewport, 0.3);
        assert_eq!(early.paints(), 0);

        let mut late = RecordingSurface::new();
        engine.render(&mut late, viewport, 0.5);
        assert_eq!(late.paints(), 1);
    }

    #[test]
    fn test_zero_area_viewport_draws_nothing() {
        let engine = SpiralEngine::new(small_settings());
        let mut surface = RecordingSurface::new();
        engine.render(&mut surface, Viewport::new(0.0, 0.0), 0.5);
        assert!(surface.calls.is_empty());
    }

    #[test]
    fn test_full_loop_never_panics() {
        let engine = SpiralEngine::new(small_settings());
        let viewport = Viewport::new(1280.0, 720.0);
        for i in 0..=400 {
            let time = i as f64 / 400.0;
            let mut surface = RecordingSurface::new();
            engine.render(&mut surface, viewport, time % 1.0);
            for call in &surface.calls {
                if let DrawCall::Circle { center, radius, .. } = call {
                    assert!(center.x.is_finite() && center.y.is_finite() && radius.is_finite());
                }
            }
        }
    }
}
