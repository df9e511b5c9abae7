// Lifecycle of one mounted backdrop, independent of the browser.
//
// The browser glue in `browser.rs` owns the canvas and the animation frame
// callback; every callback ends up in `AnimationDriver::frame`. Once a
// driver is cancelled it never draws again, even if a callback that was
// already queued still fires.

use crate::surface::Surface;
use crate::timeline::FrameClock;
use crate::viewport::Viewport;

/// A decorative animation that can be driven frame by frame.
pub trait Backdrop {
    fn name(&self) -> &'static str;

    /// Adopt a new drawing area. Populations are re-seeded from scratch.
    fn resize(&mut self, viewport: Viewport);

    /// Move the simulation forward by `dt` seconds.
    fn advance(&mut self, dt: f64);

    fn draw(&self, surface: &mut dyn Surface);

    /// True once there is nothing left to animate; the frame loop then stops.
    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Cancelled,
}

/// What the frame loop should do after a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

pub struct AnimationDriver {
    backdrop: Box<dyn Backdrop>,
    viewport: Viewport,
    clock: FrameClock,
    state: DriverState,
    // 0 freezes the animation after one drawn frame
    time_scale: f64,
    frames_drawn: u64,
}

impl AnimationDriver {
    pub fn new(backdrop: Box<dyn Backdrop>) -> Self {
        AnimationDriver {
            backdrop,
            viewport: Viewport::new(0.0, 0.0),
            clock: FrameClock::new(),
            state: DriverState::Idle,
            time_scale: 1.0,
            frames_drawn: 0,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale.max(0.0);
        self
    }

    pub fn name(&self) -> &'static str {
        self.backdrop.name()
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == DriverState::Running
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Seeds the backdrop for `viewport` and marks the driver as running.
    pub fn mount(&mut self, viewport: Viewport) {
        if self.state == DriverState::Cancelled {
            return;
        }
        self.viewport = viewport;
        self.backdrop.resize(viewport);
        self.clock.reset();
        self.frames_drawn = 0;
        self.state = DriverState::Running;
        log::info!(
            "{} mounted at {}x{}",
            self.backdrop.name(),
            viewport.width,
            viewport.height
        );
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if self.state == DriverState::Cancelled {
            return;
        }
        log::debug!(
            "{} resized to {}x{}, re-seeding",
            self.backdrop.name(),
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;
        self.backdrop.resize(viewport);
        self.clock.reset();
        self.frames_drawn = 0;
    }

    /// Runs one frame for the animation frame timestamp `now_ms`.
    pub fn frame(&mut self, now_ms: f64, surface: &mut dyn Surface) -> FrameOutcome {
        if self.state != DriverState::Running {
            return FrameOutcome::Stop;
        }
        let dt = self.clock.tick(now_ms) * self.time_scale;

        if self.viewport.is_empty() {
            return FrameOutcome::Continue;
        }
        if self.time_scale == 0.0 && self.frames_drawn > 0 {
            return FrameOutcome::Stop;
        }

        self.backdrop.advance(dt);
        self.backdrop.draw(surface);
        self.frames_drawn += 1;

        if self.backdrop.is_finished() {
            log::debug!("{} finished after {} frames", self.backdrop.name(), self.frames_drawn);
            return FrameOutcome::Stop;
        }
        if self.time_scale == 0.0 {
            FrameOutcome::Stop
        } else {
            FrameOutcome::Continue
        }
    }

    /// Stops the driver for good. Returns false if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.state == DriverState::Cancelled {
            return false;
        }
        self.state = DriverState::Cancelled;
        log::info!(
            "{} unmounted after {} frames",
            self.backdrop.name(),
            self.frames_drawn
        );
        true
    }
}
