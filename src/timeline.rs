// Time bookkeeping for the frame loop.
//
// Motion constants throughout the crate were tuned as "per frame at 60 Hz".
// Elapsed time is converted into reference frames so those constants keep
// their perceived speed on any refresh rate.

pub const REFERENCE_FPS: f64 = 60.0;

// Longest step a single frame may simulate; a backgrounded tab otherwise
// resumes with one huge jump
pub const MAX_FRAME_DT: f64 = 0.1;

pub fn reference_frames(dt: f64) -> f64 {
    dt * REFERENCE_FPS
}

/// Repeating normalized timeline: the phase runs from 0 towards 1 over
/// `duration` seconds, then starts again from 0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Timeline {
    duration: f64,
    phase: f64,
    loops: u64,
}

impl Timeline {
    pub fn new(duration: f64) -> Self {
        Timeline {
            duration,
            phase: 0.0,
            loops: 0,
        }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn loops(&self) -> u64 {
        self.loops
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Moves the phase forward by `dt` seconds and returns the new phase.
    pub fn advance(&mut self, dt: f64) -> f64 {
        if !(self.duration > 0.0) || !(dt > 0.0) {
            return self.phase;
        }
        let next = self.phase + dt / self.duration;
        if next >= 1.0 {
            self.loops += next.floor() as u64;
            self.phase = next.fract();
        } else {
            self.phase = next;
        }
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.loops = 0;
    }
}

/// Turns frame timestamps (milliseconds, as handed to animation frame
/// callbacks) into clamped deltas in seconds.
#[derive(Copy, Clone, Debug, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let dt = match self.last_ms {
            // The first frame has nothing to measure against
            None => 1.0 / REFERENCE_FPS,
            Some(last) => ((now_ms - last) / 1000.0).max(0.0).min(MAX_FRAME_DT),
        };
        self.last_ms = Some(now_ms);
        dt
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_wraps_to_zero() {
        let mut timeline = Timeline::new(20.0);
        assert_eq!(timeline.advance(10.0), 0.5);
        let phase = timeline.advance(12.0);
        assert!((phase - 0.1).abs() < 1e-9);
        assert_eq!(timeline.loops(), 1);
    }

    #[test]
    fn test_timeline_phase_stays_below_one() {
        let mut timeline = Timeline::new(20.0);
        for _ in 0..10_000 {
            let phase = timeline.advance(1.0 / 60.0);
            assert!(phase >= 0.0 && phase < 1.0);
        }
        assert!(timeline.loops() >= 8);
    }

    #[test]
    fn test_timeline_ignores_degenerate_input() {
        let mut timeline = Timeline::new(0.0);
        assert_eq!(timeline.advance(5.0), 0.0);
        let mut timeline = Timeline::new(10.0);
        assert_eq!(timeline.advance(-1.0), 0.0);
    }

    #[test]
    fn test_frame_clock_clamps() {
        let mut clock = FrameClock::new();
        assert!((clock.tick(1000.0) - 1.0 / 60.0).abs() < 1e-12);
        assert!((clock.tick(1016.0) - 0.016).abs() < 1e-12);
        assert_eq!(clock.tick(5000.0), MAX_FRAME_DT);
        assert_eq!(clock.tick(4000.0), 0.0);
    }
}
