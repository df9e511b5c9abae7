// Holographic title card: a wobbling grid, a stack of hue-shifting text
// copies and flickering scan lines over a slowly fading background.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::surface::Surface;
use crate::timeline::reference_frames;
use crate::viewport::Viewport;

pub const HOLOGRAM_WIDTH: f64 = 800.0;
pub const HOLOGRAM_HEIGHT: f64 = 400.0;

const GRID_SPACING: f64 = 40.0;
const SCAN_SPACING: f64 = 4.0;
const TEXT_LAYERS: usize = 5;
const FONT: &str = "bold 48px Arial";
// Phase gained per reference frame
const TIME_STEP: f64 = 0.02;

pub struct HolographicDisplay {
    text: String,
    viewport: Viewport,
    time: f64,
}

impl HolographicDisplay {
    pub fn new(text: impl Into<String>) -> Self {
        HolographicDisplay {
            text: text.into(),
            viewport: Viewport::new(HOLOGRAM_WIDTH, HOLOGRAM_HEIGHT),
            time: 0.0,
        }
    }

    /// The display always draws on its own fixed-size canvas.
    pub fn viewport() -> Viewport {
        Viewport::new(HOLOGRAM_WIDTH, HOLOGRAM_HEIGHT)
    }

    #[cfg(test)]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tick(&mut self, dt: f64) {
        self.time += TIME_STEP * reference_frames(dt);
    }

    fn draw_grid(&self, surface: &mut dyn Surface) {
        let (width, height) = (self.viewport.width, self.viewport.height);
        let color = Color::TEAL.with_alpha(0.3);

        let mut x = 0.0;
        while x < width {
            let offset = (self.time + x * 0.01).sin() * 10.0;
            surface.stroke_line(glm::vec2(x + offset, 0.0), glm::vec2(x + offset, height), 1.0, color);
            x += GRID_SPACING;
        }

        let mut y = 0.0;
        while y < height {
            let offset = (self.time + y * 0.01).cos() * 10.0;
            surface.stroke_line(glm::vec2(0.0, y + offset), glm::vec2(width, y + offset), 1.0, color);
            y += GRID_SPACING;
        }
    }

    fn draw_text(&self, surface: &mut dyn Surface) {
        let (cx, cy) = self.viewport.center();
        for i in 0..TEXT_LAYERS {
            let layer = i as f64;
            let hue = 180.0 + (self.time + layer).sin() * 20.0;
            let color = Color::from_hsl(hue, 0.7, 0.6).with_alpha(0.8 - layer * 0.15);
            let offset = layer * 2.0;
            surface.fill_text(&self.text, glm::vec2(cx + offset, cy + offset), FONT, color);
        }
    }

    fn draw_scan_lines(&self, surface: &mut dyn Surface) {
        let mut y = 0.0;
        while y < self.viewport.height {
            let alpha = 0.1 + (self.time * 10.0 + y * 0.1).sin() * 0.05;
            surface.fill_rect(glm::vec2(0.0, y), self.viewport.width, 2.0, Color::TEAL.with_alpha(alpha));
            y += SCAN_SPACING;
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        // No clear: the translucent wash leaves a short afterglow
        surface.fill_rect(
            glm::vec2(0.0, 0.0),
            self.viewport.width,
            self.viewport.height,
            Color::BLACK.with_alpha(0.1),
        );
        self.draw_grid(surface);
        self.draw_text(surface);
        self.draw_scan_lines(surface);
    }
}

impl Backdrop for HolographicDisplay {
    fn name(&self) -> &'static str {
        "holographic"
    }

    // The canvas size is fixed; only the phase restarts
    fn resize(&mut self, _viewport: Viewport) {
        self.time = 0.0;
    }

    fn advance(&mut self, dt: f64) {
        self.tick(dt);
    }

    fn draw(&self, surface: &mut dyn Surface) {
        self.render(surface);
    }
}
