// Falling glyph columns behind the intro. Each column drops one row per
// frame and, once past the bottom edge, has a small chance every frame of
// starting again from the top.

use crate::color::Color;
use crate::driver::Backdrop;
use crate::surface::Surface;
use crate::timeline::reference_frames;
use crate::viewport::Viewport;
use rand::rngs::StdRng;
use rand::Rng;

const GLYPHS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789@#$%^&*()_+-=[]{}|;:,.<>?";
const FONT_SIZE: f64 = 14.0;
const FONT: &str = "14px monospace";
// Per reference frame, once the column is below the canvas
const RESTART_CHANCE: f64 = 0.025;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MatrixColumn {
    // Row of the leading glyph
    pub drop: f64,
    pub glyph: char,
}

pub struct MatrixRain {
    viewport: Viewport,
    columns: Vec<MatrixColumn>,
    rng: StdRng,
}

fn random_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    GLYPHS[rng.gen_range(0, GLYPHS.len())] as char
}

impl MatrixRain {
    pub fn new(viewport: Viewport, rng: StdRng) -> Self {
        let mut rain = MatrixRain {
            viewport,
            columns: Vec::new(),
            rng,
        };
        rain.seed();
        rain
    }

    fn seed(&mut self) {
        self.columns.clear();
        if self.viewport.is_empty() {
            return;
        }
        let count = (self.viewport.width / FONT_SIZE).ceil() as usize;
        for _ in 0..count {
            let glyph = random_glyph(&mut self.rng);
            self.columns.push(MatrixColumn { drop: 1.0, glyph });
        }
        log::debug!("matrix rain seeded with {} columns", count);
    }

    pub fn columns(&self) -> &[MatrixColumn] {
        &self.columns
    }

    pub fn tick(&mut self, dt: f64) {
        let step = reference_frames(dt);
        let restart = (RESTART_CHANCE * step).min(1.0);
        let height = self.viewport.height;
        for column in &mut self.columns {
            if column.drop * FONT_SIZE > height && self.rng.gen::<f64>() < restart {
                column.drop = 0.0;
            }
            column.drop += step;
            column.glyph = random_glyph(&mut self.rng);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if self.viewport.is_empty() {
            return;
        }
        // Translucent wash so older glyphs trail off
        surface.fill_rect(
            glm::vec2(0.0, 0.0),
            self.viewport.width,
            self.viewport.height,
            Color::BLACK.with_alpha(0.05),
        );

        let color = Color::TEAL.with_alpha(0.8);
        let mut buf = [0u8; 4];
        for (i, column) in self.columns.iter().enumerate() {
            let center = glm::vec2(
                (i as f64 + 0.5) * FONT_SIZE,
                (column.drop - 0.5) * FONT_SIZE,
            );
            surface.fill_text(column.glyph.encode_utf8(&mut buf), center, FONT, color);
        }
    }
}

impl Backdrop for MatrixRain {
    fn name(&self) -> &'static str {
        "matrix"
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

    fn rain(width: f64, height: f64) -> MatrixRain {
        MatrixRain::new(Viewport::new(width, height), StdRng::seed_from_u64(11))
    }

    #[test]
    fn test_one_column_per_glyph_width() {
        let rain = rain(100.0, 300.0);
        assert_eq!(rain.columns().len(), 8);
        assert!(rain.columns().iter().all(|c| c.drop == 1.0));
        assert!(rain.columns().iter().all(|c| GLYPHS.contains(&(c.glyph as u8))));
    }

    #[test]
    fn test_frame_is_wash_then_one_glyph_per_column() {
        let rain = rain(70.0, 300.0);
        let mut surface = RecordingSurface::new();
        rain.render(&mut surface);

        assert_eq!(
            surface.calls[0],
            DrawCall::Rect {
                origin: glm::vec2(0.0, 0.0),
                width: 70.0,
                height: 300.0,
                color: Color::BLACK.with_alpha(0.05),
            }
        );
        let texts: Vec<_> = surface.calls[1..]
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, center, color } => Some((text.clone(), *center, *color)),
                _ => None,
            })
            .collect();
        assert_eq!(texts.len(), 5);
        for (i, (text, center, color)) in texts.iter().enumerate() {
            assert_eq!(text.chars().count(), 1);
            assert!((center.x - (i as f64 * 14.0 + 7.0)).abs() < 1e-9);
            assert!((center.y - 7.0).abs() < 1e-9);
            assert_eq!(*color, Color::TEAL.with_alpha(0.8));
        }
    }

    #[test]
    fn test_columns_restart_only_below_the_canvas() {
        let mut rain = rain(140.0, 140.0);
        let mut previous: Vec<f64> = rain.columns().iter().map(|c| c.drop).collect();
        for _ in 0..600 {
            rain.tick(1.0 / 60.0);
            for (column, before) in rain.columns().iter().zip(&previous) {
                if column.drop < *before {
                    assert!(before * FONT_SIZE > 140.0, "restarted at row {}", before);
                }
            }
            previous = rain.columns().iter().map(|c| c.drop).collect();
        }
    }

    #[test]
    fn test_every_column_eventually_restarts() {
        let mut rain = rain(140.0, 140.0);
        for _ in 0..2000 {
            rain.tick(1.0 / 60.0);
        }
        assert!(rain.columns().iter().all(|c| c.drop < 1000.0));
    }

    #[test]
    fn test_zero_area_has_no_columns() {
        let mut rain = rain(0.0, 0.0);
        assert!(rain.columns().is_empty());
        rain.tick(1.0 / 60.0);
        let mut surface = RecordingSurface::new();
        rain.render(&mut surface);
        assert!(surface.calls.is_empty());

        rain.resize(Viewport::new(28.0, 100.0));
        assert_eq!(rain.columns().len(), 2);
    }
}
