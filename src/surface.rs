// Drawing capability the backdrops render into. The browser implementation
// wraps a CanvasRenderingContext2d (see browser.rs); tests use a recorder.

use crate::color::Color;
use crate::math::Vector2;

pub trait Surface {
    // Wipe the whole area back to transparent
    fn clear(&mut self, width: f64, height: f64);

    fn fill_rect(&mut self, origin: Vector2, width: f64, height: f64, color: Color);

    fn fill_circle(&mut self, center: Vector2, radius: f64, color: Color);

    // Radial gradient: full color at the center, half alpha at half radius,
    // transparent at the rim
    fn fill_glow(&mut self, center: Vector2, radius: f64, color: Color);

    fn stroke_line(&mut self, from: Vector2, to: Vector2, width: f64, color: Color);

    // Line whose alpha fades in from `from`, peaks in the middle, and fades out at `to`
    fn stroke_faded_line(&mut self, from: Vector2, to: Vector2, width: f64, color: Color);

    fn fill_text(&mut self, text: &str, center: Vector2, font: &str, color: Color);

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, offset: Vector2);

    fn rotate(&mut self, radians: f64);
}
