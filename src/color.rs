// RGB color with a fractional alpha, written straight into canvas style strings
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    // Accent used by every backdrop on the site
    pub const TEAL: Color = Color::rgb(45, 212, 191);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const NIGHT: Color = Color::rgb(17, 24, 39);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Color {
        Color {
            a: a.max(0.0).min(1.0),
            ..self
        }
    }

    /// Builds a color from hue in degrees, saturation and lightness in [0, 1].
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Color {
        if s == 0.0 {
            let v = (l * 255.0).round() as u8;
            return Color::rgb(v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h.rem_euclid(360.0) / 360.0;

        let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
        let g = hue_to_rgb(p, q, h);
        let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

        Color::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }

    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
