// Size of the area a backdrop draws into, in CSS pixels.

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(self, pixel_ratio: f64) -> Self {
        Viewport {
            pixel_ratio: if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 },
            ..self
        }
    }

    // Nothing can be drawn, and ratios over width/height are meaningless
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_viewports() {
        assert!(Viewport::new(0.0, 100.0).is_empty());
        assert!(Viewport::new(100.0, 0.0).is_empty());
        assert!(Viewport::new(-5.0, 10.0).is_empty());
        assert!(Viewport::new(f64::NAN, 10.0).is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_pixel_ratio_falls_back_to_one() {
        assert_eq!(Viewport::new(10.0, 10.0).with_pixel_ratio(0.0).pixel_ratio, 1.0);
        assert_eq!(Viewport::new(10.0, 10.0).with_pixel_ratio(2.0).pixel_ratio, 2.0);
    }
}
