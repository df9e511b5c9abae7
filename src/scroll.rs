// Visibility of the floating navbar. It shows up once the page is scrolled
// away from the regular navbar and the visitor starts scrolling back up.

use wasm_bindgen::prelude::*;

// Below this the regular navbar is on screen
const REVEAL_OFFSET: f64 = 100.0;

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NavVisibility {
    previous: Option<f64>,
    visible: bool,
}

#[wasm_bindgen]
impl NavVisibility {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the latest `window.scrollY` and returns whether the floating
    /// navbar should be shown.
    pub fn update(&mut self, scroll_y: f64) -> bool {
        if let Some(previous) = self.previous {
            let direction = scroll_y - previous;
            self.visible = scroll_y > REVEAL_OFFSET && direction < 0.0;
        }
        self.previous = Some(scroll_y);
        self.visible
    }

    #[wasm_bindgen(getter)]
    pub fn visible(&self) -> bool {
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reading_only_records() {
        let mut nav = NavVisibility::new();
        assert!(!nav.update(900.0));
        assert!(!nav.visible());
    }

    #[test]
    fn test_shows_when_scrolling_up_past_offset() {
        let mut nav = NavVisibility::new();
        nav.update(500.0);
        assert!(!nav.update(600.0));
        assert!(nav.update(550.0));
        assert!(!nav.update(560.0));
    }

    #[test]
    fn test_hidden_near_top() {
        let mut nav = NavVisibility::new();
        nav.update(300.0);
        assert!(nav.update(200.0));
        assert!(!nav.update(100.0));
        assert!(!nav.update(50.0));
    }

    #[test]
    fn test_no_movement_hides() {
        let mut nav = NavVisibility::new();
        nav.update(400.0);
        assert!(nav.update(300.0));
        assert!(!nav.update(300.0));
    }
}
