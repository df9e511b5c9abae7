// Animated canvas backdrops for the portfolio site, compiled to WebAssembly.
//
// Every backdrop is a plain Rust simulation implementing
// `driver::Backdrop`; the `mount_*` functions attach one to a page canvas
// and drive it from `requestAnimationFrame` until the returned
// `BackdropHandle` is unmounted.

extern crate nalgebra_glm as glm;

pub mod browser;
pub mod burst;
pub mod color;
pub mod driver;
pub mod field;
pub mod floating;
pub mod holographic;
pub mod math;
pub mod matrix;
pub mod orbit;
pub mod particle;
pub mod preferences;
pub mod scroll;
pub mod spiral;
pub mod star;
pub mod surface;
pub mod timeline;
mod utils;
pub mod viewport;

use browser::{EventSubscription, Mount, MountOptions};
use burst::BurstField;
use driver::Backdrop;
use field::{FieldConfig, ParticleField};
use floating::FloatingField;
use holographic::HolographicDisplay;
use matrix::MatrixRain;
use orbit::{OrbitConfig, OrbitField};
use preferences::{IntroBackdrop, MotionPreferences};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scroll::NavVisibility;
use spiral::{SpiralBackdrop, SpiralSettings};
use viewport::Viewport;
use wasm_bindgen::prelude::*;

// Use `wee_alloc` as the global allocator when the feature is on
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn initialize() {
    utils::set_panic_hook();
    utils::init_logging(log::Level::Info);
    log::info!("canvas backdrops initialized");
}

fn time_scale(reduced_motion: bool) -> f64 {
    MotionPreferences {
        reduced_motion,
        ..Default::default()
    }
    .time_scale()
}

// Populations start empty and are seeded when the driver mounts them
fn unmeasured() -> Viewport {
    Viewport::new(0.0, 0.0)
}

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ParticleOptions {
    pub particle_count: u32,
    pub connection_distance: f64,
    pub speed: f64,
    pub opacity: f64,
    pub reduced_motion: bool,
    pub profile: bool,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        ParticleOptions {
            particle_count: 50,
            connection_distance: 100.0,
            speed: 0.3,
            opacity: 0.4,
            reduced_motion: false,
            profile: false,
        }
    }
}

#[wasm_bindgen]
impl ParticleOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ParticleOptions {
        ParticleOptions::default()
    }
}

impl ParticleOptions {
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig::background(
            self.particle_count as usize,
            self.connection_distance,
            self.speed,
            self.opacity,
        )
    }

    fn mount_options(&self) -> MountOptions {
        MountOptions {
            time_scale: time_scale(self.reduced_motion),
            profile: self.profile,
            ..Default::default()
        }
    }
}

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpiralOptions {
    pub opacity: f64,
    pub show_trail: bool,
    pub star_count: u32,
    pub loop_seconds: f64,
    pub seed: u32,
    pub reduced_motion: bool,
    pub profile: bool,
}

impl Default for SpiralOptions {
    fn default() -> Self {
        let settings = SpiralSettings::default();
        SpiralOptions {
            opacity: 0.3,
            show_trail: settings.show_trail,
            star_count: settings.star_count as u32,
            loop_seconds: settings.loop_seconds,
            seed: settings.seed as u32,
            reduced_motion: false,
            profile: false,
        }
    }
}

#[wasm_bindgen]
impl SpiralOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SpiralOptions {
        SpiralOptions::default()
    }
}

impl SpiralOptions {
    pub fn settings(&self) -> SpiralSettings {
        SpiralSettings {
            opacity: self.opacity,
            show_trail: self.show_trail,
            star_count: self.star_count as usize,
            loop_seconds: self.loop_seconds,
            seed: u64::from(self.seed),
            ..SpiralSettings::default()
        }
    }
}

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrbitOptions {
    pub enhanced: bool,
    pub particle_count: u32,
    pub opacity: f64,
    pub show_trails: bool,
    pub reduced_motion: bool,
    pub profile: bool,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        OrbitOptions {
            enhanced: false,
            particle_count: 50,
            opacity: 0.3,
            show_trails: false,
            reduced_motion: false,
            profile: false,
        }
    }
}

#[wasm_bindgen]
impl OrbitOptions {
    /// Lite style defaults.
    #[wasm_bindgen(constructor)]
    pub fn new() -> OrbitOptions {
        OrbitOptions::default()
    }

    /// Enhanced style defaults: more particles, brighter, with trails.
    pub fn enhanced_defaults() -> OrbitOptions {
        OrbitOptions {
            enhanced: true,
            particle_count: 100,
            opacity: 0.6,
            show_trails: true,
            ..OrbitOptions::default()
        }
    }
}

impl OrbitOptions {
    pub fn config(&self) -> OrbitConfig {
        let count = self.particle_count as usize;
        if self.enhanced {
            OrbitConfig::enhanced(count, self.opacity, self.show_trails)
        } else {
            OrbitConfig::lite(count, self.opacity)
        }
    }
}

#[wasm_bindgen]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FloatingOptions {
    pub count: u32,
    pub reduced_motion: bool,
    pub profile: bool,
}

impl Default for FloatingOptions {
    fn default() -> Self {
        FloatingOptions {
            count: 12,
            reduced_motion: false,
            profile: false,
        }
    }
}

#[wasm_bindgen]
impl FloatingOptions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> FloatingOptions {
        FloatingOptions::default()
    }
}

/// Handle to a mounted backdrop. A handle whose mount failed is inert: it
/// reports not running and unmounting it does nothing.
#[wasm_bindgen]
pub struct BackdropHandle {
    mount: Option<Mount>,
}

impl BackdropHandle {
    fn start(canvas_id: &str, backdrop: Box<dyn Backdrop>, options: MountOptions) -> BackdropHandle {
        let name = backdrop.name();
        match Mount::start(canvas_id, backdrop, options) {
            Ok(mount) => BackdropHandle { mount: Some(mount) },
            Err(err) => {
                log::warn!("{} not mounted on #{}: {:?}", name, canvas_id, err);
                BackdropHandle::inert()
            }
        }
    }

    fn inert() -> BackdropHandle {
        BackdropHandle { mount: None }
    }
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Cancels the frame loop and removes listeners. Returns false when
    /// there was nothing left to stop.
    pub fn unmount(&mut self) -> bool {
        match self.mount.take() {
            Some(mut mount) => mount.unmount(),
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.mount.as_ref().map_or(false, |mount| mount.is_running())
    }

    pub fn name(&self) -> String {
        self.mount
            .as_ref()
            .map_or("none", |mount| mount.name())
            .to_string()
    }
}

#[wasm_bindgen]
pub fn mount_particles(canvas_id: &str, options: &ParticleOptions) -> BackdropHandle {
    let field = ParticleField::new(options.field_config(), unmeasured(), StdRng::from_entropy());
    BackdropHandle::start(canvas_id, Box::new(field), options.mount_options())
}

/// Dense field of individually hued particles, as shown behind the
/// holographic intro.
#[wasm_bindgen]
pub fn mount_hued_particles(canvas_id: &str, reduced_motion: bool) -> BackdropHandle {
    let field = ParticleField::new(FieldConfig::hued(), unmeasured(), StdRng::from_entropy());
    let options = MountOptions {
        time_scale: time_scale(reduced_motion),
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(field), options)
}

#[wasm_bindgen]
pub fn mount_matrix(canvas_id: &str, reduced_motion: bool) -> BackdropHandle {
    let rain = MatrixRain::new(unmeasured(), StdRng::from_entropy());
    let options = MountOptions {
        time_scale: time_scale(reduced_motion),
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(rain), options)
}

#[wasm_bindgen]
pub fn mount_spiral(canvas_id: &str, options: &SpiralOptions) -> BackdropHandle {
    let spiral = SpiralBackdrop::new(options.settings());
    let mount_options = MountOptions {
        time_scale: time_scale(options.reduced_motion),
        profile: options.profile,
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(spiral), mount_options)
}

#[wasm_bindgen]
pub fn mount_orbit(canvas_id: &str, options: &OrbitOptions) -> BackdropHandle {
    let orbit = OrbitField::new(options.config(), unmeasured(), StdRng::from_entropy());
    let mount_options = MountOptions {
        time_scale: time_scale(options.reduced_motion),
        profile: options.profile,
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(orbit), mount_options)
}

#[wasm_bindgen]
pub fn mount_floating(canvas_id: &str, options: &FloatingOptions) -> BackdropHandle {
    let floating = FloatingField::new(options.count as usize, unmeasured(), StdRng::from_entropy());
    let mount_options = MountOptions {
        time_scale: time_scale(options.reduced_motion),
        profile: options.profile,
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(floating), mount_options)
}

#[wasm_bindgen]
pub fn mount_holographic(canvas_id: &str, text: &str) -> BackdropHandle {
    let options = MountOptions {
        fixed_size: Some(HolographicDisplay::viewport()),
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(HolographicDisplay::new(text)), options)
}

/// Opening explosion from the middle of the canvas. With `spawning` set,
/// small bursts keep popping up at random spots; otherwise the loop ends
/// once the last particle has faded.
#[wasm_bindgen]
pub fn mount_burst(canvas_id: &str, spawning: bool) -> BackdropHandle {
    let burst = BurstField::new(unmeasured(), spawning, StdRng::from_entropy());
    BackdropHandle::start(canvas_id, Box::new(burst), MountOptions::default())
}

fn read_preferences(preferences_json: &str) -> MotionPreferences {
    match MotionPreferences::from_json(preferences_json) {
        Ok(preferences) => preferences,
        Err(err) => {
            log::warn!("ignoring unreadable motion preferences: {}", err);
            MotionPreferences::default()
        }
    }
}

/// Backdrop for the intro card, chosen from the visitor's stored motion
/// preferences (the page's `performanceSettings` JSON).
#[wasm_bindgen]
pub fn mount_intro(canvas_id: &str, preferences_json: &str) -> BackdropHandle {
    let preferences = read_preferences(preferences_json);
    let backdrop: Box<dyn Backdrop> = match preferences.intro_backdrop() {
        IntroBackdrop::Particles(config) => {
            Box::new(ParticleField::new(config, unmeasured(), StdRng::from_entropy()))
        }
        IntroBackdrop::Orbit(config) => {
            Box::new(OrbitField::new(config, unmeasured(), StdRng::from_entropy()))
        }
        IntroBackdrop::Nothing => {
            log::info!("intro backdrop disabled by motion preferences");
            return BackdropHandle::inert();
        }
    };
    let options = MountOptions {
        time_scale: preferences.time_scale(),
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, backdrop, options)
}

/// Page-wide particle field sized by the visitor's motion preferences.
#[wasm_bindgen]
pub fn mount_background(canvas_id: &str, preferences_json: &str) -> BackdropHandle {
    let preferences = read_preferences(preferences_json);
    let config = match preferences.background_field() {
        Some(config) => config,
        None => {
            log::info!("background particles disabled by motion preferences");
            return BackdropHandle::inert();
        }
    };
    let field = ParticleField::new(config, unmeasured(), StdRng::from_entropy());
    let options = MountOptions {
        time_scale: preferences.time_scale(),
        ..Default::default()
    };
    BackdropHandle::start(canvas_id, Box::new(field), options)
}

/// Floating decorations with a population chosen from the visitor's motion
/// preferences.
#[wasm_bindgen]
pub fn mount_ambient(canvas_id: &str, preferences_json: &str) -> BackdropHandle {
    let preferences = read_preferences(preferences_json);
    match preferences.floating_count() {
        Some(count) => mount_floating(
            canvas_id,
            &FloatingOptions {
                count: count as u32,
                reduced_motion: preferences.reduced_motion,
                ..FloatingOptions::default()
            },
        ),
        None => {
            log::info!("floating elements disabled by motion preferences");
            BackdropHandle::inert()
        }
    }
}

/// Follows window scrolling and reports floating navbar visibility changes.
#[wasm_bindgen]
pub struct NavWatcher {
    subscription: Option<EventSubscription>,
}

#[wasm_bindgen]
impl NavWatcher {
    pub fn stop(&mut self) {
        self.subscription.take();
    }

    pub fn is_watching(&self) -> bool {
        self.subscription.is_some()
    }
}

/// Calls `on_change(visible)` whenever the floating navbar should appear or
/// disappear.
#[wasm_bindgen]
pub fn watch_navbar(on_change: js_sys::Function) -> NavWatcher {
    match subscribe_navbar(on_change) {
        Ok(subscription) => NavWatcher {
            subscription: Some(subscription),
        },
        Err(err) => {
            log::warn!("navbar watcher not started: {:?}", err);
            NavWatcher { subscription: None }
        }
    }
}

fn subscribe_navbar(on_change: js_sys::Function) -> Result<EventSubscription, JsValue> {
    let window = web_sys::window().ok_or("no global window")?;
    let scroll_window = window.clone();
    let mut nav = NavVisibility::new();
    let mut shown = nav.visible();
    EventSubscription::listen(window.into(), "scroll", move || {
        let scroll_y = match scroll_window.scroll_y() {
            Ok(scroll_y) => scroll_y,
            Err(err) => {
                log::warn!("could not read scroll position: {:?}", err);
                return;
            }
        };
        let visible = nav.update(scroll_y);
        if visible != shown {
            shown = visible;
            if let Err(err) = on_change.call1(&JsValue::NULL, &JsValue::from_bool(visible)) {
                log::warn!("navbar callback failed: {:?}", err);
            }
        }
    })
}
