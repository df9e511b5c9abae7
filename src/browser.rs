// Browser side of a mounted backdrop: the 2D canvas surface, the
// requestAnimationFrame loop and window event subscriptions.
//
// Canvas call failures are logged and otherwise ignored; a backdrop is
// decoration and must never take the page down with it.

use crate::color::Color;
use crate::driver::{AnimationDriver, Backdrop, FrameOutcome};
use crate::math::Vector2;
use crate::surface::Surface;
use crate::utils::Timer;
use crate::viewport::Viewport;
use std::cell::{Cell, RefCell};
use std::f64::consts::PI;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, Window};

fn absorb(result: Result<(), JsValue>) {
    if let Err(err) = result {
        log::trace!("canvas call failed: {:?}", err);
    }
}

fn style(color: Color) -> JsValue {
    JsValue::from_str(&color.to_css())
}

/// Size of the browser window in CSS pixels.
pub fn window_viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window
        .inner_width()?
        .as_f64()
        .ok_or("innerWidth is not a number")?;
    let height = window
        .inner_height()?
        .as_f64()
        .ok_or("innerHeight is not a number")?;
    Ok(Viewport::new(width, height).with_pixel_ratio(window.device_pixel_ratio()))
}

// Last solid color handed to one of the context styles. Formatting the CSS
// string and crossing into JS is skipped while the color repeats.
#[derive(Default, Debug)]
struct StyleCache {
    last: Option<Color>,
}

impl StyleCache {
    // True if `color` has to be sent to the context
    fn update(&mut self, color: Color) -> bool {
        if self.last == Some(color) {
            return false;
        }
        self.last = Some(color);
        true
    }

    // The context style changed behind our back (gradient, restore, resize)
    fn forget(&mut self) {
        self.last = None;
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    fill: StyleCache,
    stroke: StyleCache,
}

impl CanvasSurface {
    pub fn acquire(document: &Document, canvas_id: &str) -> Result<CanvasSurface, JsValue> {
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas element not found")?
            .dyn_into::<HtmlCanvasElement>()?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or("2d context unavailable")?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(CanvasSurface {
            canvas,
            ctx,
            fill: StyleCache::default(),
            stroke: StyleCache::default(),
        })
    }

    /// Sizes the backing store for `viewport` and scales the context so
    /// drawing happens in CSS pixels.
    pub fn fit(&mut self, viewport: Viewport) -> Result<(), JsValue> {
        // Resizing the backing store resets every context style
        self.fill.forget();
        self.stroke.forget();
        let ratio = viewport.pixel_ratio;
        self.canvas.set_width((viewport.width * ratio).max(0.0) as u32);
        self.canvas.set_height((viewport.height * ratio).max(0.0) as u32);
        self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0)
    }

    fn path_circle(&self, center: Vector2, radius: f64) {
        self.ctx.begin_path();
        absorb(self.ctx.arc(center.x, center.y, radius, 0.0, PI * 2.0));
    }

    fn use_fill(&mut self, color: Color) {
        if self.fill.update(color) {
            self.ctx.set_fill_style(&style(color));
        }
    }

    fn use_stroke(&mut self, color: Color) {
        if self.stroke.update(color) {
            self.ctx.set_stroke_style(&style(color));
        }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_rect(&mut self, origin: Vector2, width: f64, height: f64, color: Color) {
        self.use_fill(color);
        self.ctx.fill_rect(origin.x, origin.y, width, height);
    }

    fn fill_circle(&mut self, center: Vector2, radius: f64, color: Color) {
        if !(radius > 0.0) {
            return;
        }
        self.use_fill(color);
        self.path_circle(center, radius);
        self.ctx.fill();
    }

    fn fill_glow(&mut self, center: Vector2, radius: f64, color: Color) {
        if !(radius > 0.0) {
            return;
        }
        let gradient = match self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)
        {
            Ok(gradient) => gradient,
            Err(err) => {
                log::trace!("radial gradient failed: {:?}", err);
                return;
            }
        };
        absorb(gradient.add_color_stop(0.0, &color.to_css()));
        absorb(gradient.add_color_stop(0.5, &color.with_alpha(color.a * 0.5).to_css()));
        absorb(gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css()));
        self.ctx.set_fill_style(&gradient);
        self.fill.forget();
        self.path_circle(center, radius);
        self.ctx.fill();
    }

    fn stroke_line(&mut self, from: Vector2, to: Vector2, width: f64, color: Color) {
        self.use_stroke(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn stroke_faded_line(&mut self, from: Vector2, to: Vector2, width: f64, color: Color) {
        let gradient = self.ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
        let clear = color.with_alpha(0.0).to_css();
        absorb(gradient.add_color_stop(0.0, &clear));
        absorb(gradient.add_color_stop(0.5, &color.to_css()));
        absorb(gradient.add_color_stop(1.0, &clear));
        self.ctx.set_stroke_style(&gradient);
        self.stroke.forget();
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, center: Vector2, font: &str, color: Color) {
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.use_fill(color);
        absorb(self.ctx.fill_text(text, center.x, center.y));
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
        self.fill.forget();
        self.stroke.forget();
    }

    fn translate(&mut self, offset: Vector2) {
        absorb(self.ctx.translate(offset.x, offset.y));
    }

    fn rotate(&mut self, radians: f64) {
        absorb(self.ctx.rotate(radians));
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

struct LoopState {
    window: Window,
    // Id of the frame request that has not fired yet
    pending: Cell<Option<i32>>,
    callback: RefCell<Option<FrameCallback>>,
}

impl LoopState {
    fn schedule(&self) -> Result<(), JsValue> {
        if self.pending.get().is_some() {
            return Ok(());
        }
        let callback = self.callback.borrow();
        let callback = callback.as_ref().ok_or("frame loop is stopped")?;
        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        self.pending.set(Some(id));
        Ok(())
    }
}

/// Self-rescheduling `requestAnimationFrame` loop. Each frame runs the
/// closure given to [`FrameLoop::start`]; the loop goes quiet when that
/// returns [`FrameOutcome::Stop`] and can be woken with [`FrameLoop::resume`].
#[derive(Clone)]
pub struct FrameLoop {
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn start<F>(window: Window, mut on_frame: F) -> Result<FrameLoop, JsValue>
    where
        F: FnMut(f64) -> FrameOutcome + 'static,
    {
        let state = Rc::new(LoopState {
            window,
            pending: Cell::new(None),
            callback: RefCell::new(None),
        });

        // Weak so the stored closure does not keep its own loop alive
        let weak = Rc::downgrade(&state);
        let callback = Closure::wrap(Box::new(move |now: f64| {
            let state = match weak.upgrade() {
                Some(state) => state,
                None => return,
            };
            state.pending.set(None);
            if on_frame(now) == FrameOutcome::Continue {
                if let Err(err) = state.schedule() {
                    log::warn!("could not schedule the next frame: {:?}", err);
                }
            }
        }) as Box<dyn FnMut(f64)>);

        *state.callback.borrow_mut() = Some(callback);
        state.schedule()?;
        Ok(FrameLoop { state })
    }

    pub fn resume(&self) -> Result<(), JsValue> {
        self.state.schedule()
    }

    /// Cancels the outstanding frame request and releases the callback.
    /// Returns false if the loop had already been stopped.
    pub fn stop(&self) -> bool {
        if let Some(id) = self.state.pending.take() {
            if let Err(err) = self.state.window.cancel_animation_frame(id) {
                log::warn!("could not cancel frame {}: {:?}", id, err);
            }
        }
        self.state.callback.borrow_mut().take().is_some()
    }
}

/// Event listener that is removed again when dropped.
pub struct EventSubscription {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

impl EventSubscription {
    pub fn listen<F>(target: EventTarget, event: &'static str, callback: F) -> Result<Self, JsValue>
    where
        F: FnMut() + 'static,
    {
        let callback = Closure::wrap(Box::new(callback) as Box<dyn FnMut()>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        log::debug!("listening for {}", event);
        Ok(EventSubscription {
            target,
            event,
            callback,
        })
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        let removed = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        if let Err(err) = removed {
            log::warn!("could not remove {} listener: {:?}", self.event, err);
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MountOptions {
    pub time_scale: f64,
    // Canvas keeps this size instead of following the window
    pub fixed_size: Option<Viewport>,
    // Wrap every frame in a console timer
    pub profile: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        MountOptions {
            time_scale: 1.0,
            fixed_size: None,
            profile: false,
        }
    }
}

struct Scene {
    driver: AnimationDriver,
    surface: CanvasSurface,
}

/// A backdrop running on a page canvas. Dropping it unmounts.
pub struct Mount {
    name: &'static str,
    scene: Rc<RefCell<Scene>>,
    resize: Option<EventSubscription>,
    frame_loop: FrameLoop,
}

impl Mount {
    pub fn start(
        canvas_id: &str,
        backdrop: Box<dyn Backdrop>,
        options: MountOptions,
    ) -> Result<Mount, JsValue> {
        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("window has no document")?;
        let mut surface = CanvasSurface::acquire(&document, canvas_id)?;
        let viewport = match options.fixed_size {
            Some(size) => size,
            None => window_viewport(&window)?,
        };
        surface.fit(viewport)?;

        let mut driver = AnimationDriver::new(backdrop).with_time_scale(options.time_scale);
        driver.mount(viewport);
        let name = driver.name();
        let scene = Rc::new(RefCell::new(Scene { driver, surface }));

        let frame_scene = scene.clone();
        let profile = options.profile;
        let frame_loop = FrameLoop::start(window.clone(), move |now| {
            let _timer = if profile { Some(Timer::new(name)) } else { None };
            let mut guard = frame_scene.borrow_mut();
            let scene = &mut *guard;
            scene.driver.frame(now, &mut scene.surface)
        })?;

        let resize = match options.fixed_size {
            Some(_) => None,
            None => {
                let resize_scene = scene.clone();
                let resize_loop = frame_loop.clone();
                let resize_window = window.clone();
                let subscription = EventSubscription::listen(window.into(), "resize", move || {
                    if let Err(err) = refit(&resize_window, &resize_scene, &resize_loop) {
                        log::warn!("{} could not follow the resize: {:?}", name, err);
                    }
                });
                match subscription {
                    Ok(subscription) => Some(subscription),
                    Err(err) => {
                        frame_loop.stop();
                        return Err(err);
                    }
                }
            }
        };

        Ok(Mount {
            name,
            scene,
            resize,
            frame_loop,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Mounted and not yet cancelled. A frozen or finished backdrop still
    /// counts as running even though no frames are requested.
    pub fn is_running(&self) -> bool {
        self.scene.borrow().driver.is_running()
    }

    /// Stops drawing for good. Returns false if this mount was already torn down.
    pub fn unmount(&mut self) -> bool {
        let cancelled = self.scene.borrow_mut().driver.cancel();
        self.resize.take();
        self.frame_loop.stop();
        cancelled
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

// Re-acquire the canvas at the new window size, re-seed, and make sure a
// loop that stopped itself draws again
fn refit(window: &Window, scene: &RefCell<Scene>, frame_loop: &FrameLoop) -> Result<(), JsValue> {
    let viewport = window_viewport(window)?;
    {
        let mut scene = scene.borrow_mut();
        if !scene.driver.is_running() {
            return Ok(());
        }
        scene.surface.fit(viewport)?;
        scene.driver.resize(viewport);
    }
    frame_loop.resume()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_cache_skips_repeated_colors() {
        let mut cache = StyleCache::default();
        let star = Color::TEAL.with_alpha(0.24);
        assert!(cache.update(star));
        for _ in 0..3000 {
            assert!(!cache.update(star));
        }
        assert!(cache.update(Color::TEAL.with_alpha(0.5)));
        assert!(cache.update(star));
    }

    #[test]
    fn test_style_cache_resends_after_forget() {
        let mut cache = StyleCache::default();
        assert!(cache.update(Color::BLACK));
        cache.forget();
        assert!(cache.update(Color::BLACK));
    }
}
