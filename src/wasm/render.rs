use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Event, EventTarget, MediaQueryList, MediaQueryListEvent, MouseEvent};

use super::host::{apply_theme, CanvasSurface, JsRoutine, LocalStorage, PendingCall};
use crate::catalog::{self, VisualizerId};
use crate::config::BackdropOptions;
use crate::runtime::{Direction, VisualizerRuntime};
use crate::stage::Stage;
use crate::theme::{ThemeId, ThemeRuntime};

struct Inner {
    runtime: VisualizerRuntime,
    themes: ThemeRuntime,
    stage: Stage<CanvasSurface, JsRoutine>,
    frame_id: Option<i32>,
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

fn dark_query() -> Option<MediaQueryList> {
    window()?.match_media(DARK_QUERY).ok().flatten()
}

fn now() -> Duration {
    let ms = window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now());
    Duration::from_secs_f64(ms.max(0.0) / 1000.0)
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &key.into(), value);
}

/// Background visualizer mounted on one canvas.
///
/// JavaScript UI controls call the mutation methods; the frame loop started
/// by `start` reads the resulting state every animation frame.
#[wasm_bindgen]
pub struct Backdrop {
    inner: Rc<RefCell<Inner>>,
    frame: FrameSlot,
    listeners: RefCell<Vec<Listener>>,
}

#[wasm_bindgen]
impl Backdrop {
    /// `draw(frame)` and `reinit(visualizer, size)` implement the active
    /// visualizer. `options` is an optional JSON object of overrides.
    ///
    /// Both callbacks run after the backdrop has released its own state, so
    /// they may call any method on this object, including `destroy`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: web_sys::HtmlCanvasElement,
        draw: Function,
        reinit: Function,
        options: Option<String>,
    ) -> Result<Backdrop, JsValue> {
        let options = match options.as_deref().map(BackdropOptions::from_json) {
            Some(Ok(options)) => options,
            Some(Err(err)) => {
                log::warn!("{err}; using defaults");
                BackdropOptions::default()
            }
            None => BackdropOptions::default(),
        };

        let surface = CanvasSurface::new(canvas)?;
        let routine = JsRoutine::new(draw, reinit, surface.context().clone());
        let (runtime, mut themes) = match LocalStorage::open() {
            Some(storage) => (
                VisualizerRuntime::new(options.runtime, Box::new(storage.clone())),
                ThemeRuntime::new(Box::new(storage)),
            ),
            None => (
                VisualizerRuntime::detached(options.runtime),
                ThemeRuntime::detached(),
            ),
        };

        if let Some(query) = dark_query() {
            themes.follow_system(query.matches());
        }
        apply_theme(&themes);

        Ok(Backdrop {
            inner: Rc::new(RefCell::new(Inner {
                runtime,
                themes,
                stage: Stage::new(surface, routine, options.resize),
                frame_id: None,
            })),
            frame: Rc::new(RefCell::new(None)),
            listeners: RefCell::new(Vec::new()),
        })
    }

    /// Mount the canvas, attach listeners and start the frame loop.
    pub fn start(&self) -> Result<(), JsValue> {
        let window = window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let root = document.document_element().ok_or("no document element")?;

        let calls = {
            let mut inner = self.inner.borrow_mut();
            let Inner { runtime, stage, .. } = &mut *inner;
            if stage.is_mounted() {
                return Ok(());
            }
            stage.mount(runtime);
            stage.routine_mut().take_calls()
        };

        let inner = self.inner.clone();
        self.listen(window.clone().into(), "resize", move |_| {
            inner.borrow_mut().stage.handle_resize(now());
        })?;

        let inner = self.inner.clone();
        self.listen(window.clone().into(), "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let mut inner = inner.borrow_mut();
            let rect = inner.stage.surface().canvas().get_bounding_client_rect();
            inner.runtime.on_pointer_move(
                f64::from(event.client_x()) - rect.left(),
                f64::from(event.client_y()) - rect.top(),
            );
        })?;

        let inner = self.inner.clone();
        self.listen(root.into(), "mouseleave", move |_| {
            inner.borrow_mut().runtime.on_pointer_leave();
        })?;

        if let Some(query) = dark_query() {
            let inner = self.inner.clone();
            self.listen(query.into(), "change", move |event| {
                let Some(event) = event.dyn_ref::<MediaQueryListEvent>() else {
                    return;
                };
                let mut inner = inner.borrow_mut();
                if inner.themes.follow_system(event.matches()) {
                    apply_theme(&inner.themes);
                }
            })?;
        }

        // Animation loop
        // `frame` holds the animation-frame closure; the closure only keeps a
        // weak handle on its slot so it can reschedule itself.
        if self.frame.borrow().is_none() {
            *self.frame.borrow_mut() = Some(self.frame_loop());
        }

        let id = window.request_animation_frame(
            self.frame
                .borrow()
                .as_ref()
                .ok_or("frame loop missing")?
                .as_ref()
                .unchecked_ref(),
        )?;
        self.inner.borrow_mut().frame_id = Some(id);

        run(calls);
        Ok(())
    }

    /// Stop the frame loop, cancel pending resizes and detach listeners.
    ///
    /// Safe to call from inside a `draw` or `reinit` callback.
    pub fn destroy(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.stage.unmount();
            if let (Some(id), Some(window)) = (inner.frame_id.take(), window()) {
                let _ = window.cancel_animation_frame(id);
            }
        }

        for listener in self.listeners.borrow_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
    }

    #[wasm_bindgen(js_name = switchTo)]
    pub fn switch_to(&self, name: &str) -> bool {
        match name.parse::<VisualizerId>() {
            Ok(id) => self.inner.borrow_mut().runtime.switch_to(id),
            Err(err) => {
                log::debug!("{err}");
                false
            }
        }
    }

    #[wasm_bindgen(js_name = cycleVisualizer)]
    pub fn cycle_visualizer(&self) -> bool {
        self.inner.borrow_mut().runtime.cycle_visualizer()
    }

    pub fn current(&self) -> String {
        self.inner.borrow().runtime.current().as_str().to_owned()
    }

    #[wasm_bindgen(js_name = isTransitioning)]
    pub fn is_transitioning(&self) -> bool {
        self.inner.borrow().runtime.is_transitioning()
    }

    #[wasm_bindgen(js_name = setParam)]
    pub fn set_param(&self, name: &str, value: f64) {
        self.inner.borrow_mut().runtime.set_param(name, value);
    }

    #[wasm_bindgen(js_name = adjustParam)]
    pub fn adjust_param(&self, name: &str, delta: f64) {
        self.inner.borrow_mut().runtime.adjust_param(name, delta);
    }

    #[wasm_bindgen(js_name = paramValue)]
    pub fn param_value(&self, name: &str) -> Option<f64> {
        self.inner.borrow().runtime.param(name)
    }

    #[wasm_bindgen(js_name = cycleSpeed)]
    pub fn cycle_speed(&self, direction: i32) {
        if let Some(direction) = Direction::from_sign(direction) {
            self.inner.borrow_mut().runtime.cycle_speed(direction);
        }
    }

    #[wasm_bindgen(js_name = speedMultiplier)]
    pub fn speed_multiplier(&self) -> f64 {
        self.inner.borrow().runtime.speed_multiplier()
    }

    pub fn restart(&self) {
        self.inner.borrow_mut().runtime.restart();
    }

    #[wasm_bindgen(js_name = resetParams)]
    pub fn reset_params(&self) {
        self.inner.borrow_mut().runtime.reset_params();
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) {
        self.inner.borrow_mut().runtime.on_pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&self) {
        self.inner.borrow_mut().runtime.on_pointer_leave();
    }

    /// Descriptor of the current visualizer:
    /// `{ id, displayName, tagline, description, interactive, params: [...] }`.
    pub fn describe(&self) -> JsValue {
        let inner = self.inner.borrow();
        let desc = inner.runtime.descriptor();
        let values = inner.runtime.current_params();

        let params = Array::new();
        for (name, p) in desc.params() {
            let obj = Object::new();
            set(&obj, "name", &name.into());
            set(&obj, "label", &p.label.into());
            set(&obj, "min", &p.min.into());
            set(&obj, "max", &p.max.into());
            set(&obj, "step", &p.step.into());
            set(&obj, "default", &p.default.into());
            set(&obj, "color", &p.color.into());
            let value = values.get(name).copied().unwrap_or(p.default);
            set(&obj, "value", &value.into());
            params.push(&obj);
        }

        let obj = Object::new();
        set(&obj, "id", &desc.id.as_str().into());
        set(&obj, "displayName", &desc.display_name.into());
        set(&obj, "tagline", &desc.tagline.into());
        set(&obj, "description", &desc.description.into());
        set(&obj, "interactive", &desc.interactive.into());
        set(&obj, "params", &params);
        obj.into()
    }

    /// Visualizer ids in navigation order.
    pub fn visualizers() -> Array {
        catalog::ordered_ids()
            .iter()
            .map(|id| JsValue::from_str(id.as_str()))
            .collect()
    }

    pub fn theme(&self) -> String {
        self.inner.borrow().themes.current().as_str().to_owned()
    }

    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(&self, name: &str) -> bool {
        match name.parse::<ThemeId>() {
            Ok(id) => {
                let mut inner = self.inner.borrow_mut();
                inner.themes.set_theme(id);
                apply_theme(&inner.themes);
                true
            }
            Err(_) => false,
        }
    }

    #[wasm_bindgen(js_name = cycleTheme)]
    pub fn cycle_theme(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.themes.cycle_theme();
        apply_theme(&inner.themes);
    }

    pub fn appearance(&self) -> String {
        self.inner.borrow().themes.appearance().as_str().to_owned()
    }

    #[wasm_bindgen(js_name = toggleAppearance)]
    pub fn toggle_appearance(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.themes.toggle_appearance();
        apply_theme(&inner.themes);
    }

    /// Fonts, palette and surface tokens for the current theme and appearance.
    #[wasm_bindgen(js_name = themeTokens)]
    pub fn theme_tokens(&self) -> JsValue {
        let inner = self.inner.borrow();
        let theme = inner.themes.descriptor();
        let appearance = inner.themes.appearance();
        let tokens = appearance.tokens();

        let palette: Array = theme.palette.iter().map(|c| JsValue::from_str(c)).collect();
        let strokes: Array = appearance
            .strokes()
            .iter()
            .map(|c| JsValue::from_str(c))
            .collect();

        let obj = Object::new();
        set(&obj, "theme", &theme.id.as_str().into());
        set(&obj, "displayName", &theme.display_name.into());
        set(&obj, "fontFamily", &theme.font_family.into());
        set(&obj, "fontMono", &theme.font_mono.into());
        set(&obj, "palette", &palette);
        set(&obj, "strokes", &strokes);
        set(&obj, "bg0", &tokens.bg0.into());
        set(&obj, "bg1", &tokens.bg1.into());
        set(&obj, "bg2", &tokens.bg2.into());
        set(&obj, "fade", &tokens.fade.into());
        set(&obj, "fg1", &tokens.fg1.into());
        set(&obj, "gray", &tokens.gray.into());
        obj.into()
    }
}

/// Invoke queued JS callbacks. Callers must not hold a borrow of `Inner`.
fn run(calls: Vec<PendingCall>) {
    for call in calls {
        call.invoke();
    }
}

impl Backdrop {
    fn frame_loop(&self) -> Closure<dyn FnMut(f64)> {
        let slot: Weak<_> = Rc::downgrade(&self.frame);
        let inner = self.inner.clone();
        Closure::wrap(Box::new(move |timestamp: f64| {
            let calls = {
                let mut guard = inner.borrow_mut();
                let Inner {
                    runtime,
                    stage,
                    frame_id,
                    ..
                } = &mut *guard;
                *frame_id = None;
                if !stage.is_mounted() {
                    return;
                }
                stage.frame(runtime, Duration::from_secs_f64(timestamp.max(0.0) / 1000.0));
                stage.routine_mut().take_calls()
            };
            run(calls);

            // schedule next, unless a callback destroyed or restarted us
            let mut guard = inner.borrow_mut();
            if !guard.stage.is_mounted() || guard.frame_id.is_some() {
                return;
            }
            guard.frame_id = slot.upgrade().and_then(|slot| {
                let cb = slot.borrow();
                web_sys::window()?
                    .request_animation_frame(cb.as_ref()?.as_ref().unchecked_ref())
                    .ok()
            });
        }) as Box<dyn FnMut(f64)>)
    }

    fn listen(
        &self,
        target: EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener {
            target,
            event,
            closure,
        });
        Ok(())
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.destroy();
    }
}
