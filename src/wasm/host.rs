use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, Storage};

use crate::catalog::VisualizerId;
use crate::resize::{DrawingSurface, SurfaceSize};
use crate::stage::{DrawRoutine, FrameInputs};
use crate::store::{PreferenceStore, StoreError};
use crate::theme::{Appearance, ThemeRuntime};

/// `window.localStorage`.
#[derive(Clone)]
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// `None` when storage is unavailable, e.g. blocked by privacy settings.
    pub fn open() -> Option<Self> {
        let storage = window()?.local_storage().ok().flatten()?;
        Some(Self { storage })
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|err| StoreError::Rejected {
                key: key.to_owned(),
                reason: format!("{err:?}"),
            })
    }
}

/// A canvas element and its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("2D canvas not supported")?
            .dyn_into()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }
}

impl DrawingSurface for CanvasSurface {
    fn bounds(&self) -> Option<(f64, f64)> {
        if !self.canvas.is_connected() {
            return None;
        }
        let rect = self.canvas.get_bounding_client_rect();
        Some((rect.width(), rect.height()))
    }

    fn device_pixel_ratio(&self) -> f64 {
        window().map_or(1.0, |w| w.device_pixel_ratio())
    }

    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn reset_transform(&mut self, scale: f64) {
        if let Err(err) = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0) {
            log::error!("setTransform failed: {err:?}");
            return;
        }
        if let Err(err) = self.ctx.scale(scale, scale) {
            log::error!("scale failed: {err:?}");
        }
    }
}

/// A JS call recorded while the backdrop state is borrowed.
pub struct PendingCall {
    func: Function,
    args: Array,
    label: String,
}

impl PendingCall {
    pub fn invoke(self) {
        if let Err(err) = self.func.apply(&JsValue::NULL, &self.args) {
            log::error!("{} threw: {err:?}", self.label);
        }
    }
}

/// Draw routine implemented in JavaScript.
///
/// `reinit(visualizer, size)` and `draw(frame)` are queued rather than
/// called, so the routine may call back into the owning `Backdrop`. The
/// host drains the queue with [`take_calls`](Self::take_calls) once it has
/// released its own borrow.
pub struct JsRoutine {
    draw: Function,
    reinit: Function,
    ctx: CanvasRenderingContext2d,
    queued: Vec<PendingCall>,
}

impl JsRoutine {
    pub fn new(draw: Function, reinit: Function, ctx: CanvasRenderingContext2d) -> Self {
        Self {
            draw,
            reinit,
            ctx,
            queued: Vec::new(),
        }
    }

    pub fn take_calls(&mut self) -> Vec<PendingCall> {
        std::mem::take(&mut self.queued)
    }
}

fn set(obj: &Object, key: &str, value: &JsValue) {
    let _ = Reflect::set(obj, &key.into(), value);
}

fn size_object(size: SurfaceSize) -> Object {
    let obj = Object::new();
    set(&obj, "width", &size.width.into());
    set(&obj, "height", &size.height.into());
    set(&obj, "pixelRatio", &size.pixel_ratio.into());
    obj
}

impl DrawRoutine for JsRoutine {
    fn reinit(&mut self, visualizer: VisualizerId, size: SurfaceSize) {
        self.queued.push(PendingCall {
            func: self.reinit.clone(),
            args: Array::of2(&visualizer.as_str().into(), &size_object(size)),
            label: format!("reinit for {visualizer}"),
        });
    }

    fn draw(&mut self, frame: &FrameInputs<'_>) {
        let params = Object::new();
        for (name, value) in frame.params {
            set(&params, name, &(*value).into());
        }

        let obj = Object::new();
        set(&obj, "ctx", &self.ctx);
        set(&obj, "visualizer", &frame.visualizer.as_str().into());
        set(&obj, "params", &params);
        set(&obj, "speed", &frame.speed_multiplier.into());
        set(&obj, "restart", &JsValue::from_f64(frame.restart_signal as f64));
        set(&obj, "size", &size_object(frame.size));
        set(&obj, "dt", &(frame.dt.as_secs_f64() * 1000.0).into());
        let pointer = match frame.pointer {
            Some(p) => {
                let ptr = Object::new();
                set(&ptr, "x", &p.x.into());
                set(&ptr, "y", &p.y.into());
                set(&ptr, "active", &p.active.into());
                ptr.into()
            }
            None => JsValue::NULL,
        };
        set(&obj, "pointer", &pointer);

        self.queued.push(PendingCall {
            func: self.draw.clone(),
            args: Array::of1(&obj),
            label: format!("draw for {}", frame.visualizer),
        });
    }
}

/// Reflect the theme on the document: the `light` class and `data-theme`
/// on the root element, and the `theme-color` meta tag.
pub fn apply_theme(themes: &ThemeRuntime) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    let Some(root) = document.document_element() else {
        return;
    };
    let appearance = themes.appearance();
    if let Err(err) = root
        .class_list()
        .toggle_with_force("light", appearance == Appearance::Light)
    {
        log::warn!("could not toggle light class: {err:?}");
    }
    let _ = root.set_attribute("data-theme", themes.current().as_str());
    if let Ok(Some(meta)) = document.query_selector(r#"meta[name="theme-color"]"#) {
        let _ = meta.set_attribute("content", appearance.tokens().bg0);
    }
}
