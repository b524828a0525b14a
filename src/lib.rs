#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Lifecycle and canvas-resize engine for switchable background visualizers.
//!
//! The core modules are platform independent and driven by host-supplied
//! timestamps. The browser glue lives in the `wasm` module and is only
//! compiled for `wasm32`.

pub mod catalog;
pub mod config;
pub mod resize;
pub mod runtime;
pub mod stage;
pub mod store;
pub mod theme;
mod timer;

pub use catalog::{ParamDescriptor, ParamValues, VisualizerDescriptor, VisualizerId};
pub use config::{BackdropOptions, ConfigError, ResizeOptions, RuntimeOptions};
pub use resize::{DrawingSurface, ResizeCoordinator, ResizeListener, SurfaceSize};
pub use runtime::{Direction, Pointer, TransitionState, VisualizerRuntime};
pub use stage::{DrawRoutine, FrameInputs, Stage};
pub use store::{MemoryStore, PreferenceStore, StoreError};
pub use theme::{Appearance, ThemeId, ThemeRuntime};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod host;
    mod render;

    pub use host::{CanvasSurface, LocalStorage};
    pub use render::Backdrop;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).ok();
        log::info!("backdrop starting");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{Backdrop, CanvasSurface, LocalStorage};
