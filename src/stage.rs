//! Per-surface frame driver.
//!
//! A [`Stage`] is created when a drawing surface mounts. Each animation
//! frame it advances the runtime and resize timelines, decides whether the
//! draw routine must reinitialize, and hands the routine a read-only view of
//! the runtime state.

use std::time::Duration;

use log::debug;

use crate::catalog::{ParamValues, VisualizerId};
use crate::config::ResizeOptions;
use crate::resize::{DrawingSurface, ResizeCoordinator, ResizeListener, SurfaceSize};
use crate::runtime::{Pointer, VisualizerRuntime};

/// Everything a draw routine may read during one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs<'a> {
    pub visualizer: VisualizerId,
    pub params: &'a ParamValues,
    pub speed_multiplier: f64,
    pub restart_signal: u64,
    /// Present only for interactive visualizers.
    pub pointer: Option<Pointer>,
    pub size: SurfaceSize,
    /// Time since the previous drawn frame.
    pub dt: Duration,
}

pub trait DrawRoutine {
    /// Reset position buffers and trail history for `visualizer` at `size`.
    fn reinit(&mut self, visualizer: VisualizerId, size: SurfaceSize);
    fn draw(&mut self, frame: &FrameInputs<'_>);
}

#[derive(Debug, Default)]
struct Latch {
    size: Option<SurfaceSize>,
    reinit: bool,
}

impl ResizeListener for Latch {
    fn on_dimensions_changed(&mut self, size: SurfaceSize) {
        self.size = Some(size);
    }

    fn on_reinit(&mut self) {
        self.reinit = true;
    }
}

pub struct Stage<S, R> {
    surface: S,
    routine: R,
    resize: ResizeCoordinator,
    latch: Latch,
    seen: Option<(VisualizerId, u64)>,
    last_frame: Option<Duration>,
    mounted: bool,
}

impl<S: DrawingSurface, R: DrawRoutine> Stage<S, R> {
    pub fn new(surface: S, routine: R, options: ResizeOptions) -> Self {
        Self {
            surface,
            routine,
            resize: ResizeCoordinator::new(options),
            latch: Latch::default(),
            seen: None,
            last_frame: None,
            mounted: false,
        }
    }

    /// Allocate the surface and reinitialize the routine synchronously. If
    /// the surface has no bounds yet, allocation is retried on each frame.
    pub fn mount(&mut self, runtime: &VisualizerRuntime) {
        self.mounted = true;
        self.resize.init(&mut self.surface, &mut self.latch);
        self.flush_reinit(runtime);
    }

    /// Cancel pending work. Later frames and resize events are ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.last_frame = None;
        self.resize.destroy();
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn size(&self) -> Option<SurfaceSize> {
        self.latch.size
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn routine(&self) -> &R {
        &self.routine
    }

    pub fn routine_mut(&mut self) -> &mut R {
        &mut self.routine
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Forward a host resize notification.
    pub fn handle_resize(&mut self, now: Duration) -> bool {
        self.mounted && self.resize.handle_resize(&self.surface, now)
    }

    /// Run one animation frame. Returns `true` if the routine drew.
    pub fn frame(&mut self, runtime: &mut VisualizerRuntime, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }
        runtime.advance(now);
        if self.resize.is_initialized() {
            self.resize.poll(now, &mut self.surface, &mut self.latch);
        } else {
            self.resize.init(&mut self.surface, &mut self.latch);
        }

        let Some(size) = self.flush_reinit(runtime) else {
            return false;
        };

        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |prev| now.saturating_sub(prev));
        self.last_frame = Some(now);

        let visualizer = runtime.current();
        let pointer = runtime
            .descriptor()
            .interactive
            .then(|| runtime.pointer());
        let frame = FrameInputs {
            visualizer,
            params: runtime.current_params(),
            speed_multiplier: runtime.speed_multiplier(),
            restart_signal: runtime.restart_signal(),
            pointer,
            size,
            dt,
        };
        self.routine.draw(&frame);
        true
    }

    /// Reinitialize at most once for any mix of accepted resize, restart and
    /// visualizer change since the last call.
    fn flush_reinit(&mut self, runtime: &VisualizerRuntime) -> Option<SurfaceSize> {
        let size = self.latch.size?;
        let state = (runtime.current(), runtime.restart_signal());
        if self.latch.reinit || self.seen != Some(state) {
            debug!("reinitializing {} at {}x{}", state.0, size.width, size.height);
            self.latch.reinit = false;
            self.seen = Some(state);
            self.routine.reinit(state.0, size);
        }
        Some(size)
    }
}
