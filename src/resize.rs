//! Filters noisy surface-bounds notifications down to the few that warrant
//! reallocating the pixel buffer.
//!
//! Assigning a canvas's pixel dimensions clears it, and the draw routine has
//! to reseed its position and trail state afterwards. Mobile browsers change
//! the viewport height whenever their toolbars slide in or out, so small
//! changes are ignored, height gets a much larger threshold than width, and
//! accepted changes are debounced into one trailing reallocation.

use std::time::Duration;

use log::{debug, trace};

use crate::config::ResizeOptions;
use crate::timer::Deadline;

/// Logical surface size plus the device pixel ratio it was allocated at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl SurfaceSize {
    pub fn pixel_width(&self) -> u32 {
        (self.width * self.pixel_ratio) as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.height * self.pixel_ratio) as u32
    }
}

/// A 2D raster surface, e.g. a canvas element and its 2D context.
pub trait DrawingSurface {
    /// Layout bounds, or `None` while the surface is not mounted.
    fn bounds(&self) -> Option<(f64, f64)>;
    fn device_pixel_ratio(&self) -> f64;
    /// Reallocate the pixel buffer. Clears prior contents.
    fn set_pixel_size(&mut self, width: u32, height: u32);
    /// Reset the drawing transform to identity, then scale uniformly.
    fn reset_transform(&mut self, scale: f64);
}

/// Receives the outcome of an accepted resize, in call order.
pub trait ResizeListener {
    fn on_dimensions_changed(&mut self, size: SurfaceSize);
    fn on_reinit(&mut self);
}

#[derive(Debug)]
pub struct ResizeCoordinator {
    options: ResizeOptions,
    last_width: f64,
    last_height: f64,
    pending: Deadline,
    size: Option<SurfaceSize>,
}

impl ResizeCoordinator {
    pub fn new(options: ResizeOptions) -> Self {
        Self {
            options,
            last_width: 0.0,
            last_height: 0.0,
            pending: Deadline::default(),
            size: None,
        }
    }

    /// Size of the last allocation, `None` before `init` succeeds.
    pub fn size(&self) -> Option<SurfaceSize> {
        self.size
    }

    pub fn is_initialized(&self) -> bool {
        self.size.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    pub fn last_bounds(&self) -> (f64, f64) {
        (self.last_width, self.last_height)
    }

    /// Allocate at the current bounds and notify immediately, without
    /// debounce. Does nothing if the surface has no bounds yet.
    pub fn init<S, L>(&mut self, surface: &mut S, listener: &mut L) -> bool
    where
        S: DrawingSurface + ?Sized,
        L: ResizeListener + ?Sized,
    {
        let Some((width, height)) = surface.bounds() else {
            return false;
        };
        self.apply(width, height, surface, listener);
        true
    }

    /// Read the surface bounds and feed them to [`observe`](Self::observe).
    pub fn handle_resize<S>(&mut self, surface: &S, now: Duration) -> bool
    where
        S: DrawingSurface + ?Sized,
    {
        match surface.bounds() {
            Some((width, height)) => self.observe(width, height, now),
            None => false,
        }
    }

    /// Returns `true` if the change was large enough to (re)start the
    /// debounce timer.
    pub fn observe(&mut self, width: f64, height: f64, now: Duration) -> bool {
        let width_changed = (width - self.last_width).abs() >= self.options.width_threshold;
        let height_changed = (height - self.last_height).abs() >= self.options.height_threshold;
        if !width_changed && !height_changed {
            trace!("ignoring resize to {width}x{height}");
            return false;
        }
        self.pending.arm(now, self.options.debounce());
        true
    }

    /// Fire the debounce timer if due. The allocation uses the bounds at
    /// fire time, not the ones that armed the timer.
    pub fn poll<S, L>(&mut self, now: Duration, surface: &mut S, listener: &mut L) -> bool
    where
        S: DrawingSurface + ?Sized,
        L: ResizeListener + ?Sized,
    {
        if !self.pending.fire(now) {
            return false;
        }
        let Some((width, height)) = surface.bounds() else {
            return false;
        };
        debug!("resizing surface to {width}x{height}");
        self.apply(width, height, surface, listener);
        true
    }

    /// Cancel any pending reallocation. Call on unmount.
    pub fn destroy(&mut self) {
        self.pending.cancel();
    }

    fn apply<S, L>(&mut self, width: f64, height: f64, surface: &mut S, listener: &mut L)
    where
        S: DrawingSurface + ?Sized,
        L: ResizeListener + ?Sized,
    {
        let ratio = surface.device_pixel_ratio();
        let pixel_ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        let size = SurfaceSize {
            width,
            height,
            pixel_ratio,
        };

        self.last_width = width;
        self.last_height = height;
        self.size = Some(size);

        // Buffer and transform change together, before any callback runs.
        surface.set_pixel_size(size.pixel_width(), size.pixel_height());
        surface.reset_transform(pixel_ratio);

        listener.on_dimensions_changed(size);
        listener.on_reinit();
    }
}
