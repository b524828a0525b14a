//! Active visualizer, per-visualizer parameters, switch transitions,
//! playback speed, restart signal and pointer state.

use std::collections::BTreeMap;
use std::time::Duration;

use log::{debug, warn};

use crate::catalog::{self, ParamValues, VisualizerDescriptor, VisualizerId};
use crate::config::RuntimeOptions;
use crate::store::{PreferenceStore, VISUALIZER_KEY};
use crate::timer::Deadline;

/// Playback speed steps, slowest first.
pub const SPEED_STEPS: [f64; 6] = [0.1, 0.25, 0.5, 1.0, 2.0, 4.0];
const UNIT_SPEED: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Transitioning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Slower,
    Faster,
}

impl Direction {
    /// `+n` is faster, `-n` slower, zero is neither.
    pub fn from_sign(sign: i32) -> Option<Self> {
        match sign.signum() {
            1 => Some(Self::Faster),
            -1 => Some(Self::Slower),
            _ => None,
        }
    }
}

/// Last known pointer position in surface layout coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Waiting for the settle delay before `target` becomes current.
    Settling(VisualizerId),
    /// Committed; waiting for the transition window to close.
    Revealing,
}

/// Resolve a persisted visualizer preference, falling back to the first
/// catalog entry when absent or unrecognized.
pub fn hydrate_visualizer(raw: Option<&str>) -> VisualizerId {
    raw.and_then(|value| value.parse().ok())
        .unwrap_or(catalog::ordered_ids()[0])
}

pub struct VisualizerRuntime {
    options: RuntimeOptions,
    store: Option<Box<dyn PreferenceStore>>,
    current: VisualizerId,
    params: BTreeMap<VisualizerId, ParamValues>,
    phase: Phase,
    phase_timer: Deadline,
    speed_index: usize,
    restart_signal: u64,
    pointer: Pointer,
    now: Duration,
}

impl VisualizerRuntime {
    /// Runtime backed by a durable store. The current visualizer is hydrated
    /// from the store and every accepted switch is written back.
    pub fn new(options: RuntimeOptions, store: Box<dyn PreferenceStore>) -> Self {
        let saved = store.get(VISUALIZER_KEY);
        let current = hydrate_visualizer(saved.as_deref());
        if let Some(raw) = saved.as_deref().filter(|raw| *raw != current.as_str()) {
            warn!("ignoring unrecognized visualizer preference `{raw}`");
        }
        let mut runtime = Self::detached(options);
        runtime.current = current;
        runtime.store = Some(store);
        runtime
    }

    /// Runtime without a durable store. Switches take effect immediately,
    /// with no settle delays.
    pub fn detached(options: RuntimeOptions) -> Self {
        let params = catalog::ordered_ids()
            .iter()
            .map(|&id| (id, catalog::defaults(id)))
            .collect();
        Self {
            options,
            store: None,
            current: catalog::ordered_ids()[0],
            params,
            phase: Phase::Idle,
            phase_timer: Deadline::default(),
            speed_index: UNIT_SPEED,
            restart_signal: 0,
            pointer: Pointer::default(),
            now: Duration::ZERO,
        }
    }

    pub fn current(&self) -> VisualizerId {
        self.current
    }

    pub fn descriptor(&self) -> &'static VisualizerDescriptor {
        catalog::describe(self.current)
    }

    pub fn current_params(&self) -> &ParamValues {
        self.params_for(self.current)
    }

    pub fn params_for(&self, id: VisualizerId) -> &ParamValues {
        // Seeded for every id at construction and never removed.
        &self.params[&id]
    }

    pub fn param(&self, name: &str) -> Option<f64> {
        self.current_params().get(name).copied()
    }

    pub fn transition_state(&self) -> TransitionState {
        match self.phase {
            Phase::Idle => TransitionState::Idle,
            Phase::Settling(_) | Phase::Revealing => TransitionState::Transitioning,
        }
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition_state() == TransitionState::Transitioning
    }

    pub fn speed_multiplier(&self) -> f64 {
        SPEED_STEPS[self.speed_index]
    }

    pub fn restart_signal(&self) -> u64 {
        self.restart_signal
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Move the logical timeline forward, firing any due transition step.
    pub fn advance(&mut self, now: Duration) {
        self.now = self.now.max(now);
        while self.phase_timer.fire(self.now) {
            self.phase = match self.phase {
                Phase::Settling(target) => {
                    self.current = target;
                    self.phase_timer
                        .arm(self.now, self.options.transition_window());
                    Phase::Revealing
                }
                Phase::Revealing | Phase::Idle => Phase::Idle,
            };
        }
    }

    /// Begin switching to `target`. Returns `false` when the request is a
    /// no-op: `target` is already current, or a switch is in flight.
    pub fn switch_to(&mut self, target: VisualizerId) -> bool {
        if target == self.current || self.is_transitioning() {
            return false;
        }
        if self.options.reset_speed_on_switch {
            self.speed_index = UNIT_SPEED;
        }

        let Some(store) = self.store.as_mut() else {
            debug!("switching visualizer {} -> {target}", self.current);
            self.current = target;
            return true;
        };

        if let Err(err) = store.set(VISUALIZER_KEY, target.as_str()) {
            warn!("could not persist visualizer preference: {err}");
        }
        debug!("switching visualizer {} -> {target}", self.current);
        self.phase = Phase::Settling(target);
        self.phase_timer.arm(self.now, self.options.settle_delay());
        true
    }

    pub fn cycle_visualizer(&mut self) -> bool {
        let order = catalog::ordered_ids();
        let next = order
            .iter()
            .position(|&id| id == self.current)
            .map_or(0, |idx| (idx + 1) % order.len());
        self.switch_to(order[next])
    }

    /// Set a parameter of the current visualizer.
    pub fn set_param(&mut self, name: &str, value: f64) {
        self.set_param_for(self.current, name, value);
    }

    /// Set a parameter of any visualizer, clamped into its bounds. Unknown
    /// names and NaN values are ignored.
    pub fn set_param_for(&mut self, id: VisualizerId, name: &str, value: f64) {
        let descriptor = catalog::describe(id);
        let Some((key, desc)) = descriptor.params().find(|(key, _)| *key == name) else {
            return;
        };
        if value.is_nan() {
            return;
        }
        if let Some(values) = self.params.get_mut(&id) {
            values.insert(key, desc.clamp(value));
        }
    }

    pub fn adjust_param(&mut self, name: &str, delta: f64) {
        let value = self.param(name).unwrap_or(0.0);
        self.set_param(name, value + delta);
    }

    /// Step playback speed; clamps at either end of [`SPEED_STEPS`].
    pub fn cycle_speed(&mut self, direction: Direction) {
        self.speed_index = match direction {
            Direction::Faster => (self.speed_index + 1).min(SPEED_STEPS.len() - 1),
            Direction::Slower => self.speed_index.saturating_sub(1),
        };
    }

    pub fn restart(&mut self) {
        self.restart_signal += 1;
    }

    pub fn reset_params(&mut self) {
        self.reset_params_for(self.current);
    }

    pub fn reset_params_for(&mut self, id: VisualizerId) {
        self.params.insert(id, catalog::defaults(id));
        self.speed_index = UNIT_SPEED;
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        self.pointer = Pointer { x, y, active: true };
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer.active = false;
    }
}
