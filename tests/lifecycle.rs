use std::time::Duration;

use backdrop_wasm::catalog::{defaults, describe, ordered_ids};
use backdrop_wasm::runtime::SPEED_STEPS;
use backdrop_wasm::store::VISUALIZER_KEY;
use backdrop_wasm::{
    Direction, DrawingSurface, MemoryStore, PreferenceStore, ResizeCoordinator, ResizeListener,
    ResizeOptions, RuntimeOptions, SurfaceSize, VisualizerId, VisualizerRuntime,
};
use pretty_assertions::assert_eq;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn runtime() -> (VisualizerRuntime, MemoryStore) {
    let store = MemoryStore::new();
    let rt = VisualizerRuntime::new(RuntimeOptions::default(), Box::new(store.clone()));
    (rt, store)
}

#[test]
fn clamps_agents_example() {
    let (mut rt, _) = runtime();
    assert_eq!(rt.current(), VisualizerId::GridWalk);
    assert_eq!(rt.param("agents"), Some(8.0));

    rt.set_param("agents", 500.0);
    assert_eq!(rt.param("agents"), Some(100.0));
    rt.adjust_param("agents", -200.0);
    assert_eq!(rt.param("agents"), Some(1.0));
}

#[test]
fn values_stay_in_bounds_under_mutation() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    let deltas = [-1e6, 3.5, 17.0, -0.25, 1e9, -42.0];
    for &id in ordered_ids() {
        for (name, _) in describe(id).params() {
            for (i, delta) in deltas.iter().enumerate() {
                rt.set_param_for(id, name, delta * i as f64);
            }
        }
        rt.switch_to(id);
        for (name, _) in describe(id).params() {
            for delta in deltas {
                rt.adjust_param(name, delta);
            }
        }
    }
    for &id in ordered_ids() {
        for (name, p) in describe(id).params() {
            let v = rt.params_for(id)[name];
            assert!(p.min <= v && v <= p.max, "{id}.{name} = {v}");
        }
    }
}

#[test]
fn cycle_closes_after_full_lap() {
    let (mut rt, store) = runtime();
    let start = rt.current();
    let mut t = 0;
    for _ in 0..ordered_ids().len() {
        assert!(rt.cycle_visualizer());
        t += 50;
        rt.advance(ms(t));
        t += 300;
        rt.advance(ms(t));
        assert!(!rt.is_transitioning());
    }
    assert_eq!(rt.current(), start);
    assert_eq!(store.get(VISUALIZER_KEY).as_deref(), Some(start.as_str()));
}

#[test]
fn cycle_follows_curated_order() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    let visited: Vec<_> = (0..ordered_ids().len())
        .map(|_| {
            rt.cycle_visualizer();
            rt.current()
        })
        .collect();
    assert_eq!(
        visited,
        vec![
            VisualizerId::RandomWalk,
            VisualizerId::MatrixRain,
            VisualizerId::ParticleSwarm,
            VisualizerId::Starfield,
            VisualizerId::Ripples,
            VisualizerId::GridWalk,
        ]
    );
}

#[test]
fn speed_clamps_at_both_ends() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    for _ in 0..10 {
        rt.cycle_speed(Direction::Faster);
    }
    assert_eq!(rt.speed_multiplier(), SPEED_STEPS[SPEED_STEPS.len() - 1]);
    for _ in 0..10 {
        rt.cycle_speed(Direction::Slower);
    }
    assert_eq!(rt.speed_multiplier(), SPEED_STEPS[0]);
}

#[test]
fn reset_restores_defaults_and_speed() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    rt.switch_to(VisualizerId::Starfield);
    rt.set_param("stars", 900.0);
    rt.adjust_param("spread", 3.0);
    rt.cycle_speed(Direction::Slower);

    rt.reset_params();
    assert_eq!(rt.current_params(), &defaults(VisualizerId::Starfield));
    assert_eq!(rt.speed_multiplier(), 1.0);
}

#[test]
fn reset_targets_only_named_visualizer() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    rt.set_param("agents", 50.0);
    rt.set_param_for(VisualizerId::Ripples, "decay", 9.0);
    rt.reset_params_for(VisualizerId::Ripples);
    assert_eq!(rt.param("agents"), Some(50.0));
    assert_eq!(rt.params_for(VisualizerId::Ripples)["decay"], 5.0);
}

#[test]
fn restart_only_bumps_signal() {
    let mut rt = VisualizerRuntime::detached(RuntimeOptions::default());
    rt.set_param("trailLength", 60.0);
    rt.restart();
    rt.restart();
    assert_eq!(rt.restart_signal(), 2);
    assert_eq!(rt.param("trailLength"), Some(60.0));
    assert_eq!(rt.current(), VisualizerId::GridWalk);
}

#[test]
fn corrupted_preference_does_not_block_startup() {
    let store = MemoryStore::with_entry(VISUALIZER_KEY, "\u{0}garbage");
    let rt = VisualizerRuntime::new(RuntimeOptions::default(), Box::new(store));
    assert_eq!(rt.current(), ordered_ids()[0]);
}

#[derive(Default)]
struct Canvas {
    bounds: (f64, f64),
    allocations: Vec<(u32, u32)>,
}

impl DrawingSurface for Canvas {
    fn bounds(&self) -> Option<(f64, f64)> {
        Some(self.bounds)
    }
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
    fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.allocations.push((width, height));
    }
    fn reset_transform(&mut self, _scale: f64) {}
}

#[derive(Default)]
struct Counts {
    dims: Vec<SurfaceSize>,
    reinits: usize,
}

impl ResizeListener for Counts {
    fn on_dimensions_changed(&mut self, size: SurfaceSize) {
        self.dims.push(size);
    }
    fn on_reinit(&mut self) {
        self.reinits += 1;
    }
}

#[test]
fn small_changes_never_schedule() {
    let mut canvas = Canvas {
        bounds: (800.0, 600.0),
        ..Default::default()
    };
    let mut counts = Counts::default();
    let mut rc = ResizeCoordinator::new(ResizeOptions::default());
    rc.init(&mut canvas, &mut counts);

    for (w, h) in [(809.0, 600.0), (791.5, 650.0), (800.0, 501.0)] {
        assert!(!rc.observe(w, h, ms(0)));
    }
    assert!(!rc.is_pending());
    assert!(!rc.poll(ms(10_000), &mut canvas, &mut counts));
    assert_eq!(counts.reinits, 1);
    assert_eq!(canvas.allocations.len(), 1);
}

#[test]
fn burst_coalesces_into_one_reallocation() {
    let mut canvas = Canvas::default();
    let mut counts = Counts::default();
    let mut rc = ResizeCoordinator::new(ResizeOptions::default());

    for (t, w) in [(0, 100.0), (40, 130.0), (80, 150.0)] {
        canvas.bounds = (w, 100.0);
        assert!(rc.handle_resize(&canvas, ms(t)));
        assert!(!rc.poll(ms(t), &mut canvas, &mut counts));
    }
    assert!(!rc.poll(ms(229), &mut canvas, &mut counts));
    assert!(rc.poll(ms(230), &mut canvas, &mut counts));

    assert_eq!(canvas.allocations, vec![(150, 100)]);
    assert_eq!(counts.reinits, 1);
    assert_eq!(counts.dims.len(), 1);
    assert_eq!(rc.last_bounds(), (150.0, 100.0));
}
