#![allow(clippy::float_cmp)]

use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::surface::RenderSurface;
use crate::testing::MockSurface;

/// Clock the test moves by hand.
#[derive(Clone, Default)]
struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    fn at(ms: f64) -> Self {
        Self(Rc::new(Cell::new(ms)))
    }

    fn advance(&self, ms: f64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Update(f64),
    Render,
}

/// Records calls into the shared context.
#[derive(Default)]
struct Recorder {
    stop_after_updates: Option<(usize, StopHandle)>,
    updates: usize,
    fail_render: bool,
}

impl Component<MockSurface, Vec<Call>> for Recorder {
    fn update(&mut self, props: UpdateProps<'_, Vec<Call>>) {
        props.context.push(Call::Update(props.delta_time));
        self.updates += 1;
        if let Some((limit, handle)) = &self.stop_after_updates {
            if self.updates >= *limit {
                handle.stop();
            }
        }
    }

    fn render(&mut self, props: RenderProps<'_, MockSurface, Vec<Call>>) -> Result<()> {
        props.context.push(Call::Render);
        if self.fail_render {
            return Err(Error::Platform("draw failed".to_owned()));
        }
        Ok(())
    }
}

fn frame_loop(clock: &ManualClock) -> FrameLoop<MockSurface, Vec<Call>, Recorder, ManualClock> {
    FrameLoop::new(MockSurface::new(100.0, 100.0), Vec::new(), Recorder::default(), clock.clone())
}

// =============================================================
// frame_delta_secs
// =============================================================

#[test]
fn delta_converts_ms_to_seconds() {
    assert_eq!(frame_delta_secs(1000.0, 1016.0), 0.016);
}

#[test]
fn delta_clamps_long_gaps_to_one_second() {
    assert_eq!(frame_delta_secs(0.0, 5000.0), 1.0);
}

#[test]
fn delta_never_negative() {
    assert_eq!(frame_delta_secs(2000.0, 1000.0), 0.0);
}

// =============================================================
// FrameLoop
// =============================================================

#[test]
fn tick_runs_update_then_render() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    clock.advance(16.0);
    assert!(fl.tick());
    assert_eq!(fl.context(), &vec![Call::Update(0.016), Call::Render]);
}

#[test]
fn first_delta_measured_from_construction() {
    let clock = ManualClock::at(500.0);
    let mut fl = frame_loop(&clock);
    clock.advance(250.0);
    fl.tick();
    assert_eq!(fl.context()[0], Call::Update(0.25));
}

#[test]
fn long_pause_yields_delta_of_one() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    fl.tick();
    clock.advance(5000.0);
    fl.tick();
    assert_eq!(fl.context()[2], Call::Update(1.0));
}

#[test]
fn stopped_loop_does_nothing() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    fl.stop();
    assert!(!fl.is_running());
    assert!(!fl.tick());
    assert!(fl.context().is_empty());
}

#[test]
fn stop_during_update_skips_render() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    let handle = fl.stop_handle();
    fl.component.stop_after_updates = Some((2, handle));

    assert!(fl.tick());
    assert!(!fl.tick());
    assert!(!fl.tick());
    assert_eq!(fl.context(), &vec![Call::Update(0.0), Call::Render, Call::Update(0.0)]);
}

#[test]
fn stop_handle_reflects_loop_state() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    let handle = fl.stop_handle();
    assert!(handle.is_running());
    fl.stop();
    assert!(!handle.is_running());
}

#[test]
fn render_error_does_not_stop_loop() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    fl.component.fail_render = true;
    assert!(fl.tick());
    assert!(fl.tick());
    assert!(fl.is_running());
    assert_eq!(fl.context().len(), 4);
}

#[test]
fn resize_is_visible_to_component() {
    struct SizeProbe;
    impl Component<MockSurface, Vec<Size>> for SizeProbe {
        fn update(&mut self, props: UpdateProps<'_, Vec<Size>>) {
            props.context.push(props.window_size);
        }
        fn render(&mut self, props: RenderProps<'_, MockSurface, Vec<Size>>) -> Result<()> {
            props.context.push(props.window_size);
            Ok(())
        }
    }

    let mut fl = FrameLoop::new(MockSurface::new(1.0, 1.0), Vec::new(), SizeProbe, ManualClock::at(0.0));
    fl.resize(Size::new(640.0, 480.0));
    fl.tick();
    assert_eq!(fl.window_size(), Size::new(640.0, 480.0));
    assert_eq!(fl.context(), &vec![Size::new(640.0, 480.0); 2]);
}

#[test]
fn render_receives_surface() {
    struct Painter;
    impl Component<MockSurface, ()> for Painter {
        fn update(&mut self, _props: UpdateProps<'_, ()>) {}
        fn render(&mut self, props: RenderProps<'_, MockSurface, ()>) -> Result<()> {
            props.surface.translate(3.0, 4.0)
        }
    }

    let mut fl = FrameLoop::new(MockSurface::new(1.0, 1.0), (), Painter, ManualClock::at(0.0));
    fl.tick();
    assert_eq!(fl.surface().ops.len(), 1);
}

#[test]
fn context_mut_changes_persist_across_ticks() {
    let clock = ManualClock::at(0.0);
    let mut fl = frame_loop(&clock);
    fl.context_mut().push(Call::Render);
    fl.tick();
    assert_eq!(fl.context().len(), 3);
}

// =============================================================
// Canvas sizing
// =============================================================

#[test]
fn logical_size_keeps_fractional_pixels() {
    assert_eq!(scaled_client_size(333, 100, 1.5), Size::new(499.5, 150.0));
    assert_eq!(scaled_client_size(0, 0, 2.0), Size::default());
}

#[test]
fn backing_store_truncates() {
    assert_eq!(backing_pixels(499.5), 499);
    assert_eq!(backing_pixels(499.99), 499);
    assert_eq!(backing_pixels(150.0), 150);
    assert_eq!(backing_pixels(-3.0), 0);
}

// =============================================================
// FrameOptions
// =============================================================

#[test]
fn frame_options_default() {
    let o = FrameOptions::default();
    assert!(o.alpha);
    assert!(!o.desynchronized);
    assert!(!o.will_read_frequently);
}

#[test]
fn frame_options_partial_json() {
    let o = FrameOptions::from_json(r#"{"desynchronized": true}"#).expect("parse");
    assert!(o.alpha);
    assert!(o.desynchronized);
}

#[test]
fn frame_options_bad_json() {
    assert!(matches!(FrameOptions::from_json("{alpha"), Err(Error::InvalidOptions(_))));
}
