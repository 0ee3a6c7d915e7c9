use std::rc::Rc;

use hookscope::clock::ManualClock;
use hookscope::dispatch::{CallbackIdentity, HookRegistry, Priority};
use hookscope::domain::Duration;
use hookscope::profiling::{Profiler, ProfilerConfig};

fn setup() -> (Rc<HookRegistry>, Rc<ManualClock>, Profiler<HookRegistry>) {
    let registry = Rc::new(HookRegistry::new());
    let clock = Rc::new(ManualClock::new());
    let profiler = Profiler::attach(&registry, clock.clone(), ProfilerConfig::default());
    (registry, clock, profiler)
}

fn work(clock: &Rc<ManualClock>, ms: u64) -> impl Fn(()) + 'static {
    let clock = Rc::clone(clock);
    move |()| clock.advance_ms(ms)
}

#[test]
fn test_single_callback_event() {
    let (registry, clock, profiler) = setup();
    registry.add("init", 10, CallbackIdentity::named("boot_plugins"), work(&clock, 5));

    registry.dispatch("init", ());

    {
        let tracker = profiler.tracker();
        let flow = tracker.flow("init").unwrap();
        assert_eq!(flow.call_count(), 1);
        assert_eq!(flow.total_ms(), 5.0);
        assert_eq!(flow.phase_durations().len(), 1);
        assert_eq!(flow.phase_durations()[&Priority::At(10)], Duration::from_millis(5));
    }

    let report = profiler.build_report();
    assert_eq!(report.events.len(), 1);
    let row = &report.events[0];
    assert_eq!(row.call_count, 1);
    assert_eq!(row.per_call_ms, 5.0);
    assert_eq!(row.total_ms, 5.0);
    assert_eq!(row.callback_count, 1);
}

#[test]
fn test_positive_intervals_sum_to_total_without_nesting() {
    let (registry, clock, profiler) = setup();
    registry.add("tick", 10, CallbackIdentity::named("a"), work(&clock, 2));
    registry.add("tick", 30, CallbackIdentity::named("b"), work(&clock, 1));

    for _ in 0..3 {
        registry.dispatch("tick", ());
        clock.advance_ms(7);
    }

    let tracker = profiler.tracker();
    let flow = tracker.flow("tick").unwrap();
    let positive: i128 = flow.intervals().iter().map(|i| i.signed_nanos()).filter(|&n| n > 0).sum();
    assert_eq!(positive, flow.total_nanos());
    assert_eq!(flow.total_ms(), 9.0);
}

#[test]
fn test_nested_time_is_subtracted_from_parent() {
    let (registry, clock, profiler) = setup();
    let weak = Rc::downgrade(&registry);
    let render_clock = Rc::clone(&clock);
    registry.add("render", 10, CallbackIdentity::bound("Theme", "render"), move |()| {
        render_clock.advance_ms(4);
        if let Some(registry) = weak.upgrade() {
            registry.dispatch("partial", ());
        }
        render_clock.advance_ms(3);
    });
    registry.add("partial", 10, CallbackIdentity::named("sidebar"), work(&clock, 3));

    registry.dispatch("render", ());

    let tracker = profiler.tracker();
    assert_eq!(tracker.flow("partial").unwrap().total_ms(), 3.0);
    assert_eq!(tracker.flow("render").unwrap().total_ms(), 7.0);
    assert_eq!(tracker.depth(), 0);
}

#[test]
fn test_ranking_is_stable_for_equal_totals() {
    let (registry, clock, profiler) = setup();
    for (event, ms) in [("A", 10), ("B", 5), ("C", 5), ("D", 20)] {
        registry.add(event, 10, CallbackIdentity::named(event), work(&clock, ms));
    }
    for event in ["A", "B", "C", "D"] {
        registry.dispatch(event, ());
    }

    let report = profiler.build_report();
    let order: Vec<&str> = report.events.iter().map(|e| e.event_name.as_str()).collect();
    assert_eq!(order, ["D", "A", "B", "C"]);
    assert_eq!(report.slowest.as_ref().unwrap().event_name, "D");
    assert_eq!(report.total_ms, 40.0);
}

#[test]
fn test_one_phase_bucket_per_priority() {
    let (registry, clock, profiler) = setup();
    for priority in [20, 5, 10] {
        let identity = CallbackIdentity::named(format!("cb{priority}"));
        registry.add("wp_head", priority, identity, work(&clock, 1));
    }

    registry.dispatch("wp_head", ());

    let tracker = profiler.tracker();
    let flow = tracker.flow("wp_head").unwrap();
    let buckets: Vec<_> = flow.phase_durations().iter().map(|(&p, &d)| (p, d)).collect();
    assert_eq!(
        buckets,
        [
            (Priority::At(5), Duration::from_millis(1)),
            (Priority::At(10), Duration::from_millis(1)),
            (Priority::At(20), Duration::from_millis(1)),
        ]
    );
    assert_eq!(flow.phase_total().as_millis(), flow.total_ms());
}

#[test]
fn test_instrumentation_is_idempotent() {
    let (registry, clock, profiler) = setup();
    registry.add("init", 10, CallbackIdentity::named("a"), work(&clock, 1));

    assert!(profiler.ensure_instrumented("init"));
    let installed = registry.callback_count("init");
    assert!(!profiler.ensure_instrumented("init"));
    registry.dispatch("init", ());

    assert_eq!(registry.callback_count("init"), installed);
}

#[test]
fn test_event_without_callbacks_is_left_out() {
    let (registry, clock, profiler) = setup();
    registry.add("init", 10, CallbackIdentity::named("a"), work(&clock, 1));

    registry.dispatch("init", ());
    registry.dispatch("ghost", ());

    assert!(profiler.tracker().flow("ghost").is_some());
    let report = profiler.build_report();
    assert!(report.event("ghost").is_none());
    assert!(report.event("init").is_some());
    assert_eq!(report.total_calls, 2);
}

#[test]
fn test_removed_callbacks_drop_event_at_report_time() {
    let (registry, clock, profiler) = setup();
    let identity = CallbackIdentity::named("once");
    registry.add("shutdown", 10, identity.clone(), work(&clock, 2));

    registry.dispatch("shutdown", ());
    assert!(registry.remove_callback("shutdown", Priority::At(10), &identity));

    let report = profiler.build_report();
    assert!(report.event("shutdown").is_none());
}

#[test]
fn test_probes_do_not_change_run_order() {
    let (registry, _clock, _profiler) = setup();
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let order = [(Priority::Last, "last"), (Priority::At(1), "one"), (Priority::First, "first")];
    for (priority, name) in order {
        let seen = Rc::clone(&seen);
        registry.add("boot", priority, CallbackIdentity::named(name), move |()| {
            seen.borrow_mut().push(name);
        });
    }

    registry.dispatch("boot", ());
    registry.dispatch("boot", ());

    assert_eq!(*seen.borrow(), ["first", "one", "last", "first", "one", "last"]);
}

#[test]
fn test_explicitly_instrumented_event_reported_only_once_dispatched() {
    let (registry, clock, profiler) = setup();
    registry.add("shutdown", 10, CallbackIdentity::named("flush"), work(&clock, 2));

    assert!(profiler.ensure_instrumented("shutdown"));
    assert!(profiler.build_report().event("shutdown").is_none());

    registry.dispatch("shutdown", ());
    let report = profiler.build_report();
    assert_eq!(report.event("shutdown").unwrap().call_count, 1);
}
