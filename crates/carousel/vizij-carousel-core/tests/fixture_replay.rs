use serde::Deserialize;
use vizij_carousel_core::{
    carousel::Carousel,
    config::CarouselConfig,
    engine::Engine,
    input::{EventDisposition, InputEvent},
    outputs::CarouselEvent,
};
use vizij_test_fixtures::{carousels, traces};

#[derive(Debug, Deserialize)]
struct Trace {
    items: usize,
    #[serde(default)]
    reduced_motion: bool,
    steps: Vec<Step>,
    expect: Expect,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Event { event: InputEvent },
    Update { update: f64 },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Expect {
    #[serde(default = "default_true")]
    active: bool,
    iteration: u32,
    target: f64,
    scrub_time: f64,
    accumulator: f64,
    consumed: usize,
    wraps: usize,
}

fn approx(a: f64, b: f64, eps: f64, what: &str) {
    assert!((a - b).abs() <= eps, "{what}: left={a} right={b} eps={eps}");
}

fn config_for(trace: &str) -> CarouselConfig {
    let name = traces::config_name(trace)
        .expect("trace exists")
        .unwrap_or_else(|| "default".to_string());
    let json = carousels::json(&name).expect("config fixture");
    CarouselConfig::from_json(&json).expect("config parses")
}

fn replay(name: &str) {
    let trace: Trace = traces::load(name).expect("load trace");
    let cfg = config_for(name);
    let mut carousel =
        Carousel::start(Engine::new(), trace.items, cfg, &trace.reduced_motion).expect("start");
    let mut consumed = 0;
    let mut wraps = 0;
    for step in &trace.steps {
        match *step {
            Step::Event { event } => {
                if carousel.handle(event) == EventDisposition::Consumed {
                    consumed += 1;
                }
            }
            Step::Update { update } => {
                let out = carousel.update(update);
                wraps += out
                    .events
                    .iter()
                    .filter(|e| matches!(e, CarouselEvent::Wrapped { .. }))
                    .count();
            }
        }
    }
    let s = carousel.snapshot();
    let e = &trace.expect;
    assert_eq!(s.active, e.active, "{name}: active");
    assert_eq!(s.iteration, e.iteration, "{name}: iteration");
    approx(s.target, e.target, 1e-9, &format!("{name}: target"));
    approx(s.scrub_time, e.scrub_time, 1e-9, &format!("{name}: scrub_time"));
    approx(s.accumulator, e.accumulator, 1e-9, &format!("{name}: accumulator"));
    assert_eq!(consumed, e.consumed, "{name}: consumed");
    assert_eq!(wraps, e.wraps, "{name}: wraps");
}

#[test]
fn every_trace_replays() {
    let names = traces::keys();
    assert!(!names.is_empty());
    for name in names {
        replay(&name);
    }
}

#[test]
fn config_fixtures_validate() {
    for name in carousels::keys() {
        let json = carousels::json(&name).expect("read");
        CarouselConfig::from_json(&json).unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}
