//! Headless run of the sweep over a hardcoded site list, logging each
//! step's progress and dumping a final snapshot. Stands in for the
//! teacher's `visualization` crate's canvas driver, minus the canvas:
//! `RUST_LOG=info cargo run --bin demo` to watch it sweep.

use fortunes::{Engine, SweepState};

const WIDTH: i32 = 800;

fn main() {
    env_logger::init();

    let sites = vec![
        (123, 77),
        (410, 250),
        (255, 333),
        (680, 440),
        (90, 500),
        (600, 600),
        (300, 700),
    ];

    let mut engine = Engine::new(sites, WIDTH).expect("hardcoded demo sites are well-formed");

    while engine.state() != SweepState::Done {
        engine.step();
        log::info!("directrix now at y={}", engine.current_d());
    }

    let snapshot = engine.snapshot(engine.current_d());
    println!("completed edges: {}", snapshot.completed_segments.len());
    for (a, b) in &snapshot.completed_segments {
        println!("  {:?} -> {:?}", a, b);
    }
}
