//! Simulated tracking session: a subject walks across the frame while the
//! engine drives a VISCA actuator whose transport is captured in memory.
//!
//! Run with `RUST_LOG=debug cargo run --example track_sim` to see every
//! VISCA frame the head would receive.

use std::thread;
use std::time::Duration;

use ptz_control::{BoundingBox, Detection};
use ptz_engine::{
    EngineConfig, EngineEvent, ScriptedDetector, SyntheticSource, TrackingEngine, ViscaActuator,
};

fn main() {
    env_logger::init();

    // Subject enters at the left edge, crosses to the right over ~4 seconds,
    // then disappears long enough to trigger the lost-target timeout.
    let mut script: Vec<Vec<Detection>> = Vec::new();
    for i in 0..120 {
        let cx = 40.0 + i as f32 * 4.5;
        script.push(vec![Detection::new(
            BoundingBox::new(cx - 50.0, 140.0, 100.0, 220.0),
            0.85,
            "person",
        )]);
    }
    for _ in 0..30 {
        script.push(Vec::new());
    }

    let config = EngineConfig::default();
    let actuator = ViscaActuator::with_settle_delay(std::io::sink(), Duration::ZERO);

    let engine = TrackingEngine::start(
        config,
        Box::new(SyntheticSource::new(640, 480)),
        Box::new(ScriptedDetector::new(script)),
        Box::new(actuator),
    )
    .expect("engine failed to start");

    let events = engine.events();
    engine.set_auto_tracking(true);

    let printer = thread::spawn(move || {
        while let Ok(event) = events.recv() {
            match event {
                EngineEvent::Command(cmd) => println!("command: {cmd:?}"),
                EngineEvent::FpsUpdate(fps) => println!("fps: {fps:.1}"),
                EngineEvent::ActuatorError(e) => eprintln!("actuator: {e}"),
                EngineEvent::Stopped => break,
                _ => {}
            }
        }
    });

    thread::sleep(Duration::from_secs(6));
    engine.stop();
    printer.join().expect("printer thread panicked");
}
