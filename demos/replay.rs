//! Replay a captured notification trace and print the resulting ranking.
//!
//! Usage: cargo run --example replay -- <trace.txt> [model] [exponent]
//!
//! Trace format, one step per line:
//!
//! ```text
//! # comment
//! a0                      hex frame bytes (one notification)
//! b0 05 20 00 00 ...
//! wait 95000              advance the stopwatch by N milliseconds
//! stop Pegasus            stop recording and store under a name
//! ```
//!
//! Set `RUST_LOG=debug` to see every frame.

use std::fs;
use std::process;
use std::time::Duration;

use beypass::link::ReplayLink;
use beypass::perf::parse_field;
use beypass::stopwatch::ManualClock;
use beypass::{Model, Monitor, MonitorConfig, RecordStore, SessionEvent, Settings};

enum Step {
    Frame(Vec<u8>),
    Wait(Duration),
    Stop(String),
}

fn parse_trace(text: &str) -> Result<Vec<Step>, String> {
    let mut steps = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(ms) = line.strip_prefix("wait ") {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|e| format!("line {}: bad wait: {e}", n + 1))?;
            steps.push(Step::Wait(Duration::from_millis(ms)));
        } else if let Some(name) = line.strip_prefix("stop") {
            steps.push(Step::Stop(name.trim().to_string()));
        } else {
            let bytes = line
                .split_whitespace()
                .map(|b| u8::from_str_radix(b, 16))
                .collect::<Result<Vec<u8>, _>>()
                .map_err(|e| format!("line {}: bad hex: {e}", n + 1))?;
            steps.push(Step::Frame(bytes));
        }
    }
    Ok(steps)
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Armed => println!("  top set - waiting for launch"),
        SessionEvent::LaunchStarted => println!("  launch!"),
        SessionEvent::PowerUpdate(p) => println!("  power {p}"),
        SessionEvent::LaunchComplete(p) => println!("  data complete, power {p} - still spinning"),
        SessionEvent::Tick(e) => println!("  {e}"),
        SessionEvent::Log(_) => {}
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: replay <trace.txt> [model] [exponent]")?;
    let model: Model = match args.next() {
        Some(key) => key.parse::<Model>().map_err(|e| e.to_string())?,
        None => Model::default(),
    };
    let exponent = match args.next() {
        Some(n) => parse_field(&n).ok_or_else(|| format!("bad exponent: {n:?}"))?,
        None => Settings::default().exponent,
    };

    let text = fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
    let steps = parse_trace(&text)?;

    let mut store = RecordStore::default();
    store.set_model(model);
    if !store.set_exponent(exponent) {
        return Err(format!("exponent must be > 0, got {exponent}"));
    }

    let clock = ManualClock::new();
    let mut monitor = Monitor::with_clock(
        ReplayLink::default(),
        clock.clone(),
        MonitorConfig::default(),
    );
    monitor.set_on_event(print_event);
    monitor.connect().map_err(|e| e.to_string())?;

    for step in steps {
        match step {
            Step::Frame(bytes) => {
                monitor.process(&bytes);
            }
            Step::Wait(d) => {
                clock.advance(d);
                monitor.tick();
            }
            Step::Stop(name) => match monitor.stop_recording(&mut store, &name) {
                Some(r) => println!(
                    "{} {:?}: power {}, {}m {:.3}s",
                    if r.added { "added" } else { "updated" },
                    r.name,
                    r.measurement.power,
                    r.measurement.minutes,
                    r.measurement.seconds,
                ),
                None => println!("stop ignored (not recording)"),
            },
        }
    }
    monitor.disconnect();

    let settings = store.settings();
    println!("\nRanking ({}, n = {}):", settings.model.label(), settings.exponent);
    for (place, ranked) in store.rank().iter().enumerate() {
        println!(
            "  {:>2}. {:<16} {:.4}",
            place + 1,
            ranked.record.name,
            ranked.performance
        );
    }
    Ok(())
}
