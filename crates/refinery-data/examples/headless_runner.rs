//! Headless runner: loads a plant, feeds it for a while, prints snapshots,
//! and checks that two identical runs end in identical states.
//!
//! Run with: `cargo run --package refinery-data --example headless_runner`
//! Set `RUST_LOG=refinery_core=debug` to watch every state transition.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use refinery_core::event::{Event, EventKind};
use refinery_core::fixed::{Fixed64, fixed64_to_f64};
use refinery_core::query::ConverterSnapshot;
use refinery_data::{Plant, load_plant};
use tracing_subscriber::EnvFilter;

const FRAMES: u32 = 120;

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("refinery_core=info,refinery_data=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let plant_path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/plants/sawmill.ron"));

    let (snaps1, converted) = run(plant_path);
    println!("After {FRAMES} frames ({converted} batches converted):");
    for (name, snap) in &snaps1 {
        println!(
            "  [{name:>10}] state={:?}, progress={:.2}, in={}, out={}",
            snap.state,
            fixed64_to_f64(snap.progress),
            snap.source_total(),
            snap.target_total()
        );
    }

    let (snaps2, _) = run(plant_path);
    if snaps1 == snaps2 {
        println!("Determinism: PASS");
    } else {
        println!("Determinism: FAIL");
        std::process::exit(1);
    }
}

/// Feed every converter one unit of its source per frame and collect goods
/// every tenth frame.
fn run(path: &Path) -> (Vec<(String, ConverterSnapshot)>, u32) {
    let mut plant: Plant = load_plant(path).unwrap_or_else(|e| {
        panic!("failed to load plant '{}': {e}", path.display());
    });

    let converted = Rc::new(Cell::new(0u32));
    for named in &mut plant.converters {
        let counter = Rc::clone(&converted);
        named.converter.subscribe(
            EventKind::Converted,
            Box::new(move |event: &Event| {
                if let Event::Converted { .. } = event {
                    counter.set(counter.get() + 1);
                }
            }),
        );
    }

    let frame = Fixed64::from_num(0.25);
    for i in 0..FRAMES {
        for named in &mut plant.converters {
            let c = &mut named.converter;
            let source = c.recipe().source_type();
            // Overflow is fine: a full input store just refuses the unit.
            if let Err(e) = c.add_source_item(source, 1) {
                panic!("feeding '{}' failed: {e}", named.name);
            }
            if i % 10 == 9 {
                let ready = c.target_count();
                match c.remove_target(ready) {
                    Ok(true) => {}
                    Ok(false) => panic!("'{}' refused to hand over {ready} goods", named.name),
                    Err(e) => panic!("collecting from '{}' failed: {e}", named.name),
                }
            }
        }
        if let Err(e) = plant.advance(frame) {
            panic!("advance failed: {e}");
        }
    }

    let snaps = plant
        .snapshots()
        .into_iter()
        .map(|(name, snap)| (name.to_string(), snap))
        .collect();
    (snaps, converted.get())
}
