//! `subway section`: insert sections into and remove stations from a line.

use anyhow::Result;
use subway_core::{Distance, LineId, StationId};
use subway_store::{FileStore, LineChange, NewSection};

use super::line::path_string;

pub fn add(store: &FileStore, line: u64, up: u64, down: u64, distance: Distance) -> Result<()> {
    let change = store.transaction(|svc| {
        svc.add_section(
            LineId(line),
            NewSection {
                up_station_id: StationId(up),
                down_station_id: StationId(down),
                distance,
            },
        )
    })?;
    report(&change);
    Ok(())
}

pub fn remove(store: &FileStore, line: u64, station: u64) -> Result<()> {
    let change = store.transaction(|svc| svc.remove_station(LineId(line), StationId(station)))?;
    report(&change);
    Ok(())
}

fn report(change: &LineChange) {
    let c = &change.changes;
    println!(
        "Line {}: {} inserted, {} updated, {} deleted",
        change.line,
        c.inserted.len(),
        c.updated.len(),
        c.deleted.len()
    );
    println!("  {}", path_string(&change.line));
}
