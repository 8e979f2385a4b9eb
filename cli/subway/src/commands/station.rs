//! `subway station`: station registry.

use anyhow::Result;
use subway_core::StationId;
use subway_store::{FileStore, StoreError};

pub fn add(store: &FileStore, name: &str) -> Result<()> {
    let station = store.transaction(|svc| svc.create_station(name))?;
    println!("Created station {station}");
    Ok(())
}

pub fn list(store: &FileStore) -> Result<()> {
    let stations = store.read(|svc| svc.stations())?;
    if stations.is_empty() {
        println!("No stations.");
        return Ok(());
    }

    println!("{:<6} NAME", "ID");
    println!("{}", "-".repeat(30));
    for station in &stations {
        println!("{:<6} {}", station.id, station.name);
    }
    println!("\n{} station(s)", stations.len());
    Ok(())
}

pub fn remove(store: &FileStore, id: u64) -> Result<()> {
    let id = StationId(id);
    store.transaction(|svc| {
        if svc.delete_station(id)? {
            Ok(())
        } else {
            Err(StoreError::StationNotFound(id))
        }
    })?;
    println!("Removed station {id}");
    Ok(())
}
