//! `subway line`: line management and inspection.

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use subway_core::{Distance, Line, LineId, Station, StationId};
use subway_store::{FileStore, NewLine, NewSection, SectionRow, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// JSON view of a line: stations in travel order plus its section rows.
#[derive(Debug, Serialize)]
struct LineReport<'a> {
    id: LineId,
    name: &'a str,
    color: &'a str,
    total_distance: u64,
    stations: Vec<Station>,
    sections: Vec<SectionRow>,
}

impl<'a> From<&'a Line> for LineReport<'a> {
    fn from(line: &'a Line) -> Self {
        Self {
            id: line.id(),
            name: line.name(),
            color: line.color(),
            total_distance: line.sections().total_distance(),
            stations: line.stations(),
            sections: line
                .sections()
                .sections()
                .iter()
                .map(SectionRow::from)
                .collect(),
        }
    }
}

pub fn create(
    store: &FileStore,
    name: &str,
    color: &str,
    up: u64,
    down: u64,
    distance: Distance,
) -> Result<()> {
    let line = store.transaction(|svc| {
        svc.create_line(NewLine {
            name: name.to_string(),
            color: color.to_string(),
            section: NewSection {
                up_station_id: StationId(up),
                down_station_id: StationId(down),
                distance,
            },
        })
    })?;
    println!("Created line {line}");
    println!("  {}", path_string(&line));
    Ok(())
}

pub fn list(store: &FileStore) -> Result<()> {
    let lines = store.read(|svc| svc.lines())?;
    if lines.is_empty() {
        println!("No lines.");
        return Ok(());
    }

    println!(
        "{:<6} {:<20} {:<10} {:>8} {:>10}",
        "ID", "NAME", "COLOR", "STATIONS", "DISTANCE"
    );
    println!("{}", "-".repeat(58));
    for line in &lines {
        println!(
            "{:<6} {:<20} {:<10} {:>8} {:>10}",
            line.id(),
            line.name(),
            line.color(),
            line.stations().len(),
            line.sections().total_distance()
        );
    }
    println!("\n{} line(s)", lines.len());
    Ok(())
}

pub fn show(store: &FileStore, id: u64, format: OutputFormat) -> Result<()> {
    let line = store.read(|svc| svc.load_line(LineId(id)))?;
    println!("{}", render(&line, format)?);
    Ok(())
}

pub fn update(
    store: &FileStore,
    id: u64,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<()> {
    if name.is_none() && color.is_none() {
        bail!("nothing to update: pass --name and/or --color");
    }
    let line = store.transaction(|svc| svc.update_line(LineId(id), name, color))?;
    println!("Updated line {line}");
    Ok(())
}

pub fn remove(store: &FileStore, id: u64) -> Result<()> {
    let id = LineId(id);
    store.transaction(|svc| {
        if svc.delete_line(id)? {
            Ok(())
        } else {
            Err(StoreError::LineNotFound(id))
        }
    })?;
    println!("Removed line {id}");
    Ok(())
}

pub(crate) fn render(line: &Line, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&LineReport::from(line))
            .context("serializing line report"),
        OutputFormat::Text => {
            let mut out = String::new();
            out.push_str(&format!("Line: {line}\n"));
            out.push_str(&format!(
                "Stations: {}  Sections: {}  Total distance: {}\n",
                line.stations().len(),
                line.sections().len(),
                line.sections().total_distance()
            ));
            out.push_str(&format!("  {}", path_string(line)));
            Ok(out)
        }
    }
}

/// `A -(5)-> B -(3)-> C`
pub(crate) fn path_string(line: &Line) -> String {
    let sections = line.sections();
    let mut out = sections.head().up_station().name.clone();
    for section in sections.sections() {
        out.push_str(&format!(
            " -({})-> {}",
            section.distance(),
            section.down_station().name
        ));
    }
    out
}
