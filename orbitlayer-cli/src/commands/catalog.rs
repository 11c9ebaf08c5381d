//! Catalog inspection commands: `search` and `tle`.

use std::path::PathBuf;

use orbitlayer::catalog::{Catalog, CompactRecord};
use orbitlayer::ephemeris::format_record;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the search command.
pub fn run_search(runner: &CliRunner, catalog: Option<PathBuf>, query: &str) -> Result<(), CliError> {
    let catalog = runner.load_catalog(catalog)?;
    let slot = catalog
        .search_by_id_or_name(query)
        .ok_or_else(|| CliError::NotFound(format!("no object matches '{}'", query)))?;

    // lookup cannot fail for a slot returned by search
    if let Some(record) = catalog.lookup(slot) {
        print_record(slot, record);
    }
    Ok(())
}

/// Run the tle command.
pub fn run_tle(runner: &CliRunner, catalog: Option<PathBuf>, slot: usize) -> Result<(), CliError> {
    let catalog = runner.load_catalog(catalog)?;
    let record = lookup(&catalog, slot)?;
    let lines = format_record(record)?;

    println!("{}", record.name);
    println!("{}", lines.line1);
    println!("{}", lines.line2);
    Ok(())
}

pub(crate) fn lookup(catalog: &Catalog, slot: usize) -> Result<&CompactRecord, CliError> {
    catalog.lookup(slot).ok_or_else(|| {
        CliError::NotFound(format!(
            "slot {} (catalog has {} objects)",
            slot,
            catalog.len()
        ))
    })
}

fn print_record(slot: usize, record: &CompactRecord) {
    println!("Slot:          {}", slot);
    println!("Catalog no.:   {}", record.id);
    println!("Name:          {}", record.name);
    println!("Epoch (unix):  {:.3}", record.epoch_unix_seconds);
    println!("Inclination:   {:.4}°", record.inclination_deg);
    println!("RAAN:          {:.4}°", record.raan_deg);
    println!("Eccentricity:  {:.7}", record.eccentricity);
    println!("Arg. perigee:  {:.4}°", record.arg_perigee_deg);
    println!("Mean anomaly:  {:.4}°", record.mean_anomaly_deg);
    println!("Mean motion:   {:.8} rev/day", record.mean_motion_rev_per_day);
    match record.period_minutes() {
        Some(period) => println!("Period:        {:.1} min", period),
        None => println!("Period:        (undefined)"),
    }
}
