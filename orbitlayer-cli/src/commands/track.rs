//! Track command - print one orbital period of an object.

use std::path::PathBuf;
use std::sync::Arc;

use orbitlayer::ephemeris::Sgp4Propagator;
use orbitlayer::track::OrbitTracker;

use super::catalog::lookup;
use super::resolve_start;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the track command.
pub struct TrackArgs {
    pub catalog: Option<PathBuf>,
    pub slot: usize,
    pub samples: usize,
    pub start: Option<i64>,
}

/// Run the track command.
pub fn run(runner: &CliRunner, args: TrackArgs) -> Result<(), CliError> {
    let catalog = runner.load_catalog(args.catalog)?;
    let record = lookup(&catalog, args.slot)?;
    let start = resolve_start(args.start)?;

    let tracker = OrbitTracker::new(Arc::new(Sgp4Propagator::new()));
    let summary = tracker.summary(record, start);
    let points = tracker.orbit_path(record, start, args.samples);

    println!("{} ({})", summary.name, summary.id);
    if let Some(period) = summary.period_minutes {
        println!("Orbital period: {:.1} min", period);
    }
    if let Some(speed) = summary.speed_km_s {
        println!("Speed:          {:.3} km/s", speed);
    }
    println!();

    if points.is_empty() {
        return Err(CliError::NotFound(format!(
            "no propagated positions for {} (invalid elements)",
            record.name
        )));
    }

    println!("{:<20} {:>9} {:>10} {:>10}", "UTC", "lat", "lon", "alt km");
    for point in &points {
        println!(
            "{:<20} {:>9.3} {:>10.3} {:>10.1}",
            point.instant.format("%Y-%m-%d %H:%M:%S"),
            point.geodetic.latitude_deg,
            point.geodetic.longitude_deg,
            point.geodetic.altitude_km
        );
    }
    Ok(())
}
