//! Two-line interchange record synthesis.
//!
//! The propagator only accepts the fixed-column two-line element format, so
//! each [`CompactRecord`] is rendered into a pair of 69-character lines:
//!
//! ```text
//! 1 NNNNNU 00000A   YYDDD.DDDDDDDD  .00000000  00000-0  00000-0 0  999C
//! 2 NNNNN III.IIII RRR.RRRR EEEEEEE AAA.AAAA MMM.MMMM NN.NNNNNNNN00001C
//! ```
//!
//! Mean motion derivatives and the drag term are not recoverable from a
//! compact record and are written as zero placeholders. Over the short
//! horizons a live view covers, drag has no visible effect.

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::EphemerisError;
use crate::catalog::CompactRecord;

/// Length of one interchange line including the checksum column.
pub const LINE_LENGTH: usize = 69;

/// Largest catalog number the 5-digit field can hold.
pub const MAX_CATALOG_NUMBER: i64 = 99_999;

/// Neutral drag placeholder (`0.00000e-0`).
const NEUTRAL_DRAG: &str = "00000-0";

/// Epoch years the two-digit year field can express (57..=99 → 19xx, 00..=56 → 20xx).
const MIN_EPOCH_YEAR: i32 = 1957;
const MAX_EPOCH_YEAR: i32 = 2056;

/// Upper bound on mean motion accepted for a record (rev/day).
const MAX_MEAN_MOTION: f64 = 100.0;

/// A synthesized pair of interchange lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterchangeRecord {
    pub line1: String,
    pub line2: String,
}

/// Epoch split into the interchange format's year and day fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochFields {
    /// Two-digit year.
    pub year: u32,
    /// Fractional day of year, where Jan 1 00:00 UTC is `1.0`.
    pub day_of_year: f64,
}

impl EpochFields {
    /// Derive the epoch fields from UTC seconds since the Unix epoch.
    pub fn from_unix_seconds(epoch_unix_seconds: f64) -> Result<Self, EphemerisError> {
        let datetime = unix_seconds_to_datetime(epoch_unix_seconds)
            .ok_or(EphemerisError::InvalidEpoch(epoch_unix_seconds))?;

        let year = datetime.year();
        if !(MIN_EPOCH_YEAR..=MAX_EPOCH_YEAR).contains(&year) {
            return Err(EphemerisError::InvalidEpoch(epoch_unix_seconds));
        }

        let seconds_of_day = datetime.num_seconds_from_midnight() as f64
            + datetime.nanosecond() as f64 / 1e9;

        Ok(Self {
            year: (year % 100) as u32,
            day_of_year: datetime.ordinal() as f64 + seconds_of_day / 86_400.0,
        })
    }
}

fn unix_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9) as u32).min(999_999_999);
    DateTime::<Utc>::from_timestamp(whole as i64, nanos)
}

/// Render a compact record as an interchange line pair.
///
/// Fails when a field is non-finite, outside its physical range, or too
/// wide for its fixed column.
pub fn format_record(record: &CompactRecord) -> Result<InterchangeRecord, EphemerisError> {
    validate(record)?;

    let epoch = EpochFields::from_unix_seconds(record.epoch_unix_seconds)?;
    let id = record.id;

    let day = fixed("epoch day", epoch.day_of_year, 12, 8, true)?;
    let body1 = format!(
        "1 {id:05}U 00000A   {year:02}{day}  .00000000  {drag}  {drag} 0  999",
        year = epoch.year,
        drag = NEUTRAL_DRAG,
    );

    let body2 = format!(
        "2 {id:05} {inc} {raan} {ecc} {argp} {ma} {mm}00001",
        inc = fixed("inclination", record.inclination_deg, 8, 4, false)?,
        raan = fixed("raan", record.raan_deg, 8, 4, false)?,
        ecc = eccentricity_mantissa(record.eccentricity)?,
        argp = fixed("argument of perigee", record.arg_perigee_deg, 8, 4, false)?,
        ma = fixed("mean anomaly", record.mean_anomaly_deg, 8, 4, false)?,
        mm = fixed("mean motion", record.mean_motion_rev_per_day, 11, 8, false)?,
    );

    Ok(InterchangeRecord {
        line1: with_checksum(body1)?,
        line2: with_checksum(body2)?,
    })
}

fn validate(record: &CompactRecord) -> Result<(), EphemerisError> {
    if !(0..=MAX_CATALOG_NUMBER).contains(&record.id) {
        return Err(EphemerisError::InvalidId(record.id));
    }

    let checks: [(&'static str, f64, f64, f64); 6] = [
        ("inclination", record.inclination_deg, 0.0, 180.0),
        ("raan", record.raan_deg, 0.0, 360.0),
        ("eccentricity", record.eccentricity, 0.0, 1.0),
        ("argument of perigee", record.arg_perigee_deg, 0.0, 360.0),
        ("mean anomaly", record.mean_anomaly_deg, 0.0, 360.0),
        ("mean motion", record.mean_motion_rev_per_day, 0.0, MAX_MEAN_MOTION),
    ];

    for (field, value, min, max) in checks {
        if !value.is_finite() {
            return Err(EphemerisError::NonFinite { field });
        }
        if value < min || value > max {
            return Err(EphemerisError::OutOfRange { field, value });
        }
    }

    // Open upper/lower bounds the table above treats as closed
    if record.eccentricity >= 1.0 {
        return Err(EphemerisError::OutOfRange {
            field: "eccentricity",
            value: record.eccentricity,
        });
    }
    if record.mean_motion_rev_per_day <= 0.0 {
        return Err(EphemerisError::OutOfRange {
            field: "mean motion",
            value: record.mean_motion_rev_per_day,
        });
    }

    Ok(())
}

/// Render `value` right-aligned into `width` columns with `precision` decimals.
fn fixed(
    field: &'static str,
    value: f64,
    width: usize,
    precision: usize,
    zero_pad: bool,
) -> Result<String, EphemerisError> {
    let rendered = if zero_pad {
        format!("{:0width$.precision$}", value)
    } else {
        format!("{:>width$.precision$}", value)
    };

    if rendered.len() > width {
        return Err(EphemerisError::FieldOverflow {
            field,
            rendered,
            width,
        });
    }
    Ok(rendered)
}

/// Eccentricity with an implied leading decimal point: `0.0006703` → `0006703`.
fn eccentricity_mantissa(eccentricity: f64) -> Result<String, EphemerisError> {
    let mantissa = (eccentricity * 1e7).round() as u64;
    let rendered = format!("{:07}", mantissa);
    if rendered.len() > 7 {
        return Err(EphemerisError::FieldOverflow {
            field: "eccentricity",
            rendered,
            width: 7,
        });
    }
    Ok(rendered)
}

/// Modulo-10 checksum: digits count their value, `-` counts one.
pub fn checksum(line: &str) -> u32 {
    line.chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum::<u32>()
        % 10
}

fn with_checksum(body: String) -> Result<String, EphemerisError> {
    if body.len() != LINE_LENGTH - 1 {
        return Err(EphemerisError::MalformedLine {
            length: body.len(),
        });
    }
    let sum = checksum(&body);
    Ok(format!("{}{}", body, sum))
}
