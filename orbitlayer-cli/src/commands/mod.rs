//! CLI command implementations.

pub mod catalog;
pub mod run;
pub mod track;

use chrono::{DateTime, Utc};

use crate::error::CliError;

/// `--start` as Unix seconds, or now.
pub fn resolve_start(start: Option<i64>) -> Result<DateTime<Utc>, CliError> {
    match start {
        Some(seconds) => DateTime::<Utc>::from_timestamp(seconds, 0)
            .ok_or_else(|| CliError::Config(format!("Start time {} is out of range", seconds))),
        None => Ok(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_start() {
        assert_eq!(resolve_start(Some(0)).unwrap().timestamp(), 0);
        assert!(resolve_start(Some(i64::MAX)).is_err());
    }
}
