// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Log output format, selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parse a format name (case-insensitive). Unknown names map to `Pretty`.
    pub fn from_str(s: &str) -> LogFormat {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Install the global tracing subscriber.
///
/// Returns an error if a global subscriber is already installed, which the
/// embedding application may ignore in tests.
pub fn init_tracing(
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());

    match format {
        LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
    }
}

/// Filter from `RUST_LOG`-style directives, `info` when unset or invalid.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_parses_correctly() {
        assert_eq!(LogFormat::from_str("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("xml"), LogFormat::Pretty);
    }

    #[test]
    fn filter_falls_back_to_info() {
        assert_eq!(filter_from(None).to_string(), "info");
        assert_eq!(
            filter_from(Some("tradehub_session=debug")).to_string(),
            "tradehub_session=debug"
        );
    }
}
