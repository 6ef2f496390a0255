// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the session layer. Configuration is loaded from the environment once,
//! when the embedding application builds its [`SessionConfig`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NAVIGATION_COOLDOWN_MS` | Window during which a second role selection is ignored | `2000` |
//! | `ACTOR_RETRY_DELAY_MS` | Delay between polls for a not-yet-ready actor handle | `500` |
//! | `ACTOR_RETRY_LIMIT` | Polls before giving up on an actor handle | `20` |
//! | `ACTOR_GATEWAY_URL` | Base URL of the HTTPS actor gateway | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::env;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::logging::LogFormat;

/// Environment variable name for the role-selection navigation cool-down.
pub const NAVIGATION_COOLDOWN_ENV: &str = "NAVIGATION_COOLDOWN_MS";

/// Environment variable name for the actor readiness poll delay.
pub const ACTOR_RETRY_DELAY_ENV: &str = "ACTOR_RETRY_DELAY_MS";

/// Environment variable name for the actor readiness poll limit.
pub const ACTOR_RETRY_LIMIT_ENV: &str = "ACTOR_RETRY_LIMIT";

/// Environment variable name for the actor gateway base URL.
///
/// When unset, the embedding application must supply its own
/// [`IdentityBridge`](crate::identity::IdentityBridge) actor handles.
pub const ACTOR_GATEWAY_URL_ENV: &str = "ACTOR_GATEWAY_URL";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default navigation cool-down (2 seconds).
pub const DEFAULT_NAVIGATION_COOLDOWN: Duration = Duration::from_millis(2000);

/// Default delay between actor readiness polls.
pub const DEFAULT_ACTOR_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Default number of actor readiness polls.
pub const DEFAULT_ACTOR_RETRY_LIMIT: u32 = 20;

/// Session layer configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a role-selection navigation blocks a repeated one.
    pub navigation_cooldown: Duration,
    /// Delay between polls while the bridge has no actor handle yet.
    pub actor_retry_delay: Duration,
    /// Polls before [`SessionError::ActorUnavailable`](crate::error::SessionError::ActorUnavailable).
    pub actor_retry_limit: u32,
    /// Base URL of the HTTPS actor gateway, if one is deployed.
    pub gateway_url: Option<Url>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            navigation_cooldown: DEFAULT_NAVIGATION_COOLDOWN,
            actor_retry_delay: DEFAULT_ACTOR_RETRY_DELAY,
            actor_retry_limit: DEFAULT_ACTOR_RETRY_LIMIT,
            gateway_url: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl SessionConfig {
    /// Load configuration from the process environment.
    ///
    /// Malformed values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let navigation_cooldown = parse_or(&lookup, NAVIGATION_COOLDOWN_ENV)
            .map(Duration::from_millis)
            .unwrap_or(defaults.navigation_cooldown);

        let actor_retry_delay = parse_or(&lookup, ACTOR_RETRY_DELAY_ENV)
            .map(Duration::from_millis)
            .unwrap_or(defaults.actor_retry_delay);

        let actor_retry_limit = parse_or(&lookup, ACTOR_RETRY_LIMIT_ENV)
            .unwrap_or(defaults.actor_retry_limit);

        let gateway_url = lookup(ACTOR_GATEWAY_URL_ENV).and_then(|raw| match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(variable = ACTOR_GATEWAY_URL_ENV, error = %e, "Ignoring invalid gateway URL");
                None
            }
        });

        let log_format = lookup(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::from_str(&raw))
            .unwrap_or(defaults.log_format);

        Self {
            navigation_cooldown,
            actor_retry_delay,
            actor_retry_limit,
            gateway_url,
            log_format,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = key, value = %raw, "Ignoring malformed configuration value");
            None
        }
    }
}
