use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

use crate::fetcher::{FetchOptions, Settle};
use crate::parser::{CategoryBoundary, ExtractOptions};

pub const DEFAULT_URL: &str =
    "https://www.americanexpress.com/us/credit-cards/card/blue-cash-everyday/";
const ENV_PREFIX: &str = "CASHBACK";

/// Defaults, overridden by `CASHBACK_*` environment variables.
/// CLI flags are applied on top in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub settle_secs: u64,
    pub poll: bool,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    pub chrome_path: Option<PathBuf>,
    pub category_boundary: CategoryBoundary,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("url", DEFAULT_URL)?
            .set_default("settle_secs", 5u64)?
            .set_default("poll", false)?
            .set_default("poll_interval_ms", 500u64)?
            .set_default("poll_timeout_secs", 30u64)?
            .set_default("category_boundary", "next-marker")?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn settle(&self) -> Settle {
        if self.poll {
            Settle::Poll {
                interval: Duration::from_millis(self.poll_interval_ms),
                timeout: Duration::from_secs(self.poll_timeout_secs),
            }
        } else {
            Settle::Fixed(Duration::from_secs(self.settle_secs))
        }
    }

    pub fn fetch_options(&self, show_progress: bool) -> FetchOptions {
        FetchOptions {
            settle: self.settle(),
            chrome_path: self.chrome_path.clone(),
            show_progress,
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            boundary: self.category_boundary,
        }
    }
}

// ── Tests ──
