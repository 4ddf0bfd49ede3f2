use std::collections::hash_map::DefaultHasher;
use std::ffi::OsStr;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use headless_chrome::{Browser, LaunchOptions, Tab};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::text::flatten_html;

pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);
/// Extra headroom over the settle wait before Chrome's transport is considered idle.
const IDLE_HEADROOM: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to launch headless browser: {0}")]
    Launch(String),
    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },
    #[error("{url} was still changing after {waited:.1?}")]
    Unsettled { url: String, waited: Duration },
    #[error("failed to read rendered content of {url}: {reason}")]
    Content { url: String, reason: String },
}

/// How long to let client-side rendering run before reading the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    /// Sleep once, then read.
    Fixed(Duration),
    /// Re-read every `interval` until two reads match, failing after `timeout`.
    Poll { interval: Duration, timeout: Duration },
}

impl Settle {
    fn longest_wait(&self) -> Duration {
        match *self {
            Settle::Fixed(delay) => delay,
            Settle::Poll { interval, timeout } => timeout + interval,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub settle: Settle,
    /// Chrome binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        FetchOptions {
            settle: Settle::Fixed(DEFAULT_SETTLE),
            chrome_path: None,
            show_progress: true,
        }
    }
}

/// Render `url` in headless Chrome and return its flattened visible text.
pub fn fetch_page_text(url: &str, opts: &FetchOptions) -> Result<String, FetchError> {
    let started = Instant::now();
    let html = fetch_rendered_html(url, opts)?;
    let text = flatten_html(&html);
    info!(
        "Fetched {} ({} bytes markup, {} chars text) in {:.1}s",
        url,
        html.len(),
        text.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(text)
}

/// Chrome is killed when `browser` drops, on every return path.
fn fetch_rendered_html(url: &str, opts: &FetchOptions) -> Result<String, FetchError> {
    let launch_options = LaunchOptions::default_builder()
        .headless(true)
        .sandbox(false)
        .path(opts.chrome_path.clone())
        .args(vec![
            OsStr::new("--disable-gpu"),
            OsStr::new("--disable-dev-shm-usage"),
        ])
        .idle_browser_timeout(opts.settle.longest_wait() + IDLE_HEADROOM)
        .build()
        .map_err(|e| FetchError::Launch(e.to_string()))?;

    info!("Launching headless browser");
    let browser = Browser::new(launch_options).map_err(|e| FetchError::Launch(e.to_string()))?;
    let tab = browser
        .new_tab()
        .map_err(|e| FetchError::Launch(e.to_string()))?;
    tab.set_default_timeout(NAVIGATION_TIMEOUT);

    info!("Navigating to {}", url);
    tab.navigate_to(url)
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| FetchError::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let pb = spinner(opts.show_progress);
    let result = match opts.settle {
        Settle::Fixed(delay) => {
            pb.set_message(format!("waiting {:.1}s for client-side rendering", delay.as_secs_f64()));
            std::thread::sleep(delay);
            read_content(&tab, url)
        }
        Settle::Poll { interval, timeout } => poll_until_settled(&tab, url, interval, timeout, &pb),
    };
    pb.finish_and_clear();

    result
}

fn poll_until_settled(
    tab: &Tab,
    url: &str,
    interval: Duration,
    timeout: Duration,
    pb: &ProgressBar,
) -> Result<String, FetchError> {
    let started = Instant::now();
    let mut previous: Option<Snapshot> = None;
    let mut polls = 0u32;

    loop {
        std::thread::sleep(interval);
        let html = read_content(tab, url)?;
        let current = Snapshot::of(&html);
        polls += 1;
        pb.set_message(format!("poll {} ({} bytes)", polls, current.len));

        if previous == Some(current) {
            debug!(polls, bytes = current.len, "page content settled");
            return Ok(html);
        }

        let waited = started.elapsed();
        if waited >= timeout {
            warn!("{} still changing after {} polls", url, polls);
            return Err(FetchError::Unsettled {
                url: url.to_string(),
                waited,
            });
        }
        previous = Some(current);
    }
}

fn read_content(tab: &Tab, url: &str) -> Result<String, FetchError> {
    tab.get_content().map_err(|e| FetchError::Content {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn spinner(visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Size plus digest of one markup read; two equal snapshots in a row mean
/// the DOM stopped changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot {
    len: usize,
    digest: u64,
}

impl Snapshot {
    fn of(html: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        html.hash(&mut hasher);
        Snapshot {
            len: html.len(),
            digest: hasher.finish(),
        }
    }
}

// ── Tests ──
