use std::cmp::Ordering;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::runtime::AppEvent;

const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/martintrojer/mathdash/releases/latest";
pub const RELEASES_PAGE: &str = "https://github.com/martintrojer/mathdash/releases";
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Version string of a build without a release tag
pub const DEV_VERSION: &str = "dev";

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("could not reach the release server: {0}")]
    Http(#[from] reqwest::Error),
    #[error("release server answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed release data: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    pub current: String,
    pub latest: String,
    pub url: String,
}

impl UpdateInfo {
    pub fn is_available(&self) -> bool {
        is_newer_version(&self.latest, &self.current)
    }
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    html_url: String,
}

/// Compare dotted versions, ignoring a leading `v`. Numeric components compare
/// as numbers, anything else lexically. On an equal prefix the longer version
/// is newer. `dev` builds are never behind.
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    if current == DEV_VERSION || latest == DEV_VERSION {
        return false;
    }
    let latest: Vec<&str> = latest.strip_prefix('v').unwrap_or(latest).split('.').collect();
    let current: Vec<&str> = current
        .strip_prefix('v')
        .unwrap_or(current)
        .split('.')
        .collect();

    for (l, c) in latest.iter().zip(&current) {
        let ordering = match (l.parse::<u64>(), c.parse::<u64>()) {
            (Ok(l), Ok(c)) => l.cmp(&c),
            _ => l.cmp(c),
        };
        if ordering != Ordering::Equal {
            return ordering == Ordering::Greater;
        }
    }
    latest.len() > current.len()
}

/// Ask the release server for the latest version. `Ok(None)` means the
/// project has no releases yet.
pub fn check(current: &str) -> Result<Option<UpdateInfo>, UpdateError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(CHECK_TIMEOUT)
        .user_agent(concat!("mathdash/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let response = client
        .get(LATEST_RELEASE_URL)
        .header("Accept", "application/vnd.github+json")
        .send()?;

    match response.status() {
        reqwest::StatusCode::NOT_FOUND => return Ok(None),
        status if !status.is_success() => return Err(UpdateError::Status(status)),
        _ => {}
    }

    let release: Release = response
        .json()
        .map_err(|err| UpdateError::Parse(err.to_string()))?;
    if release.tag_name.trim().is_empty() {
        return Err(UpdateError::Parse("release has no tag".into()));
    }

    Ok(Some(UpdateInfo {
        current: current.to_string(),
        latest: release.tag_name,
        url: release.html_url,
    }))
}

/// Run [`check`] on its own thread and post the outcome to the event loop.
/// Failures are logged and reported as no information.
pub fn spawn_background_check(current: String, tx: Sender<AppEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let info = match check(&current) {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!("update check failed: {err}");
                None
            }
        };
        // the loop may already be gone
        let _ = tx.send(AppEvent::UpdateChecked(info));
    })
}

/// Text printed by the `update` command
pub fn report(current: &str, outcome: &Result<Option<UpdateInfo>, UpdateError>) -> String {
    match outcome {
        _ if current == DEV_VERSION => format!(
            "Running a development build; version comparison is not possible.\nReleases: {RELEASES_PAGE}"
        ),
        Ok(None) => format!("No releases published yet (current version {current})."),
        Ok(Some(info)) if info.is_available() => format!(
            "Update available: {} -> {}\nDownload: {}",
            info.current, info.latest, info.url
        ),
        Ok(Some(info)) => format!("mathdash {} is up to date.", info.current),
        Err(err) => format!(
            "Update check failed: {err}\nDownload the latest release manually from {RELEASES_PAGE}"
        ),
    }
}
