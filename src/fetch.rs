// src/fetch.rs

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use indicatif::ProgressBar;
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::model::Period;

const STATS_BASE: &str = "https://www.smogon.com/stats/";

/// Downloads raw monthly stat files from the Smogon archive.
///
/// The archive has holes (formats come and go, months are missing), so a
/// file the server does not have is skipped with a warning and the walk
/// continues.
pub struct StatsFetcher {
    client: Client,
    root: PathBuf,
    form_rank: String,
}

impl StatsFetcher {
    pub fn new(root: impl Into<PathBuf>, form_rank: impl Into<String>) -> Result<Self, ReportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("usage-charts/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            root: root.into(),
            form_rank: form_rank.into(),
        })
    }

    /// Fetch the usage, moveset, and leads files for every month in the
    /// inclusive range.
    pub fn fetch_range(&self, start: Period, end: Period) -> Result<(), ReportError> {
        let periods: Vec<Period> = start.range_inclusive(end).collect();
        let bar = ProgressBar::new(periods.len() as u64);
        bar.set_message("Downloading stats");

        for period in periods {
            info!("processing files for {}", period.long_label());
            let dir = self.root.join(period.to_string());
            fs::create_dir_all(&dir).map_err(|source| ReportError::WriteFile {
                path: dir.clone(),
                source,
            })?;
            for (url, filename) in month_urls(&self.form_rank, period) {
                self.fetch_one(&url, dir.join(filename));
            }
            bar.inc(1);
        }
        bar.finish_with_message("Downloads complete");
        Ok(())
    }

    fn fetch_one(&self, url: &str, dest: PathBuf) {
        match self.client.get(url).send() {
            Ok(resp) if resp.status().is_success() => match resp.bytes() {
                Ok(body) => {
                    if let Err(e) = fs::write(&dest, &body) {
                        warn!(url, path = %dest.display(), error = %e, "could not save downloaded file");
                    }
                }
                Err(e) => warn!(url, error = %e, "failed reading response body"),
            },
            Ok(resp) => warn!(url, status = %resp.status(), "archive has no file for this month"),
            Err(e) => warn!(url, error = %e, "request failed"),
        }
    }
}

/// The three archive files for one month, as (url, local filename) pairs.
fn month_urls(form_rank: &str, period: Period) -> [(String, &'static str); 3] {
    [
        (
            format!("{STATS_BASE}{period}/{form_rank}.txt"),
            "usage.txt",
        ),
        (
            format!("{STATS_BASE}{period}/moveset/{form_rank}.txt"),
            "moveset.txt",
        ),
        (
            format!("{STATS_BASE}{period}/leads/{form_rank}.txt"),
            "leads.txt",
        ),
    ]
}
