// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

use crate::model::Period;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// First month of the report range (YYYY-MM)
    #[arg(long)]
    pub start: Period,

    /// Last month of the report range, inclusive (YYYY-MM)
    #[arg(long)]
    pub end: Period,

    /// Battle format to report on (gen1ou, gen9uu, ...)
    #[arg(long)]
    pub format: String,

    /// Rating cutoff of the stats files (0, 1500, 1630, 1760; top-gen OU
    /// uses 1695 and 1825 instead)
    #[arg(long, default_value_t = 0)]
    pub rating: u32,

    /// How many entries each monthly chart shows
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Download the raw stat files for the range before reporting
    #[arg(long)]
    pub download: bool,

    /// Rebuild the canonical usage documents from the raw files
    #[arg(long)]
    pub normalize: bool,

    /// Directory holding the per-month stats tree [default: <format>-<rating>]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory to save the rendered pages [default: <format>-<rating>-graph]
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Render pages without writing them to disk
    #[arg(long)]
    pub no_save: bool,

    /// JSON palette file reused and grown across runs
    #[arg(long)]
    pub palette: Option<PathBuf>,
}

impl Args {
    /// The `<format>-<rating>` prefix the archive keys its files on.
    pub fn form_rank(&self) -> String {
        format!("{}-{}", self.format, self.rating)
    }

    pub fn stats_root(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.form_rank()))
    }

    pub fn graph_dir(&self) -> Option<PathBuf> {
        if self.no_save {
            return None;
        }
        Some(
            self.save_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}-graph", self.form_rank()))),
        )
    }
}
