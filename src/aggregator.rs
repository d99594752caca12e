// src/aggregator.rs

use std::cmp::Ordering;
use std::collections::BTreeMap;

use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;

use crate::model::{AppearanceTally, Period, RankingTable};
use crate::store::SnapshotStore;

/// Build the month-by-month top-N table for an inclusive period range.
///
/// Every month in the range gets a key, empty when no snapshot exists, so
/// downstream consumers see a uniform chronology. Months load in parallel;
/// the table is keyed chronologically regardless of load order.
pub fn build_ranking_table(
    store: &SnapshotStore,
    start: Period,
    end: Period,
    top_n: usize,
) -> RankingTable {
    let periods: Vec<Period> = start.range_inclusive(end).collect();

    let bar = ProgressBar::new(periods.len() as u64);
    bar.set_message("Loading monthly snapshots");

    periods
        .into_par_iter()
        .progress_with(bar)
        .map(|period| {
            let mut records = store.load(period);
            // Stable sort: equal shares keep document order.
            records.sort_by(|a, b| {
                b.usage_perc
                    .partial_cmp(&a.usage_perc)
                    .unwrap_or(Ordering::Equal)
            });
            records.truncate(top_n);
            (period, records)
        })
        .collect::<BTreeMap<_, _>>()
}

/// Count, per entity, the months in which it placed in the top N.
///
/// Entities that never ranked are absent rather than carried with a zero.
pub fn tally_appearances(table: &RankingTable) -> AppearanceTally {
    let mut tally = AppearanceTally::new();
    for entry in table.values() {
        for record in entry {
            *tally.entry(record.name.clone()).or_insert(0) += 1;
        }
    }
    tally
}

/// Appearance counts ordered for display: most frequent first, ties by name.
pub fn top_entities_by_appearance(tally: &AppearanceTally) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = tally.iter().map(|(n, &c)| (n.clone(), c)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
