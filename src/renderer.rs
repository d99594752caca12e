// src/renderer.rs

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use image::RgbImage;
use indicatif::ProgressBar;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::info;

use crate::colors::ColorRegistry;
use crate::error::ReportError;
use crate::model::{Period, RankingTable, UsageRecord};

/// Fixed panel grid per page: 3 rows by 4 columns, one panel per month.
pub const PANELS_PER_PAGE: usize = 12;
const GRID_ROWS: usize = 3;
const GRID_COLS: usize = 4;

const PAGE_WIDTH: u32 = 1600;
const PAGE_HEIGHT: u32 = 1200;

const PANEL_BACKGROUND: RGBColor = RGBColor(211, 211, 211);

/// One rendered report page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub year: i32,
    /// 1-based page number within the year.
    pub number: usize,
    /// Where the page was persisted, if a save directory was given.
    pub path: Option<PathBuf>,
}

/// Render the ranking table into yearly page grids.
///
/// Months group by calendar year; each year paginates at 12 panels per
/// page, trailing panels staying blank. Bar colors resolve through the
/// registry in panel order, so the first time a name is drawn anywhere in
/// the run fixes its color. Pages are written as JPEG files when
/// `save_dir` is given; write failures abort the run, earlier pages stay
/// on disk.
pub fn render(
    table: &RankingTable,
    registry: &mut ColorRegistry,
    save_dir: Option<&Path>,
) -> Result<Vec<Page>, ReportError> {
    if table.values().all(|entry| entry.is_empty()) {
        info!("no monthly rankings to render");
        return Ok(Vec::new());
    }

    if let Some(dir) = save_dir {
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateOutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let years = group_by_year(table);
    let total_pages: usize = years.values().map(|months| page_count(months.len())).sum();
    let bar = ProgressBar::new(total_pages as u64);
    bar.set_message("Rendering pages");

    let mut pages = Vec::new();
    for (year, months) in &years {
        for (page_idx, chunk) in months.chunks(PANELS_PER_PAGE).enumerate() {
            let number = page_idx + 1;
            let mut buf = vec![0u8; (PAGE_WIDTH * PAGE_HEIGHT * 3) as usize];
            draw_page(&mut buf, *year, chunk, table, registry).map_err(|e| ReportError::Draw {
                page: format!("Year{year}_Page{number}"),
                msg: e.to_string(),
            })?;
            let path = match save_dir {
                Some(dir) => Some(save_page(&buf, dir, *year, number)?),
                None => None,
            };
            pages.push(Page {
                year: *year,
                number,
                path,
            });
            bar.inc(1);
        }
    }
    bar.finish_with_message("Rendering complete");
    Ok(pages)
}

/// Partition the table's months by calendar year, chronological within each.
pub fn group_by_year(table: &RankingTable) -> BTreeMap<i32, Vec<Period>> {
    let mut years: BTreeMap<i32, Vec<Period>> = BTreeMap::new();
    for &period in table.keys() {
        years.entry(period.year()).or_default().push(period);
    }
    years
}

/// Number of pages a year with `months` panels needs.
pub fn page_count(months: usize) -> usize {
    months.div_ceil(PANELS_PER_PAGE)
}

/// Deterministic page file name, keyed by year and page number.
pub fn page_filename(year: i32, page: usize) -> String {
    format!("Year{year}_Page{page}.jpg")
}

fn draw_page(
    buf: &mut [u8],
    year: i32,
    months: &[Period],
    table: &RankingTable,
    registry: &mut ColorRegistry,
) -> Result<()> {
    let root = BitMapBackend::with_buffer(buf, (PAGE_WIDTH, PAGE_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let body = root.titled(&format!("Top Usage - Year {year}"), ("sans-serif", 32))?;
    let panels = body.split_evenly((GRID_ROWS, GRID_COLS));
    // Panels past the last month stay blank; the grid shape never changes.
    for (panel, period) in panels.iter().zip(months.iter()) {
        let entry = table.get(period).map(Vec::as_slice).unwrap_or(&[]);
        draw_panel(panel, *period, entry, registry)?;
    }
    body.present()?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    period: Period,
    entry: &[UsageRecord],
    registry: &mut ColorRegistry,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    if entry.is_empty() {
        let (w, _) = area.dim_in_pixel();
        let style = TextStyle::from(("sans-serif", 16).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        area.draw(&Text::new(
            format!("Top Usage - {period}"),
            (w as i32 / 2, 10),
            style,
        ))?;
        return Ok(());
    }

    // Resolve colors in rank order so first encounters fix assignments.
    let bar_colors: Vec<RGBColor> = entry
        .iter()
        .map(|record| {
            let c = registry.resolve(&record.name);
            RGBColor(c.red, c.green, c.blue)
        })
        .collect();

    let names: Vec<&str> = entry.iter().map(|r| r.name.as_str()).collect();
    let top_share = entry.iter().map(|r| r.usage_perc).fold(0.0f64, f64::max);
    let y_max = top_share.max(1.0) * 1.15;

    let mut chart = ChartBuilder::on(area)
        .caption(format!("Top Usage - {period}"), ("sans-serif", 16))
        .margin(6)
        .x_label_area_size(72)
        .y_label_area_size(42)
        .build_cartesian_2d((0..entry.len()).into_segmented(), 0f64..y_max)?;

    chart.plotting_area().fill(&PANEL_BACKGROUND)?;

    let name_style =
        TextStyle::from(("sans-serif", 12).into_font()).transform(FontTransform::Rotate90);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(entry.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => names.get(*i).copied().unwrap_or("").to_string(),
            _ => String::new(),
        })
        .x_label_style(name_style)
        .y_labels(5)
        .y_desc("Usage %")
        .draw()?;

    chart.draw_series(entry.iter().enumerate().map(|(i, record)| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), record.usage_perc),
            ],
            bar_colors[i].filled(),
        );
        bar.set_margin(0, 0, 3, 3);
        bar
    }))?;

    let value_style = TextStyle::from(("sans-serif", 11).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(entry.iter().enumerate().map(|(i, record)| {
        Text::new(
            format!("{:.1}%", record.usage_perc),
            (SegmentValue::CenterOf(i), record.usage_perc),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

fn save_page(buf: &[u8], dir: &Path, year: i32, page: usize) -> Result<PathBuf, ReportError> {
    let path = dir.join(page_filename(year, page));
    let img = RgbImage::from_raw(PAGE_WIDTH, PAGE_HEIGHT, buf.to_vec()).ok_or_else(|| {
        ReportError::WritePage {
            path: path.clone(),
            msg: "page buffer size mismatch".to_string(),
        }
    })?;
    img.save(&path).map_err(|e| ReportError::WritePage {
        path: path.clone(),
        msg: e.to_string(),
    })?;
    Ok(path)
}
