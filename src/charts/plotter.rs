//! Trend Plotter Module
//! Renders monthly arrival trends as static line charts with plotters.
//!
//! Layout:
//! 1. Title across the top
//! 2. One facet per year, stacked vertically; x = month, y = arrivals
//! 3. One line per country, colors shared across facets
//! 4. Legend titled "Country" in a bordered column on the right

use crate::data::{Month, TrendAggregate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No trend data to plot")]
    Empty,
    #[error("Chart rendering failed: {0}")]
    Render(String),
    #[error("Could not open chart: {0}")]
    Open(#[from] std::io::Error),
}

/// Color palette for countries
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),  // Blue
    RGBColor(231, 76, 60),   // Red
    RGBColor(46, 204, 113),  // Green
    RGBColor(155, 89, 182),  // Purple
    RGBColor(243, 156, 18),  // Orange
    RGBColor(26, 188, 156),  // Teal
    RGBColor(233, 30, 99),   // Pink
    RGBColor(0, 188, 212),   // Cyan
    RGBColor(121, 85, 72),   // Brown
    RGBColor(96, 125, 139),  // Blue Grey
];

const LEGEND_WIDTH: u32 = 220;
const LEGEND_ROW_H: i32 = 18;
const LEGEND_MIN_ROW_H: i32 = 11;
const LEGEND_MAX_COLUMNS: usize = 2;
// Title and border padding above and below the entries
const LEGEND_CHROME_H: i32 = 70;

/// How legend entries are packed into the legend column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LegendLayout {
    row_h: i32,
    rows: usize,
    columns: usize,
    /// Entries drawn; the rest are summarized by a "+N more" line.
    shown: usize,
}

impl LegendLayout {
    /// Shrink rows first, then add a column, then truncate.
    fn fit(height: i32, count: usize) -> Self {
        let avail = (height - LEGEND_CHROME_H).max(0);
        for columns in 1..=LEGEND_MAX_COLUMNS {
            let rows = count.div_ceil(columns);
            let row_h = if rows == 0 {
                LEGEND_ROW_H
            } else {
                (avail / rows as i32).min(LEGEND_ROW_H)
            };
            if row_h >= LEGEND_MIN_ROW_H {
                return Self {
                    row_h,
                    rows,
                    columns,
                    shown: count,
                };
            }
        }

        let rows = (avail / LEGEND_MIN_ROW_H) as usize;
        let capacity = rows * LEGEND_MAX_COLUMNS;
        Self {
            row_h: LEGEND_MIN_ROW_H,
            rows,
            columns: LEGEND_MAX_COLUMNS,
            // last slot holds the "+N more" line
            shown: capacity.saturating_sub(1).min(count),
        }
    }

    fn slot(&self, index: usize) -> (usize, usize) {
        (index / self.rows.max(1), index % self.rows.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: "Monthly Tourist Arrivals by Country".to_string(),
            x_label: "Month".to_string(),
            y_label: "Arrivals".to_string(),
            width: 1400,
            height: 900,
        }
    }
}

/// One country's line within a year facet, in calendar order.
#[derive(Debug, Clone, PartialEq)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<(Month, f64)>,
}

pub struct TrendPlotter;

impl TrendPlotter {
    /// Get color for a country by its index in the sorted country list.
    pub fn get_country_color(index: usize) -> RGBColor {
        PALETTE[index % PALETTE.len()]
    }

    /// Group the trend into year facets, each holding per-country series.
    pub fn series_by_year(trend: &TrendAggregate) -> BTreeMap<i32, Vec<CountrySeries>> {
        let mut facets: BTreeMap<i32, BTreeMap<&str, Vec<(Month, f64)>>> = BTreeMap::new();
        for row in trend.rows() {
            facets
                .entry(row.year)
                .or_default()
                .entry(row.country.as_str())
                .or_default()
                .push((row.month, row.arrivals));
        }

        facets
            .into_iter()
            .map(|(year, countries)| {
                let series = countries
                    .into_iter()
                    .map(|(country, mut points)| {
                        points.sort_by_key(|(m, _)| *m);
                        CountrySeries {
                            country: country.to_string(),
                            points,
                        }
                    })
                    .collect();
                (year, series)
            })
            .collect()
    }

    /// Render the trend to `output`; `.svg` selects SVG, anything else PNG.
    pub fn plot_trend(
        trend: &TrendAggregate,
        options: &PlotOptions,
        output: &Path,
    ) -> Result<(), ChartError> {
        if trend.is_empty() {
            return Err(ChartError::Empty);
        }

        let facets = Self::series_by_year(trend);
        let countries = trend.countries();
        let size = (options.width, options.height);

        let is_svg = output
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if is_svg {
            let root = SVGBackend::new(output, size).into_drawing_area();
            Self::draw(&root, &facets, &countries, options)?;
            root.present().map_err(render_err)?;
        } else {
            let root = BitMapBackend::new(output, size).into_drawing_area();
            Self::draw(&root, &facets, &countries, options)?;
            root.present().map_err(render_err)?;
        }

        info!(
            path = %output.display(),
            years = facets.len(),
            countries = countries.len(),
            "Chart rendered"
        );
        Ok(())
    }

    /// Open a rendered chart with the system viewer.
    pub fn show(path: &Path) -> Result<(), ChartError> {
        open::that(path)?;
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        facets: &BTreeMap<i32, Vec<CountrySeries>>,
        countries: &[String],
        options: &PlotOptions,
    ) -> Result<(), ChartError> {
        root.fill(&WHITE).map_err(render_err)?;

        let (width, _) = root.dim_in_pixel();
        let (plot_area, legend_area) =
            root.split_horizontally(width.saturating_sub(LEGEND_WIDTH) as i32);
        let plot_area = plot_area
            .titled(&options.title, ("sans-serif", 24))
            .map_err(render_err)?;

        let color_index: BTreeMap<&str, usize> = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();

        let areas = plot_area.split_evenly((facets.len(), 1));
        for (area, (year, series)) in areas.iter().zip(facets.iter()) {
            let y_max = series
                .iter()
                .flat_map(|s| s.points.iter().map(|(_, v)| *v))
                .fold(0.0_f64, f64::max);
            // Auto-scale with headroom; a flat zero facet still needs a range
            let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

            let mut chart = ChartBuilder::on(area)
                .caption(format!("Year = {year}"), ("sans-serif", 16))
                .margin(10)
                .x_label_area_size(35)
                .y_label_area_size(80)
                .build_cartesian_2d(0f64..11f64, 0f64..y_max)
                .map_err(render_err)?;

            chart
                .configure_mesh()
                .x_labels(12)
                .x_label_formatter(&|x| month_label(*x))
                .y_label_formatter(&|y| format!("{y:.0}"))
                .x_desc(options.x_label.as_str())
                .y_desc(options.y_label.as_str())
                .draw()
                .map_err(render_err)?;

            for s in series {
                let index = color_index.get(s.country.as_str()).copied().unwrap_or(0);
                let color = Self::get_country_color(index);
                chart
                    .draw_series(LineSeries::new(
                        s.points.iter().map(|(m, v)| (m.index() as f64, *v)),
                        color.stroke_width(2),
                    ))
                    .map_err(render_err)?;
            }
        }

        Self::draw_legend(&legend_area, countries)
    }

    fn draw_legend<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        countries: &[String],
    ) -> Result<(), ChartError> {
        let (w, h) = area.dim_in_pixel();
        let (w, h) = (w as i32, h as i32);

        area.draw(&Rectangle::new([(4, 30), (w - 6, h - 10)], BLACK))
            .map_err(render_err)?;
        area.draw(&Text::new("Country", (12, 36), ("sans-serif", 16).into_font()))
            .map_err(render_err)?;

        let layout = LegendLayout::fit(h, countries.len());
        let col_w = (w - 16) / layout.columns as i32;
        let font = ("sans-serif", (layout.row_h - 4).clamp(9, 12)).into_font();
        let anchor = |index: usize| {
            let (col, row) = layout.slot(index);
            (12 + col as i32 * col_w, 64 + row as i32 * layout.row_h)
        };

        for (i, country) in countries.iter().take(layout.shown).enumerate() {
            let (x, y) = anchor(i);
            let color = Self::get_country_color(i);
            let half = (layout.row_h / 2 - 2).max(3);
            area.draw(&Rectangle::new(
                [(x, y - half), (x + 2 * half, y + half)],
                color.filled(),
            ))
            .map_err(render_err)?;
            area.draw(&Text::new(
                country.as_str(),
                (x + 2 * half + 6, y - half - 1),
                font.clone(),
            ))
            .map_err(render_err)?;
        }

        let hidden = countries.len() - layout.shown;
        if hidden > 0 {
            let (x, y) = anchor(layout.shown);
            area.draw(&Text::new(format!("+{hidden} more"), (x, y - 6), font))
                .map_err(render_err)?;
        }

        Ok(())
    }
}

/// Tick label for a month position; blank between whole months.
fn month_label(x: f64) -> String {
    if x < 0.0 || (x - x.round()).abs() > 1e-6 {
        return String::new();
    }
    Month::from_index(x.round() as usize)
        .map(|m| m.short_name().to_string())
        .unwrap_or_default()
}

fn render_err<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}
