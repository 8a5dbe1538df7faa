//! SVG chart backend built on plotters. Pages are stacked vertically in a
//! single document, one page per chart.

use super::{Bar, BarColor, ChartError, ChartSink, ChartSpec};
use crate::timeseries::SeriesPoint;
use chrono::{DateTime, Duration, Utc};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;
use std::path::Path;

type Page<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = Result<(), Box<dyn std::error::Error>>;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const CAPTION_FONT: (&str, i32) = ("sans-serif", 24);

pub struct SvgChartSink {
    width: u32,
    height: u32,
}

impl SvgChartSink {
    /// `width` and `height` are the size of one page.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

impl ChartSink for SvgChartSink {
    fn name(&self) -> &str {
        "svg"
    }

    fn extension(&self) -> &str {
        "svg"
    }

    fn write(&self, charts: &[ChartSpec], path: &Path) -> Result<(), ChartError> {
        let pages = charts.len().max(1);
        let total_height = u32::try_from(pages)
            .ok()
            .and_then(|n| self.height.checked_mul(n))
            .ok_or_else(|| ChartError::TooLarge {
                path: path.to_path_buf(),
                pages,
                height: self.height,
            })?;
        let root = SVGBackend::new(path, (self.width, total_height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| write_error(path, e))?;

        let panels = root.split_evenly((pages, 1));
        for (chart, page) in charts.iter().zip(panels.iter()) {
            draw_page(chart, page).map_err(|e| ChartError::Render {
                path: path.to_path_buf(),
                title: chart.title().to_string(),
                message: e.to_string(),
            })?;
        }

        root.present().map_err(|e| write_error(path, e))?;
        tracing::debug!(path = %path.display(), pages, "wrote svg charts");
        Ok(())
    }
}

fn write_error(path: &Path, e: impl std::fmt::Display) -> ChartError {
    ChartError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

fn draw_page(chart: &ChartSpec, page: &Page<'_>) -> DrawResult {
    match chart {
        ChartSpec::PercentileBars {
            title,
            x_label,
            y_label,
            bars,
        } => draw_bars(page, title, x_label, y_label, bars),
        ChartSpec::TimeLine {
            title,
            y_label,
            points,
        } => draw_time_line(page, title, y_label, points),
        ChartSpec::TimeScatter {
            title,
            y_label,
            points,
        } => draw_time_scatter(page, title, y_label, points),
    }
}

fn color(c: BarColor) -> RGBColor {
    match c {
        BarColor::Green => GREEN,
        BarColor::Yellow => YELLOW,
        BarColor::Orange => ORANGE,
        BarColor::Red => RED,
    }
}

fn draw_bars(page: &Page<'_>, title: &str, x_label: &str, y_label: &str, bars: &[Bar]) -> DrawResult {
    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    // Headroom for the value labels above the tallest bar.
    let y_top = if max > 0.0 { max * 1.15 } else { 1.0 };

    let mut chart = ChartBuilder::on(page)
        .caption(title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d((0u32..bars.len() as u32).into_segmented(), 0.0..y_top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_label)
        .y_desc(y_label)
        .x_label_formatter(&|x: &SegmentValue<u32>| match x {
            SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => bars
                .get(*i as usize)
                .map(|b| b.label.to_string())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        let x = i as u32;
        Rectangle::new(
            [(SegmentValue::Exact(x), 0.0), (SegmentValue::Exact(x + 1), bar.value)],
            color(bar.color).filled(),
        )
    }))?;

    let value_style =
        TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(bars.iter().enumerate().map(|(i, bar)| {
        Text::new(
            format!("{:.1}ms", bar.value),
            (SegmentValue::CenterOf(i as u32), bar.value + max * 0.01),
            value_style.clone(),
        )
    }))?;

    Ok(())
}

/// Time span covering every point. A single instant is widened to one
/// second so the axis is not degenerate.
fn time_range(points: &[SeriesPoint]) -> Range<DateTime<Utc>> {
    let start = points.iter().map(|p| p.time).min().unwrap_or_else(Utc::now);
    let end = points.iter().map(|p| p.time).max().unwrap_or(start);
    if end > start {
        start..end
    } else {
        start..start + Duration::seconds(1)
    }
}

fn value_range(points: &[SeriesPoint]) -> Range<f64> {
    let lo = points.iter().map(|p| p.value).fold(0.0_f64, f64::min);
    let hi = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    if hi > lo {
        lo..hi * 1.1
    } else {
        lo..lo + 1.0
    }
}

fn time_axis_label(t: &DateTime<Utc>) -> String {
    t.format("%H:%M:%S").to_string()
}

fn draw_time_line(page: &Page<'_>, title: &str, y_label: &str, points: &[SeriesPoint]) -> DrawResult {
    let mut chart = ChartBuilder::on(page)
        .caption(title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(time_range(points), value_range(points))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(y_label)
        .x_label_formatter(&time_axis_label)
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().map(|p| (p.time, p.value)),
        BLUE.stroke_width(2),
    ))?;

    Ok(())
}

fn draw_time_scatter(
    page: &Page<'_>,
    title: &str,
    y_label: &str,
    points: &[SeriesPoint],
) -> DrawResult {
    let mut chart = ChartBuilder::on(page)
        .caption(title, CAPTION_FONT)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(time_range(points), value_range(points))?;

    chart
        .configure_mesh()
        .x_desc("Time")
        .y_desc(y_label)
        .x_label_formatter(&time_axis_label)
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.time, p.value), 5, RED.mix(0.7).filled())),
    )?;

    Ok(())
}
