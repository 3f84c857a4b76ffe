use crate::config::ChartConfig;
use crate::errors::{OptionsError, Result};
use crate::payoff::PayoffSeries;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

const CAPTION_FONT_SIZE: u32 = 24;
const RANGE_PADDING: f64 = 0.05;

fn chart_error<E: std::fmt::Display>(e: E) -> OptionsError {
    OptionsError::Chart(e.to_string())
}

/// Axis range covering `[min, max]` with a little headroom, never empty.
fn padded_range(min: f64, max: f64) -> Range<f64> {
    let span = max - min;
    let pad = if span > 0.0 {
        span * RANGE_PADDING
    } else {
        (min.abs() * RANGE_PADDING).max(1.0)
    };
    (min - pad)..(max + pad)
}

/// Draw the series as an x/y line chart and return the SVG document.
pub fn render_payoff_svg(series: &PayoffSeries, config: &ChartConfig) -> Result<String> {
    if config.width == 0 || config.height == 0 {
        return Err(OptionsError::Chart("chart dimensions must be positive".into()));
    }
    let points = series.points();
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(OptionsError::Chart("cannot plot an empty payoff series".into())),
    };
    let (y_min, y_max) = match (series.min_payoff(), series.max_payoff()) {
        (Some(min), Some(max)) => (min, max),
        _ => return Err(OptionsError::Chart("cannot plot an empty payoff series".into())),
    };

    let x_range = if first.underlying_price < last.underlying_price {
        first.underlying_price..last.underlying_price
    } else {
        padded_range(first.underlying_price, last.underlying_price)
    };
    let y_range = padded_range(y_min, y_max);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut builder = ChartBuilder::on(&root);
        builder.margin(10);
        if config.show_labels {
            builder
                .caption(&config.caption, ("sans-serif", CAPTION_FONT_SIZE))
                .x_label_area_size(40)
                .y_label_area_size(60);
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_error)?;

        // Tick labels only render into label areas, which are reserved above
        // when labels are shown; the grid is drawn either way.
        let mut mesh = chart.configure_mesh();
        if config.show_labels {
            mesh.x_desc(config.x_label.as_str())
                .y_desc(config.y_label.as_str());
        }
        mesh.draw().map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.underlying_price, p.total_payoff)),
                &BLUE,
            ))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    tracing::debug!(points = points.len(), bytes = svg.len(), "Rendered payoff chart");
    Ok(svg)
}

pub fn save_payoff_svg(
    path: impl AsRef<Path>,
    series: &PayoffSeries,
    config: &ChartConfig,
) -> Result<()> {
    let svg = render_payoff_svg(series, config)?;
    std::fs::write(path.as_ref(), svg)?;
    tracing::info!(path = ?path.as_ref(), "Saved payoff chart");
    Ok(())
}
