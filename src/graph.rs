use crate::chart::{ChartDescription, ChartKind, SeriesPoint};
use crate::data::Value;
use crate::palette::parse_color;
use crate::temporal;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use std::ops::Range;

const DEFAULT_TITLE_SIZE: u32 = 20;

fn rgb_buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

/// Draw a chart description and encode it in the requested format.
pub fn render_chart(chart: &ChartDescription, options: &RenderOptions) -> Result<Vec<u8>> {
    let (width, height) = (options.width, options.height);
    if width == 0 || height == 0 {
        anyhow::bail!("Cannot render a {}x{} image", width, height);
    }

    match options.format {
        OutputFormat::Png => {
            let mut buffer = vec![0u8; rgb_buffer_len(width, height)];
            {
                let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
                draw_chart(&root, chart)?;
                root.present().context("Failed to present drawing")?;
            }

            let mut png_bytes = Vec::new();
            image::codecs::png::PngEncoder::new(&mut png_bytes)
                .write_image(&buffer, width, height, image::ColorType::Rgb8)
                .context("Failed to encode PNG")?;
            Ok(png_bytes)
        }
        OutputFormat::Svg => {
            let mut svg = String::new();
            {
                let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
                draw_chart(&root, chart)?;
                root.present().context("Failed to present drawing")?;
            }
            Ok(svg.into_bytes())
        }
    }
}

fn draw_chart<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &ChartDescription) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;
    match chart.kind {
        ChartKind::Line => draw_line(root, chart),
        ChartKind::Bar => draw_bars(root, chart),
        ChartKind::Pie => draw_pie(root, chart),
    }
}

/// How line-chart x values map onto a continuous axis.
#[derive(Debug, Clone, PartialEq)]
enum XAxis {
    Time,
    Numeric,
    Categorical(Vec<String>),
}

impl XAxis {
    /// Dates win over plain numbers; anything else becomes categorical.
    fn infer(points: &[SeriesPoint]) -> Self {
        let present: Vec<&Value> = points.iter().map(|p| &p.x).filter(|x| !x.is_missing()).collect();
        if present.is_empty() {
            return XAxis::Numeric;
        }
        if present.iter().all(|x| matches!(x, Value::Text(s) if temporal::parse_timestamp(s).is_some())) {
            XAxis::Time
        } else if present.iter().all(|x| matches!(x, Value::Number(_))) {
            XAxis::Numeric
        } else {
            XAxis::Categorical(points.iter().map(|p| p.x.to_string()).collect())
        }
    }

    fn position(&self, index: usize, x: &Value) -> Option<f64> {
        match (self, x) {
            (XAxis::Time, Value::Text(s)) => temporal::parse_timestamp(s).map(|t| t.ordinal()),
            (XAxis::Numeric, Value::Number(n)) => Some(*n),
            (XAxis::Categorical(_), _) => Some(index as f64),
            _ => None,
        }
    }

    fn format(&self, x: f64) -> String {
        match self {
            XAxis::Time => temporal::format_ordinal(x),
            XAxis::Numeric => format!("{}", x),
            XAxis::Categorical(labels) => {
                let idx = x.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (x - idx).abs() < 1e-9 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            }
        }
    }
}

/// Split into drawable runs; a missing x or y breaks the line.
fn line_segments(points: &[SeriesPoint], axis: &XAxis) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (idx, point) in points.iter().enumerate() {
        match (axis.position(idx, &point.x), point.y) {
            (Some(x), Some(y)) => current.push((x, y)),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn padded_range(values: impl Iterator<Item = f64>) -> Option<Range<f64>> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    if min == max {
        Some((min - 1.0)..(max + 1.0))
    } else {
        let padding = (max - min) * 0.05;
        Some((min - padding)..(max + padding))
    }
}

fn title_style(chart: &ChartDescription) -> (&'static str, f64) {
    ("sans-serif", chart.layout.title_font_size.unwrap_or(DEFAULT_TITLE_SIZE) as f64)
}

fn draw_line<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &ChartDescription) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let axis = XAxis::infer(chart.points());
    let segments = line_segments(chart.points(), &axis);
    let all: Vec<(f64, f64)> = segments.iter().flatten().copied().collect();

    let x_range = padded_range(all.iter().map(|p| p.0));
    let y_range = padded_range(all.iter().map(|p| p.1));
    let (Some(x_range), Some(y_range)) = (x_range, y_range) else {
        anyhow::bail!("Cannot draw a line chart with no data points");
    };

    let mut cc = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title, title_style(chart))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    if let Some(bg) = &chart.layout.plot_background {
        cc.plotting_area().fill(&parse_color(bg)).context("Failed to fill plot area")?;
    }

    cc.configure_mesh()
        .x_desc(chart.labels.x.clone().unwrap_or_default())
        .y_desc(chart.labels.y.clone().unwrap_or_default())
        .x_label_formatter(&|x| axis.format(*x))
        .draw()
        .context("Failed to draw mesh")?;

    let color = parse_color(chart.colors.color_at(0));
    for segment in segments {
        cc.draw_series(LineSeries::new(segment, color.stroke_width(2)))
            .context("Failed to draw line series")?;
    }

    Ok(())
}

fn draw_bars<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &ChartDescription) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let bars = chart.bars();
    if bars.is_empty() {
        anyhow::bail!("Cannot create bar chart with no data");
    }

    let categories: Vec<String> = bars.iter().map(|b| category_label(&b.category)).collect();
    let y_range = padded_range(bars.iter().map(|b| b.value).chain(std::iter::once(0.0)))
        .context("Bar values are not finite")?;
    let x_range = 0.0..(categories.len() as f64);

    let mut cc = ChartBuilder::on(root)
        .margin(10)
        .caption(&chart.title, title_style(chart))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    if let Some(bg) = &chart.layout.plot_background {
        cc.plotting_area().fill(&parse_color(bg)).context("Failed to fill plot area")?;
    }

    cc.configure_mesh()
        .disable_x_mesh()
        .x_labels(categories.len() * 2 + 1)
        .x_label_formatter(&|x| {
            // Labels sit at bar centers (i + 0.5)
            let shifted = *x - 0.5;
            let idx = shifted.round();
            if (shifted - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < categories.len() {
                categories[idx as usize].clone()
            } else {
                String::new()
            }
        })
        .x_desc(chart.labels.x.clone().unwrap_or_default())
        .y_desc(chart.labels.y.clone().unwrap_or_default())
        .draw()
        .context("Failed to draw mesh")?;

    let color = parse_color(chart.colors.color_at(0));
    let bar_width = 0.8;
    cc.draw_series(bars.iter().enumerate().map(|(idx, bar)| {
        let x_center = idx as f64 + 0.5;
        Rectangle::new(
            [
                (x_center - bar_width / 2.0, 0.0),
                (x_center + bar_width / 2.0, bar.value),
            ],
            color.filled(),
        )
    }))
    .context("Failed to draw bars")?;

    Ok(())
}

fn draw_pie<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, chart: &ChartDescription) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let slices = chart.slices();
    let total: f64 = slices.iter().map(|s| s.value.max(0.0)).sum();
    if slices.is_empty() || total <= 0.0 {
        anyhow::bail!("Cannot create pie chart with no positive values");
    }

    let area = root
        .titled(&chart.title, title_style(chart))
        .context("Failed to draw title")?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.4;

    let label_style = TextStyle::from(("sans-serif", 14).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

    // Clockwise from twelve o'clock
    let mut start = -PI / 2.0;
    for (idx, slice) in slices.iter().enumerate() {
        let sweep = slice.value.max(0.0) / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }

        let polygon = wedge(center, radius, start, start + sweep);
        let color = parse_color(chart.colors.color_at(idx));
        area.draw(&Polygon::new(polygon, color.filled()))
            .context("Failed to draw slice")?;

        let mid = start + sweep / 2.0;
        let anchor = (center.0 + radius * 0.65 * mid.cos(), center.1 + radius * 0.65 * mid.sin());
        for (line_no, line) in slice.text.lines().enumerate() {
            let y = anchor.1 + (line_no as f64 - 0.5) * 16.0;
            area.draw(&Text::new(line.to_string(), (anchor.0 as i32, y as i32), label_style.clone()))
                .context("Failed to draw slice label")?;
        }

        start += sweep;
    }

    Ok(())
}

/// Pixel outline of one pie wedge between two angles (radians).
fn wedge(center: (f64, f64), radius: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
    let steps = (((to - from) / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((center.0 as i32, center.1 as i32));
    for i in 0..=steps {
        let angle = from + (to - from) * i as f64 / steps as f64;
        points.push((
            (center.0 + radius * angle.cos()).round() as i32,
            (center.1 + radius * angle.sin()).round() as i32,
        ));
    }
    points
}

fn category_label(value: &Value) -> String {
    match value {
        Value::Missing => "(missing)".to_string(),
        other => other.to_string(),
    }
}
