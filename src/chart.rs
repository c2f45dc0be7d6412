//! Renderer-agnostic chart descriptions.
//!
//! A `ChartDescription` carries everything a presentation surface needs to
//! draw one chart: the geometry kind, the field bindings, the bound data, the
//! labels and the colors. Builders in `crate::builders` produce them; the
//! dashboard serializes them and `crate::graph` can rasterize them.

use crate::data::Value;
use crate::palette::ColorScheme;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Pie,
    Bar,
}

/// Which table fields feed which chart channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bindings {
    /// x axis (line/bar) or slice names (pie)
    pub x: String,
    /// y axis (line/bar) or slice values (pie)
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AxisLabels {
    pub x: Option<String>,
    pub y: Option<String>,
}

/// Layout hints that are not data bindings.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub title_font_size: Option<u32>,
    pub plot_background: Option<String>,
}

/// What to print on each pie slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextInfo {
    Percent,
    Label,
    PercentAndLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: Value,
    /// None leaves a gap in the line
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: Value,
    pub value: f64,
    /// Share of the pie total, 0-100
    pub percent: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub category: Value,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ChartData {
    Points(Vec<SeriesPoint>),
    Slices(Vec<Slice>),
    Bars(Vec<Bar>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            ChartData::Points(p) => p.len(),
            ChartData::Slices(s) => s.len(),
            ChartData::Bars(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescription {
    pub kind: ChartKind,
    pub title: String,
    pub bindings: Bindings,
    pub labels: AxisLabels,
    pub colors: ColorScheme,
    pub layout: Layout,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_info: Option<TextInfo>,
    pub data: ChartData,
}

impl ChartDescription {
    pub fn points(&self) -> &[SeriesPoint] {
        match &self.data {
            ChartData::Points(p) => p,
            _ => &[],
        }
    }

    pub fn slices(&self) -> &[Slice] {
        match &self.data {
            ChartData::Slices(s) => s,
            _ => &[],
        }
    }

    pub fn bars(&self) -> &[Bar] {
        match &self.data {
            ChartData::Bars(b) => b,
            _ => &[],
        }
    }
}
