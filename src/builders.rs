// Chart builders: table + field names -> ChartDescription
//
// All builders are pure. They never reorder or mutate the data they bind to.

use crate::aggregate::{self, AggregatedTable};
use crate::chart::{
    AxisLabels, Bar, Bindings, ChartData, ChartDescription, ChartKind, Layout, SeriesPoint, Slice,
    TextInfo,
};
use crate::data::{ColumnType, Table};
use crate::error::{DashboardError, Result};
use crate::palette::ColorScheme;

/// Presentation choices that are independent of the bound data.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    /// Falls back to the field's presentation label
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub colors: ColorScheme,
    pub layout: Layout,
}

impl ChartStyle {
    pub fn new(title: &str, colors: ColorScheme) -> Self {
        Self {
            title: title.to_string(),
            x_label: None,
            y_label: None,
            colors,
            layout: Layout::default(),
        }
    }

    pub fn labels(mut self, x: &str, y: &str) -> Self {
        self.x_label = Some(x.to_string());
        self.y_label = Some(y.to_string());
        self
    }

    pub fn layout(mut self, title_font_size: u32, plot_background: &str) -> Self {
        self.layout = Layout {
            title_font_size: Some(title_font_size),
            plot_background: Some(plot_background.to_string()),
        };
        self
    }

    fn axis_labels(&self, x_field: &str, y_field: &str) -> AxisLabels {
        AxisLabels {
            x: Some(self.x_label.clone().unwrap_or_else(|| presentation_label(x_field))),
            y: Some(self.y_label.clone().unwrap_or_else(|| presentation_label(y_field))),
        }
    }
}

/// `sales_amount` -> `Sales Amount`
pub fn presentation_label(field: &str) -> String {
    field
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn require_columns(table: &Table, fields: &[&str]) -> Result<()> {
    let columns: Vec<String> = fields
        .iter()
        .filter(|f| !table.has_column(f))
        .map(|f| f.to_string())
        .collect();
    if columns.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::MissingColumns { columns })
    }
}

fn require_numeric(table: &Table, field: &str) -> Result<()> {
    match table.column_type(field) {
        Some(ColumnType::Numeric) => Ok(()),
        _ => Err(DashboardError::aggregation(field, "column is not numeric")),
    }
}

/// Line chart of `y` against `x`, one point per row in row order.
pub fn build_time_series(table: &Table, x: &str, y: &str, style: &ChartStyle) -> Result<ChartDescription> {
    require_columns(table, &[x, y])?;
    require_numeric(table, y)?;

    let (x_idx, y_idx) = match (table.column_index(x), table.column_index(y)) {
        (Some(xi), Some(yi)) => (xi, yi),
        _ => return Err(DashboardError::MissingColumns { columns: vec![x.to_string(), y.to_string()] }),
    };

    let points = table
        .rows()
        .iter()
        .map(|row| SeriesPoint {
            x: row[x_idx].clone(),
            y: row[y_idx].as_f64(),
        })
        .collect();

    Ok(ChartDescription {
        kind: ChartKind::Line,
        title: style.title.clone(),
        bindings: Bindings {
            x: x.to_string(),
            y: y.to_string(),
        },
        labels: style.axis_labels(x, y),
        colors: style.colors.clone(),
        layout: style.layout.clone(),
        text_info: None,
        data: ChartData::Points(points),
    })
}

/// Pie chart: one slice per distinct `names` value, sized by the sum of `values`.
/// Groups whose sum is negative get no slice.
pub fn build_categorical_share(
    table: &Table,
    names: &str,
    values: &str,
    style: &ChartStyle,
) -> Result<ChartDescription> {
    require_columns(table, &[names, values])?;

    let groups: Vec<_> = aggregate::group_sums(table, names, values)?
        .into_iter()
        .filter(|g| g.total >= 0.0)
        .collect();
    let total: f64 = groups.iter().map(|g| g.total).sum();

    let slices = groups
        .into_iter()
        .map(|g| {
            let percent = if total == 0.0 { 0.0 } else { g.total / total * 100.0 };
            let text = format!("{}%\n{}", format_percent(percent), g.key);
            Slice {
                label: g.key,
                value: g.total,
                percent,
                text,
            }
        })
        .collect();

    Ok(ChartDescription {
        kind: ChartKind::Pie,
        title: style.title.clone(),
        bindings: Bindings {
            x: names.to_string(),
            y: values.to_string(),
        },
        labels: AxisLabels::default(),
        colors: style.colors.clone(),
        layout: style.layout.clone(),
        text_info: Some(TextInfo::PercentAndLabel),
        data: ChartData::Slices(slices),
    })
}

/// Bar chart over an aggregated table, keeping its ranking order.
pub fn build_ranked_bar(agg: &AggregatedTable, style: &ChartStyle) -> ChartDescription {
    let bars = agg
        .rows
        .iter()
        .map(|r| Bar {
            category: r.key.clone(),
            value: r.total,
        })
        .collect();

    ChartDescription {
        kind: ChartKind::Bar,
        title: style.title.clone(),
        bindings: Bindings {
            x: agg.key_column.clone(),
            y: agg.value_column.clone(),
        },
        labels: style.axis_labels(&agg.key_column, &agg.value_column),
        colors: style.colors.clone(),
        layout: style.layout.clone(),
        text_info: None,
        data: ChartData::Bars(bars),
    }
}

/// One decimal place, trailing `.0` dropped: 75.0 -> "75", 33.333 -> "33.3".
fn format_percent(percent: f64) -> String {
    let rounded = format!("{:.1}", percent);
    rounded.strip_suffix(".0").map(str::to_string).unwrap_or(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::top_n_by_sum;
    use crate::csv_reader::load_table;
    use crate::data::Value;
    use crate::palette::{self, ColorScheme};

    fn line_style() -> ChartStyle {
        ChartStyle::new("Sales Over Time", ColorScheme::single(palette::SALES_LINE))
            .labels("Date", "Sales Amount")
            .layout(20, palette::PLOT_BACKGROUND)
    }

    #[test]
    fn test_presentation_label() {
        assert_eq!(presentation_label("sales_amount"), "Sales Amount");
        assert_eq!(presentation_label("product"), "Product");
        assert_eq!(presentation_label("unit price"), "Unit Price");
    }

    #[test]
    fn test_time_series() {
        let table = load_table(b"sales_date,sales_amount\n2024-01-01,100\n2024-01-02,150\n").unwrap();
        let chart = build_time_series(&table, "sales_date", "sales_amount", &line_style()).unwrap();

        assert_eq!(chart.kind, ChartKind::Line);
        let ys: Vec<Option<f64>> = chart.points().iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![Some(100.0), Some(150.0)]);
        assert_eq!(chart.points()[0].x, Value::Text("2024-01-01".to_string()));
        assert_eq!(chart.labels.x.as_deref(), Some("Date"));
        assert_eq!(chart.labels.y.as_deref(), Some("Sales Amount"));
        assert_eq!(chart.layout.title_font_size, Some(20));
    }

    #[test]
    fn test_time_series_keeps_row_order_and_gaps() {
        let table = load_table(b"sales_date,sales_amount\n2024-01-03,1\n2024-01-01,\n").unwrap();
        let chart = build_time_series(&table, "sales_date", "sales_amount", &line_style()).unwrap();
        assert_eq!(chart.points()[0].x, Value::Text("2024-01-03".to_string()));
        assert_eq!(chart.points()[1].y, None);
    }

    #[test]
    fn test_time_series_default_labels() {
        let table = load_table(b"day,units\n1,2\n").unwrap();
        let style = ChartStyle::new("Units", ColorScheme::single("#000000"));
        let chart = build_time_series(&table, "day", "units", &style).unwrap();
        assert_eq!(chart.labels.x.as_deref(), Some("Day"));
        assert_eq!(chart.labels.y.as_deref(), Some("Units"));
    }

    #[test]
    fn test_time_series_non_numeric_y() {
        let table = load_table(b"sales_date,sales_amount\n2024-01-01,lots\n").unwrap();
        let result = build_time_series(&table, "sales_date", "sales_amount", &line_style());
        assert!(matches!(result, Err(DashboardError::Aggregation { .. })));
    }

    #[test]
    fn test_pie_shares() {
        let table = load_table(b"region,sales_amount\nEast,50\nWest,150\n").unwrap();
        let style = ChartStyle::new("Sales Distribution by Region", ColorScheme::rd_bu());
        let chart = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();

        assert_eq!(chart.kind, ChartKind::Pie);
        assert_eq!(chart.text_info, Some(TextInfo::PercentAndLabel));
        let slices = chart.slices();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[1].label, Value::Text("West".to_string()));
        assert_eq!(slices[1].percent, 75.0);
        assert_eq!(slices[1].text, "75%\nWest");
        assert_eq!(slices[0].text, "25%\nEast");
    }

    #[test]
    fn test_pie_merges_repeated_categories() {
        let table = load_table(b"region,sales_amount\nEast,1\nWest,1\nEast,1\n").unwrap();
        let style = ChartStyle::new("Share", ColorScheme::rd_bu());
        let chart = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();
        assert_eq!(chart.slices().len(), 2);
        assert_eq!(chart.slices()[0].value, 2.0);
        assert_eq!(chart.slices()[1].text, "33.3%\nWest");
    }

    #[test]
    fn test_pie_zero_total() {
        let table = load_table(b"region,sales_amount\nEast,0\n").unwrap();
        let style = ChartStyle::new("Share", ColorScheme::rd_bu());
        let chart = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();
        assert_eq!(chart.slices()[0].percent, 0.0);
    }

    #[test]
    fn test_pie_drops_negative_sums() {
        let table = load_table(b"region,sales_amount\nEast,50\nWest,-150\nNorth,0\n").unwrap();
        let style = ChartStyle::new("Share", ColorScheme::rd_bu());
        let chart = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();

        let slices = chart.slices();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, Value::Text("East".to_string()));
        assert_eq!(slices[0].percent, 100.0);
        assert_eq!(slices[0].text, "100%\nEast");
        assert_eq!(slices[1].label, Value::Text("North".to_string()));
        assert_eq!(slices[1].percent, 0.0);
        assert!(slices.iter().all(|s| (0.0..=100.0).contains(&s.percent)));
    }

    #[test]
    fn test_ranked_bar_keeps_order() {
        let mut csv = String::from("product,sales_amount\n");
        for i in 0..12 {
            csv.push_str(&format!("P{},{}\n", i, (i + 1) * 5));
        }
        let table = load_table(csv.as_bytes()).unwrap();
        let agg = top_n_by_sum(&table, "product", "sales_amount", 10).unwrap();
        let style = ChartStyle::new("Top Products by Sales", ColorScheme::single(palette::PRODUCT_BAR));
        let chart = build_ranked_bar(&agg, &style);

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(chart.bars().len(), 10);
        assert_eq!(chart.bars()[0].category, Value::Text("P11".to_string()));
        assert_eq!(chart.bars()[9].category, Value::Text("P2".to_string()));
        assert_eq!(chart.labels.x.as_deref(), Some("Product"));
    }

    #[test]
    fn test_builders_are_idempotent() {
        let table = load_table(b"region,sales_amount\nEast,50\nWest,150\n").unwrap();
        let style = ChartStyle::new("Share", ColorScheme::rd_bu());
        let a = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();
        let b = build_categorical_share(&table, "region", "sales_amount", &style).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_column_produces_no_chart() {
        let table = load_table(b"sales_amount\n5\n").unwrap();
        let style = ChartStyle::new("Share", ColorScheme::rd_bu());
        let result = build_categorical_share(&table, "region", "sales_amount", &style);
        assert!(matches!(result, Err(DashboardError::MissingColumns { .. })));
    }
}
