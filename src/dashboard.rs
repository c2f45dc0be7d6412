// Dashboard pipeline: uploaded table + user selections -> everything the page shows

use crate::aggregate;
use crate::builders::{self, ChartStyle};
use crate::chart::ChartDescription;
use crate::columns::ColumnRequirement;
use crate::config::DashboardConfig;
use crate::csv_reader::{self, UploadFormat};
use crate::data::{Table, TablePreview};
use crate::error::{DashboardError, Result};
use crate::palette::{self, ColorScheme};
use serde::Serialize;
use tracing::{debug, info, warn};

pub const ACKNOWLEDGMENT: &str = "Thank you for your feedback!";
pub const FEEDBACK_PROMPT: &str = "Your feedback or suggestions are welcome:";

/// Static text around the dynamic parts of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageText {
    pub title: String,
    pub introduction: String,
    pub upload_prompt: String,
    pub footer: String,
}

impl Default for PageText {
    fn default() -> Self {
        Self {
            title: "Business Dashboard".to_string(),
            introduction: "This dashboard provides insights into sales, customer demographics, \
                           and product performance. Upload your data to get started!"
                .to_string(),
            upload_prompt: "Upload Business Data".to_string(),
            footer: "This business dashboard is flexible. Feel free to customize it further!"
                .to_string(),
        }
    }
}

/// Contents of the feedback text area at the time of the event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedbackSubmission {
    pub text: String,
    /// Whether the submit button was pressed in this event
    pub submitted: bool,
}

/// Widget state for one render pass, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selections {
    pub feedback: Option<FeedbackSubmission>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SectionContent {
    Chart { chart: ChartDescription },
    Warning { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub subheading: String,
    pub content: SectionContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub page: PageText,
    pub preview: Option<TablePreview>,
    pub sections: Vec<Section>,
    pub warnings: Vec<String>,
    pub feedback_prompt: Option<String>,
    pub feedback_ack: Option<String>,
}

impl Dashboard {
    /// Page shown before anything has been uploaded.
    pub fn empty() -> Self {
        Self {
            page: PageText::default(),
            preview: None,
            sections: Vec::new(),
            warnings: Vec::new(),
            feedback_prompt: None,
            feedback_ack: None,
        }
    }

    pub fn charts(&self) -> impl Iterator<Item = &ChartDescription> {
        self.sections.iter().filter_map(|s| match &s.content {
            SectionContent::Chart { chart } => Some(chart),
            SectionContent::Warning { .. } => None,
        })
    }

    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SectionKind {
    SalesOverTime,
    CustomerSegmentation,
    ProductAnalysis,
}

struct SectionSpec {
    heading: &'static str,
    subheading: &'static str,
    kind: SectionKind,
    requirement: ColumnRequirement,
}

fn section_specs() -> Vec<SectionSpec> {
    vec![
        SectionSpec {
            heading: "Sales Insights",
            subheading: "Sales Over Time",
            kind: SectionKind::SalesOverTime,
            requirement: ColumnRequirement::new(&["sales_date", "sales_amount"], "sales visualization"),
        },
        SectionSpec {
            heading: "Customer Segmentation",
            subheading: "Sales by Region",
            kind: SectionKind::CustomerSegmentation,
            requirement: ColumnRequirement::new(&["region", "sales_amount"], "customer segmentation"),
        },
        SectionSpec {
            heading: "Product Analysis",
            subheading: "Top Products by Sales",
            kind: SectionKind::ProductAnalysis,
            requirement: ColumnRequirement::new(&["product", "sales_amount"], "product analysis"),
        },
    ]
}

fn build_chart(kind: SectionKind, table: &Table, config: &DashboardConfig) -> Result<ChartDescription> {
    match kind {
        SectionKind::SalesOverTime => {
            let style = ChartStyle::new("Sales Over Time", ColorScheme::single(palette::SALES_LINE))
                .labels("Date", "Sales Amount")
                .layout(20, palette::PLOT_BACKGROUND);
            builders::build_time_series(table, "sales_date", "sales_amount", &style)
        }
        SectionKind::CustomerSegmentation => {
            let style = ChartStyle::new("Sales Distribution by Region", ColorScheme::rd_bu());
            builders::build_categorical_share(table, "region", "sales_amount", &style)
        }
        SectionKind::ProductAnalysis => {
            let top = aggregate::top_n_by_sum(table, "product", "sales_amount", config.top_n)?;
            let style = ChartStyle::new("Top Products by Sales", ColorScheme::single(palette::PRODUCT_BAR))
                .labels("Product", "Sales Amount")
                .layout(20, palette::PLOT_BACKGROUND);
            Ok(builders::build_ranked_bar(&top, &style))
        }
    }
}

fn render_section(spec: &SectionSpec, table: &Table, config: &DashboardConfig) -> SectionContent {
    if let Err(err) = spec.requirement.check(table) {
        debug!(section = spec.heading, error = %err, "section skipped");
        return SectionContent::Warning {
            message: spec.requirement.warning(),
        };
    }

    match build_chart(spec.kind, table, config) {
        Ok(chart) => {
            debug!(section = spec.heading, items = chart.data.len(), "section rendered");
            SectionContent::Chart { chart }
        }
        Err(DashboardError::Aggregation { column, reason }) => {
            warn!(section = spec.heading, %column, %reason, "section degraded");
            SectionContent::Warning {
                message: format!(
                    "Column '{}' must be numeric for {}.",
                    column, spec.requirement.purpose
                ),
            }
        }
        Err(err) => {
            warn!(section = spec.heading, error = %err, "section degraded");
            SectionContent::Warning {
                message: spec.requirement.warning(),
            }
        }
    }
}

/// Compute the full page for one loaded table. Never fails: every section
/// problem becomes a warning for that section only.
pub fn render_dashboard(table: &Table, selections: &Selections, config: &DashboardConfig) -> Dashboard {
    let mut sections = Vec::new();
    let mut warnings = Vec::new();

    for spec in section_specs() {
        let content = render_section(&spec, table, config);
        if let SectionContent::Warning { message } = &content {
            warnings.push(message.clone());
        }
        sections.push(Section {
            heading: spec.heading.to_string(),
            subheading: spec.subheading.to_string(),
            content,
        });
    }

    let feedback_ack = selections
        .feedback
        .as_ref()
        .filter(|f| f.submitted)
        .map(|_| ACKNOWLEDGMENT.to_string());

    let dashboard = Dashboard {
        page: PageText::default(),
        preview: Some(table.head(config.preview_rows)),
        sections,
        warnings,
        feedback_prompt: Some(FEEDBACK_PROMPT.to_string()),
        feedback_ack,
    };

    info!(
        rows = table.len(),
        charts = dashboard.charts().count(),
        warnings = dashboard.warnings.len(),
        "dashboard rendered"
    );
    dashboard
}

/// Load a CSV upload and render it. No upload yields the bare page; a parse
/// failure aborts the pass.
pub fn render_upload(
    upload: Option<&[u8]>,
    selections: &Selections,
    config: &DashboardConfig,
) -> Result<Dashboard> {
    render_upload_as(upload, UploadFormat::Csv, selections, config)
}

pub fn render_upload_as(
    upload: Option<&[u8]>,
    format: UploadFormat,
    selections: &Selections,
    config: &DashboardConfig,
) -> Result<Dashboard> {
    let Some(bytes) = upload else {
        return Ok(Dashboard::empty());
    };
    let table = csv_reader::load_upload(bytes, format)?;
    Ok(render_dashboard(&table, selections, config))
}
