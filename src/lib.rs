// Library exports for bizdash

pub mod aggregate;
pub mod builders;
pub mod chart;
pub mod columns;
pub mod config;
pub mod csv_reader;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod graph;
pub mod logging;
pub mod palette;
pub mod temporal;

pub use csv_reader::UploadFormat;
pub use dashboard::{render_dashboard, render_upload, render_upload_as, Dashboard, FeedbackSubmission, Selections};
pub use error::DashboardError;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
        }
    }
}
