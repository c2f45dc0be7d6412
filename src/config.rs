use crate::error::{DashboardError, Result};
use crate::RenderOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;

fn default_preview_rows() -> usize { 5 }
fn default_top_n() -> usize { 10 }

/// Knobs for one dashboard run. Every field has a default, so `{}` is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// How many products the ranked bar chart keeps
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub render: RenderOptions,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            preview_rows: default_preview_rows(),
            top_n: default_top_n(),
            render: RenderOptions::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OutputFormat;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::from_json_str("{}").unwrap();
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.render.width, 800);
        assert!(matches!(config.render.format, OutputFormat::Png));
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::from_json_str(
            r#"{"top_n": 3, "render": {"width": 400, "type": "svg"}}"#,
        )
        .unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.render.width, 400);
        assert_eq!(config.render.height, 600);
        assert!(matches!(config.render.format, OutputFormat::Svg));
    }

    #[test]
    fn test_invalid_json() {
        let result = DashboardConfig::from_json_str("{not json");
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
