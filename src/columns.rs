use crate::data::Table;
use crate::error::DashboardError;

/// Columns a dashboard section needs before it can draw anything.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRequirement {
    pub columns: Vec<String>,
    /// Completes the warning sentence, e.g. "sales visualization".
    pub purpose: String,
}

impl ColumnRequirement {
    pub fn new(columns: &[&str], purpose: &str) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            purpose: purpose.to_string(),
        }
    }

    /// True iff every required column is present (exact, case-sensitive).
    pub fn is_satisfied(&self, table: &Table) -> bool {
        self.columns.iter().all(|c| table.has_column(c))
    }

    pub fn missing(&self, table: &Table) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !table.has_column(c))
            .cloned()
            .collect()
    }

    pub fn check(&self, table: &Table) -> Result<(), DashboardError> {
        if self.is_satisfied(table) {
            Ok(())
        } else {
            Err(DashboardError::MissingColumns {
                columns: self.missing(table),
            })
        }
    }

    /// The fixed warning shown in place of the section.
    pub fn warning(&self) -> String {
        format!(
            "Please ensure your data has {} columns for {}.",
            quoted_list(&self.columns),
            self.purpose
        )
    }
}

fn quoted_list(columns: &[String]) -> String {
    let quoted: Vec<String> = columns.iter().map(|c| format!("'{}'", c)).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
    }
}
