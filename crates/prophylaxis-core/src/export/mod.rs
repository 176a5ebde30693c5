//! Report generation: hedged text and the tabular payload.

pub mod phrases;
mod table;
mod text;

pub use table::*;
pub use text::*;

use serde::{Deserialize, Serialize};

use crate::models::ProphylaxisAnalysis;

/// Text and table for one analysis, as handed to document rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub text: ReportText,
    pub table: ReportTable,
}

impl Report {
    pub fn from_analysis(analysis: &ProphylaxisAnalysis) -> Result<Self, serde_json::Error> {
        Ok(Self {
            text: generate_report_text(analysis),
            table: ReportTable::from_analysis(analysis)?,
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
