//! SARIF 2.1.0 output for CI systems.

use crate::Diagnostic;
use serde::Serialize;
use std::collections::BTreeMap;

/// SARIF 2.1.0 report.
#[derive(Debug, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub version: &'static str,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information_uri: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: &'static str,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifPhysicalLocation {
    pub artifact_location: SarifArtifactLocation,
    pub region: SarifRegion,
}

#[derive(Debug, Serialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRegion {
    pub start_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl SarifReport {
    /// Create a SARIF report with one run per tool.
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let mut by_tool: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for d in diagnostics {
            by_tool.entry(&d.tool).or_default().push(d);
        }

        let runs = by_tool
            .into_iter()
            .map(|(tool_name, diags)| SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: tool_name.to_string(),
                        information_uri: Some("https://fishshell.com/docs/current/".to_string()),
                    },
                },
                results: diags.into_iter().map(to_result).collect(),
            })
            .collect();

        SarifReport {
            schema: "https://json.schemastore.org/sarif-2.1.0.json",
            version: "2.1.0",
            runs,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn to_result(d: &Diagnostic) -> SarifResult {
    SarifResult {
        rule_id: d.rule_id.clone(),
        level: d.severity.to_sarif_level(),
        message: SarifMessage {
            text: d.message.clone(),
        },
        locations: vec![SarifLocation {
            physical_location: SarifPhysicalLocation {
                artifact_location: SarifArtifactLocation {
                    uri: d.location.file.display().to_string(),
                },
                region: SarifRegion {
                    start_line: d.location.line,
                    start_column: d.location.column,
                    end_column: d.location.end_column,
                },
            },
        }],
    }
}
