//! Snapshot parsing for agent-browser output
//!
//! Parses the accessibility tree JSON from agent-browser.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed snapshot from agent-browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the operation succeeded
    #[serde(default)]
    pub success: bool,
    /// Snapshot data
    #[serde(default)]
    pub data: Option<SnapshotData>,
}

/// Snapshot data content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotData {
    /// Raw snapshot string (accessibility tree)
    #[serde(default)]
    pub snapshot: String,
    /// Element refs mapped to their info
    #[serde(default)]
    pub refs: BTreeMap<String, Element>,
}

/// An element in the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// ARIA role
    #[serde(default)]
    pub role: String,
    /// Accessible name
    #[serde(default)]
    pub name: String,
    /// Element value (for inputs)
    #[serde(default)]
    pub value: Option<String>,
    /// Whether element is focused
    #[serde(default)]
    pub focused: bool,
}

impl Snapshot {
    /// Count the number of elements with refs
    pub fn count_elements(&self) -> usize {
        self.data.as_ref().map(|d| d.refs.len()).unwrap_or(0)
    }

    /// Text handed to the model: the raw tree when present, else the ref list
    pub fn render(&self) -> String {
        match &self.data {
            Some(data) if !data.snapshot.trim().is_empty() => data.snapshot.clone(),
            Some(data) => {
                let mut output = format!("Page Elements ({}):\n", data.refs.len());

                for (ref_id, element) in &data.refs {
                    let value_str = element
                        .value
                        .as_ref()
                        .map(|v| format!(" = \"{}\"", v))
                        .unwrap_or_default();

                    output.push_str(&format!(
                        "  {} \"{}\"{} [ref={}]",
                        element.role, element.name, value_str, ref_id
                    ));

                    if element.focused {
                        output.push_str(" [focused]");
                    }

                    output.push('\n');
                }

                output
            }
            None => "No snapshot data available".to_string(),
        }
    }
}
