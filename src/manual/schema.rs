//! On-disk shape of a manual file

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A whole walkthrough as written by an author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualFile {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    /// Per-key overrides of the application's labels
    #[serde(default)]
    pub labels: Option<Map<String, Value>>,
    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Falls back to the `warning_title` label
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEntry {
    pub title: String,
    /// Named template; exclusive with `markup`
    #[serde(default)]
    pub template: Option<String>,
    /// Inline markup; exclusive with `template`
    #[serde(default)]
    pub markup: Option<String>,
    #[serde(default)]
    pub validation: Option<ValidationEntry>,
    /// Everything else is handed to the template
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl StepEntry {
    pub fn flag(&self, key: &str) -> bool {
        self.data.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// How a step checks the reader's input before moving on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationEntry {
    /// Transaction code typed into a command field
    Command {
        /// Defaults to the step's `command`
        #[serde(default)]
        expected: Option<String>,
        /// Defaults to the step's `input_id`
        #[serde(default)]
        field: Option<String>,
    },
    /// Exact value typed into a form field
    Input {
        field: String,
        expected: String,
        #[serde(default)]
        success_message: Option<String>,
    },
}
