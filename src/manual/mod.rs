//! Loading manual files and building them into step lists

mod schema;

pub use schema::{ManualFile, StepEntry, ValidationEntry, Warning};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Labels;
use crate::sequencer::{StepContent, StepDefinition};
use crate::templates::{form_fields, TemplateError, TemplateRenderer, DEFAULT_COMMAND_FIELD};
use crate::validation::{AckTimer, FieldCheck, FieldRegistry, Matcher, SharedNotifier};

#[derive(Error, Debug)]
pub enum ManualError {
    #[error("failed to read manual {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse manual {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported manual format {path} (expected .toml, .yaml, .yml or .json)")]
    UnsupportedFormat { path: PathBuf },

    #[error("step {index} ({title}) needs either `template` or `markup`")]
    MissingContent { index: usize, title: String },

    #[error("step {index} ({title}) has both `template` and `markup`")]
    AmbiguousContent { index: usize, title: String },

    #[error("step {index} ({title}) validates a command but names none")]
    MissingExpected { index: usize, title: String },

    #[error("step {index} validates unknown field `{field}`")]
    UnknownField { index: usize, field: String },

    #[error("invalid manual labels: {0}")]
    Labels(#[from] ::config::ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualFormat {
    Toml,
    Yaml,
    Json,
}

impl ManualFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(ManualFormat::Toml),
            "yaml" | "yml" => Some(ManualFormat::Yaml),
            "json" => Some(ManualFormat::Json),
            _ => None,
        }
    }
}

/// Title, purpose and warnings shown around the steps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualMeta {
    pub title: String,
    pub purpose: String,
    pub warnings: Vec<Warning>,
}

/// Everything needed to run a manual
pub struct BuiltManual {
    pub meta: ManualMeta,
    pub steps: Vec<StepDefinition>,
    pub fields: FieldRegistry,
    /// Check run by a step's "check" action, keyed by step index
    pub checks: BTreeMap<usize, FieldCheck>,
}

impl ManualFile {
    pub fn load(path: &Path) -> Result<Self, ManualError> {
        let format = ManualFormat::from_path(path).ok_or_else(|| ManualError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
        let source = fs::read_to_string(path).map_err(|source| ManualError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let manual = Self::parse(&source, format).map_err(|message| ManualError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(path = %path.display(), steps = manual.steps.len(), "Loaded manual");
        Ok(manual)
    }

    pub fn parse(source: &str, format: ManualFormat) -> Result<Self, String> {
        match format {
            ManualFormat::Toml => toml::from_str(source).map_err(|e| e.to_string()),
            ManualFormat::Yaml => serde_yaml::from_str(source).map_err(|e| e.to_string()),
            ManualFormat::Json => serde_json::from_str(source).map_err(|e| e.to_string()),
        }
    }

    /// Labels for this manual: its own entries layered over the fallback
    pub fn effective_labels(&self, fallback: &Labels) -> Result<Labels, ManualError> {
        let Some(overrides) = &self.labels else {
            return Ok(fallback.clone());
        };

        let labels = ::config::Config::builder()
            .add_source(::config::Config::try_from(fallback)?)
            .add_source(::config::Config::try_from(overrides)?)
            .build()?
            .try_deserialize()?;
        debug!(overrides = overrides.len(), "Merged manual labels");
        Ok(labels)
    }

    /// Turn the entries into step definitions with their fields and checks
    pub fn build(
        self,
        renderer: &TemplateRenderer,
        notifier: &SharedNotifier,
        ack: &AckTimer,
    ) -> Result<BuiltManual, ManualError> {
        let mut fields = FieldRegistry::new();
        let mut checks = BTreeMap::new();
        let mut steps = Vec::with_capacity(self.steps.len());

        for (index, entry) in self.steps.into_iter().enumerate() {
            let content = step_content(index, &entry)?;
            if let Some(name) = content.template_name() {
                if !renderer.has_step_template(name) {
                    warn!(step = index, template = name, "Unknown template renders empty");
                }
            }

            declare_fields(&entry, &mut fields);

            let check = match validation_for(&entry) {
                Some((validation, gates)) => Some((
                    build_check(
                        index,
                        &entry,
                        &validation,
                        renderer,
                        &mut fields,
                        notifier,
                        ack,
                    )?,
                    gates,
                )),
                None => None,
            };

            let mut step = StepDefinition::new(entry.title, content).with_data(entry.data);
            if let Some((check, gates)) = check {
                if gates {
                    step = step.with_validation(check.gate());
                }
                checks.insert(index, check);
            }
            steps.push(step);
        }

        debug!(
            steps = steps.len(),
            fields = fields.len(),
            checks = checks.len(),
            "Built manual"
        );

        Ok(BuiltManual {
            meta: ManualMeta {
                title: self.title,
                purpose: self.purpose,
                warnings: self.warnings,
            },
            steps,
            fields,
            checks,
        })
    }
}

fn step_content(index: usize, entry: &StepEntry) -> Result<StepContent, ManualError> {
    match (&entry.template, &entry.markup) {
        (Some(name), None) => Ok(StepContent::named(name.clone())),
        (None, Some(markup)) => Ok(StepContent::inline(markup.clone())),
        (Some(_), Some(_)) => Err(ManualError::AmbiguousContent {
            index,
            title: entry.title.clone(),
        }),
        (None, None) => Err(ManualError::MissingContent {
            index,
            title: entry.title.clone(),
        }),
    }
}

/// Create the input fields a step's template shows
fn declare_fields(entry: &StepEntry, fields: &mut FieldRegistry) {
    match entry.template.as_deref() {
        Some("command_input") => {
            let id = entry.text("input_id").unwrap_or(DEFAULT_COMMAND_FIELD);
            let field = fields.get_or_create(id);
            if field.placeholder().is_empty() {
                fields.insert(field.with_placeholder("Command field"));
            }
        }
        Some("form") => {
            let form_step = StepDefinition::new("", StepContent::named("form"))
                .with_data(entry.data.clone());
            // Malformed field lists surface when the step is rendered
            for options in form_fields(&form_step).unwrap_or_default() {
                let field = fields
                    .get_or_create(&options.id)
                    .readonly(options.readonly);
                if !options.value.is_empty() {
                    field.set_value(&options.value);
                }
            }
        }
        _ => {}
    }
}

/// The step's check and whether it also gates "next".
///
/// An explicit `validation` gates. `has_validation` on a command step only
/// adds the check action; navigation past it stays free.
fn validation_for(entry: &StepEntry) -> Option<(ValidationEntry, bool)> {
    if let Some(validation) = &entry.validation {
        return Some((validation.clone(), true));
    }
    if entry.template.as_deref() == Some("command_input") && entry.flag("has_validation") {
        return Some((
            ValidationEntry::Command {
                expected: None,
                field: None,
            },
            false,
        ));
    }
    None
}

fn build_check(
    index: usize,
    entry: &StepEntry,
    validation: &ValidationEntry,
    renderer: &TemplateRenderer,
    fields: &mut FieldRegistry,
    notifier: &SharedNotifier,
    ack: &AckTimer,
) -> Result<FieldCheck, ManualError> {
    let labels = renderer.labels();

    match validation {
        ValidationEntry::Command { expected, field } => {
            let command = expected
                .as_deref()
                .or_else(|| entry.text("command"))
                .ok_or_else(|| ManualError::MissingExpected {
                    index,
                    title: entry.title.clone(),
                })?;
            let field_id = field
                .as_deref()
                .or_else(|| entry.text("input_id"))
                .unwrap_or(DEFAULT_COMMAND_FIELD);

            let values = json!({ "command": command });
            let success = renderer.render_text(&labels.command_success, &values)?;
            let failure = renderer.render_text(&labels.command_failure, &values)?;

            Ok(FieldCheck::new(
                fields.get_or_create(field_id),
                Matcher::Command(command.to_string()),
                notifier.clone(),
                ack.clone(),
            )
            .with_messages(success, failure))
        }
        ValidationEntry::Input {
            field,
            expected,
            success_message,
        } => {
            let input = fields
                .get(field)
                .cloned()
                .ok_or_else(|| ManualError::UnknownField {
                    index,
                    field: field.clone(),
                })?;

            let success = success_message
                .clone()
                .unwrap_or_else(|| labels.input_success.clone());
            let failure = renderer.render_text(
                &labels.input_failure,
                &json!({ "expected": Value::String(expected.clone()) }),
            )?;

            Ok(FieldCheck::new(
                input,
                Matcher::Exact(expected.clone()),
                notifier.clone(),
                ack.clone(),
            )
            .with_messages(success, failure))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{NoopHook, StepSequencer};
    use crate::validation::{AlertQueue, DEFAULT_ACK_DELAY};
    use serde_json::Map;
    use std::io::Write;
    use std::rc::Rc;

    const TOML_MANUAL: &str = r#"
title = "Create a material"
purpose = "Register a new material master record"

[[warnings]]
text = "Changes are live in production."

[[steps]]
title = "Introduction"
template = "intro"
learning_points = ["Open MM01", "Fill in the basic data"]

[[steps]]
title = "Open MM01"
template = "command_input"
command = "MM01"
has_validation = true

[[steps]]
title = "Industry sector"
template = "form"
fields = [{ label = "Industry sector", id = "sector" }]
validation = { kind = "input", field = "sector", expected = "M" }

[[steps]]
title = "Done"
markup = "<p>All done.</p>"
"#;

    fn build(manual: ManualFile, alerts: &AlertQueue) -> BuiltManual {
        let renderer = TemplateRenderer::new(Labels::default()).unwrap();
        let notifier: SharedNotifier = Rc::new(alerts.clone());
        let (ack, _rx) = AckTimer::channel(DEFAULT_ACK_DELAY);
        manual.build(&renderer, &notifier, &ack).unwrap()
    }

    #[test]
    fn test_parse_toml_manual() {
        let manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        assert_eq!(manual.title, "Create a material");
        assert_eq!(manual.steps.len(), 4);
        assert_eq!(manual.warnings[0].title, None);
        assert_eq!(manual.steps[1].text("command"), Some("MM01"));
        assert!(manual.steps[1].flag("has_validation"));
    }

    #[test]
    fn test_parse_yaml_and_json_manuals() {
        let yaml = "title: Y\nsteps:\n  - title: One\n    markup: <p>1</p>\n";
        let manual = ManualFile::parse(yaml, ManualFormat::Yaml).unwrap();
        assert_eq!(manual.steps[0].markup.as_deref(), Some("<p>1</p>"));

        let json = r#"{"title": "J", "steps": [{"title": "One", "template": "intro", "skill": "None"}]}"#;
        let manual = ManualFile::parse(json, ManualFormat::Json).unwrap();
        assert_eq!(manual.steps[0].text("skill"), Some("None"));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ManualFormat::from_path(Path::new("a/manual.YML")),
            Some(ManualFormat::Yaml)
        );
        assert_eq!(ManualFormat::from_path(Path::new("manual.txt")), None);
        assert_eq!(ManualFormat::from_path(Path::new("manual")), None);
    }

    #[test]
    fn test_load_reports_missing_file_and_bad_format() {
        let err = ManualFile::load(Path::new("/nonexistent/manual.toml")).unwrap_err();
        assert!(matches!(err, ManualError::Io { .. }));

        let err = ManualFile::load(Path::new("manual.ini")).unwrap_err();
        assert!(matches!(err, ManualError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(TOML_MANUAL.as_bytes()).unwrap();

        let manual = ManualFile::load(file.path()).unwrap();
        assert_eq!(manual.steps.len(), 4);
    }

    #[test]
    fn test_build_declares_fields_and_checks() {
        let alerts = AlertQueue::new();
        let manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        let built = build(manual, &alerts);

        assert_eq!(built.steps.len(), 4);
        assert!(built.fields.get("commandField").is_some());
        assert!(built.fields.get("sector").is_some());
        assert_eq!(built.checks.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        // `has_validation` adds a check action, only explicit validation gates
        assert!(!built.steps[1].has_validation());
        assert!(built.steps[2].has_validation());
        assert!(!built.steps[3].has_validation());
        assert_eq!(built.meta.purpose, "Register a new material master record");
    }

    #[test]
    fn test_check_flag_leaves_navigation_free() {
        let alerts = AlertQueue::new();
        let manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        let built = build(manual, &alerts);
        let mut seq = StepSequencer::initialize(built.steps, NoopHook).unwrap();

        assert!(seq.advance());
        assert!(seq.advance());
        assert_eq!(seq.current_index(), 2);
        assert!(alerts.is_empty());

        // The check itself still runs on demand
        assert!(!built.checks[&1].confirm());
        assert_eq!(
            alerts.pop().as_deref(),
            Some("Enter MM01 or /nMM01 in the command field.")
        );
    }

    #[test]
    fn test_explicit_validation_gates_on_input() {
        let alerts = AlertQueue::new();
        let mut manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        manual.steps[1].validation = Some(ValidationEntry::Command {
            expected: None,
            field: None,
        });
        let built = build(manual, &alerts);
        let command = built.fields.get("commandField").cloned().unwrap();
        let sector = built.fields.get("sector").cloned().unwrap();
        let mut seq = StepSequencer::initialize(built.steps, NoopHook).unwrap();

        assert!(seq.advance());
        assert!(!seq.advance());
        assert_eq!(
            alerts.pop().as_deref(),
            Some("Enter MM01 or /nMM01 in the command field.")
        );
        assert!(command.is_focused());

        command.set_value("/nmm01");
        assert!(seq.advance());
        assert_eq!(seq.current_index(), 2);

        assert!(!seq.advance());
        assert_eq!(alerts.pop().as_deref(), Some("Enter M in the field."));
        sector.set_value("M");
        assert!(seq.advance());
        assert_eq!(seq.current_index(), 3);
    }

    #[test]
    fn test_input_check_uses_custom_success_message() {
        let alerts = AlertQueue::new();
        let mut manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        manual.steps[2].validation = Some(ValidationEntry::Input {
            field: "sector".to_string(),
            expected: "M".to_string(),
            success_message: Some("Rétt!".to_string()),
        });
        let built = build(manual, &alerts);

        let check = &built.checks[&2];
        assert_eq!(check.matcher(), &Matcher::Exact("M".to_string()));
        built.fields.get("sector").unwrap().set_value("m");
        assert!(!check.confirm());
        assert_eq!(alerts.pop().as_deref(), Some("Enter M in the field."));
    }

    #[test]
    fn test_build_rejects_step_without_content() {
        let manual = ManualFile::parse(
            "[[steps]]\ntitle = \"Empty\"\n",
            ManualFormat::Toml,
        )
        .unwrap();
        let renderer = TemplateRenderer::new(Labels::default()).unwrap();
        let notifier: SharedNotifier = Rc::new(AlertQueue::new());
        let (ack, _rx) = AckTimer::channel(DEFAULT_ACK_DELAY);

        let err = manual.build(&renderer, &notifier, &ack).err().unwrap();
        assert!(matches!(err, ManualError::MissingContent { index: 0, .. }));
    }

    #[test]
    fn test_build_rejects_unknown_input_field() {
        let mut manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        manual.steps[3].validation = Some(ValidationEntry::Input {
            field: "nowhere".to_string(),
            expected: "x".to_string(),
            success_message: None,
        });
        let renderer = TemplateRenderer::new(Labels::default()).unwrap();
        let notifier: SharedNotifier = Rc::new(AlertQueue::new());
        let (ack, _rx) = AckTimer::channel(DEFAULT_ACK_DELAY);

        let err = manual.build(&renderer, &notifier, &ack).err().unwrap();
        assert!(matches!(err, ManualError::UnknownField { index: 3, .. }));
    }

    #[test]
    fn test_manual_labels_override_per_key() {
        let mut manual = ManualFile::parse(TOML_MANUAL, ManualFormat::Toml).unwrap();
        let app = Labels {
            next: "Næsta skref →".to_string(),
            ..Labels::default()
        };
        assert_eq!(manual.effective_labels(&app).unwrap(), app);

        let overrides: Map<String, Value> =
            toml::from_str("restart = \"Byrja aftur\"").unwrap();
        manual.labels = Some(overrides);

        let labels = manual.effective_labels(&app).unwrap();
        assert_eq!(labels.restart, "Byrja aftur");
        // Keys the manual leaves out keep the configured value
        assert_eq!(labels.next, "Næsta skref →");
        assert_eq!(labels.previous, Labels::default().previous);
    }

    #[test]
    fn test_manual_labels_parse_from_file() {
        let source = format!("{TOML_MANUAL}\n[labels]\nlang = \"is\"\n");
        let manual = ManualFile::parse(&source, ManualFormat::Toml).unwrap();
        let labels = manual.effective_labels(&Labels::default()).unwrap();
        assert_eq!(labels.lang, "is");
        assert_eq!(labels.next, Labels::default().next);
    }
}
