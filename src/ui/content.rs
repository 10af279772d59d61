//! Terminal rendition of step content
//!
//! Named templates are laid out natively from the step data. Inline and
//! rendered markup is reduced to plain text lines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use crate::controls::TreeRows;
use crate::sequencer::{StepContent, StepDefinition};
use crate::templates::builders::{FormFieldOptions, DEFAULT_MENU_ITEMS};
use crate::templates::table::TableOptions;
use crate::templates::{
    form_fields, table_options, tree_rows, TemplateError, TemplateRenderer, DEFAULT_COMMAND_FIELD,
};

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|h[1-6]|tr|ul|ol|table)>")
        .expect("line break pattern must be valid")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern must be valid"));

/// Plain text lines from markup: block ends become line breaks, tags are
/// dropped, common entities decoded and blank lines collapsed.
pub fn markup_to_lines(markup: &str) -> Vec<String> {
    let broken = LINE_BREAK.replace_all(markup, "\n");
    let stripped = TAG.replace_all(&broken, "");
    let decoded = decode_entities(&stripped);

    let mut lines = Vec::new();
    for line in decoded.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, String::is_empty) {
            continue;
        }
        lines.push(line.to_string());
    }
    while lines.last().is_some_and(String::is_empty) {
        lines.pop();
    }
    lines
}

/// Single line of plain text from a markup fragment
pub fn markup_to_text(markup: &str) -> String {
    markup_to_lines(markup).join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// What a step shows in the terminal
#[derive(Debug, Clone, PartialEq)]
pub enum StepBody {
    Intro {
        description: String,
        points: Vec<String>,
        duration: String,
        skill: String,
    },
    Command {
        description: Option<String>,
        window_title: String,
        menu: Vec<String>,
        prompt: String,
        tip: String,
        field: String,
        checkable: bool,
    },
    Form {
        window_title: String,
        fields: Vec<FormFieldOptions>,
    },
    Table(TableOptions),
    Tree(TreeRows),
    Text(Vec<String>),
}

impl StepBody {
    pub fn from_step(
        step: &StepDefinition,
        renderer: &TemplateRenderer,
    ) -> Result<Self, TemplateError> {
        let name = match &step.content {
            StepContent::Inline(markup) => return Ok(StepBody::Text(markup_to_lines(markup))),
            StepContent::Rendered(render) => {
                return Ok(StepBody::Text(markup_to_lines(&render(step))))
            }
            StepContent::Named(name) => name.as_str(),
        };

        let labels = renderer.labels();
        let text_or = |key: &str, fallback: &str| {
            markup_to_text(step.field_str(key).unwrap_or(fallback))
        };

        let body = match name {
            "intro" => StepBody::Intro {
                description: text_or("description", &labels.intro_description),
                points: step
                    .data
                    .get("learning_points")
                    .and_then(Value::as_array)
                    .map(|points| {
                        points
                            .iter()
                            .filter_map(Value::as_str)
                            .map(markup_to_text)
                            .collect()
                    })
                    .unwrap_or_default(),
                duration: text_or("duration", &labels.default_duration),
                skill: text_or("skill", &labels.default_skill),
            },
            "command_input" => {
                let values = json!({ "command": step.field_str("command").unwrap_or_default() });
                let prompt = markup_to_text(&renderer.render_text(&labels.command_prompt, &values)?);
                let tip = match step.field_str("tip") {
                    Some(tip) => markup_to_text(tip),
                    None => markup_to_text(&renderer.render_text(&labels.command_tip, &values)?),
                };
                StepBody::Command {
                    description: step.field_str("description").map(markup_to_text),
                    window_title: text_or("window_title", "SAP Easy Access"),
                    menu: DEFAULT_MENU_ITEMS.iter().map(|s| (*s).to_string()).collect(),
                    prompt,
                    tip,
                    field: step
                        .field_str("input_id")
                        .unwrap_or(DEFAULT_COMMAND_FIELD)
                        .to_string(),
                    checkable: step.has_validation()
                        || step.data.get("has_validation").and_then(Value::as_bool)
                            == Some(true),
                }
            }
            "form" => StepBody::Form {
                window_title: text_or("window_title", &step.title),
                fields: form_fields(step)?,
            },
            "table" => StepBody::Table(table_options(step)?),
            "tree" => StepBody::Tree(tree_rows(step)?),
            other => {
                tracing::debug!(template = other, "Unknown template shows nothing");
                StepBody::Text(Vec::new())
            }
        };
        Ok(body)
    }

    /// Ids of fields the reader can type into, in display order
    pub fn input_ids(&self) -> Vec<String> {
        match self {
            StepBody::Command { field, .. } => vec![field.clone()],
            StepBody::Form { fields, .. } => fields
                .iter()
                .filter(|f| !f.readonly)
                .map(|f| f.id.clone())
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Labels;
    use serde_json::json;

    fn renderer() -> TemplateRenderer {
        TemplateRenderer::new(Labels::default()).unwrap()
    }

    fn named(template: &str, data: Value) -> StepDefinition {
        StepDefinition::new("Create purchase order", StepContent::named(template))
            .with_data(data.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn test_markup_to_lines() {
        let lines = markup_to_lines(
            "<h2>Done</h2>\n<p>The order <strong>4500001</strong> was saved.</p><p></p><ul><li>A &amp; B</li></ul>",
        );
        assert_eq!(
            lines,
            vec!["Done", "", "The order 4500001 was saved.", "", "A & B"]
        );
    }

    #[test]
    fn test_markup_to_text_joins_lines() {
        assert_eq!(markup_to_text("Enter <strong>ME21N</strong><br>now"), "Enter ME21N now");
    }

    #[test]
    fn test_intro_body_uses_defaults() {
        let step = named("intro", json!({"learning_points": ["Open <b>ME21N</b>"]}));
        let body = StepBody::from_step(&step, &renderer()).unwrap();
        let StepBody::Intro { points, duration, .. } = body else {
            panic!("expected intro body");
        };
        assert_eq!(points, vec!["Open ME21N"]);
        assert_eq!(duration, "About 5 minutes");
    }

    #[test]
    fn test_command_body() {
        let step = named("command_input", json!({"command": "ME21N", "has_validation": true}));
        let body = StepBody::from_step(&step, &renderer()).unwrap();
        assert_eq!(body.input_ids(), vec!["commandField"]);
        let StepBody::Command { prompt, checkable, window_title, .. } = body else {
            panic!("expected command body");
        };
        assert_eq!(prompt, "Enter ME21N in the command field and press Enter:");
        assert!(checkable);
        assert_eq!(window_title, "SAP Easy Access");
    }

    #[test]
    fn test_form_inputs_skip_readonly() {
        let step = named(
            "form",
            json!({"fields": [
                {"label": "Vendor", "id": "vendor", "readonly": true},
                {"label": "Plant", "id": "plant"}
            ]}),
        );
        let body = StepBody::from_step(&step, &renderer()).unwrap();
        assert_eq!(body.input_ids(), vec!["plant"]);
    }

    #[test]
    fn test_inline_and_unknown_content() {
        let inline = StepDefinition::new("A", StepContent::inline("<p>one</p><p>two</p>"));
        assert_eq!(
            StepBody::from_step(&inline, &renderer()).unwrap(),
            StepBody::Text(vec!["one".to_string(), "two".to_string()])
        );

        let unknown = named("nope", json!({}));
        assert_eq!(
            StepBody::from_step(&unknown, &renderer()).unwrap(),
            StepBody::Text(Vec::new())
        );
    }
}
