//! Handlebars-based step templates and HTML builders
//!
//! Built-in named templates:
//! - `intro`: description, learning points, duration and skill level
//! - `command_input`: simulated window with a command field
//! - `form`: simulated window with labelled form fields
//! - `table`: simple or advanced table
//! - `tree`: expandable menu tree
//!
//! Unknown template names render as empty markup.

pub mod builders;
pub mod table;

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::Labels;
use crate::controls::{TreeRow, TreeRows};
use crate::sequencer::{StepContent, StepDefinition};
use builders::{FormFieldOptions, WindowOptions};
use table::TableOptions;

/// Field id used by `command_input` steps that don't name one
pub const DEFAULT_COMMAND_FIELD: &str = "commandField";

const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    ("intro", include_str!("hbs/intro.hbs")),
    ("command_input", include_str!("hbs/command_input.hbs")),
    ("form", include_str!("hbs/form.hbs")),
    ("table", include_str!("hbs/table.hbs")),
    ("tree", include_str!("hbs/tree.hbs")),
    ("window", include_str!("hbs/window.hbs")),
    ("form_field", include_str!("hbs/form_field.hbs")),
    ("page", include_str!("hbs/page.hbs")),
];

/// Names that can be used as step content
pub const STEP_TEMPLATES: &[&str] = &["intro", "command_input", "form", "table", "tree"];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to register template: {0}")]
    Register(#[from] Box<handlebars::TemplateError>),

    #[error("failed to render template: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("invalid {field} for template {template}: {source}")]
    InvalidField {
        template: String,
        field: &'static str,
        source: serde_json::Error,
    },
}

pub struct TemplateRenderer {
    /// Escapes HTML; used for markup
    html: Handlebars<'static>,
    /// No escaping; used for plain-text messages
    text: Handlebars<'static>,
    labels: Labels,
}

impl TemplateRenderer {
    pub fn new(labels: Labels) -> Result<Self, TemplateError> {
        let mut html = Handlebars::new();
        html.set_strict_mode(false);
        for (name, source) in EMBEDDED_TEMPLATES {
            html.register_template_string(name, *source)
                .map_err(Box::new)?;
        }

        let mut text = Handlebars::new();
        text.set_strict_mode(false);
        text.register_escape_fn(handlebars::no_escape);

        Ok(Self { html, text, labels })
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Whether `name` can be used as step content
    pub fn has_step_template(&self, name: &str) -> bool {
        STEP_TEMPLATES.contains(&name)
    }

    /// Render a registered template by name
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, TemplateError> {
        Ok(self.html.render(name, data)?)
    }

    /// Render a label template as HTML
    pub fn render_markup(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.html.render_template(template, data)?)
    }

    /// Render a label template as plain text
    pub fn render_text(&self, template: &str, data: &Value) -> Result<String, TemplateError> {
        Ok(self.text.render_template(template, data)?)
    }

    pub fn window(&self, options: &WindowOptions) -> Result<String, TemplateError> {
        self.render("window", options)
    }

    pub fn form_field(&self, options: &FormFieldOptions) -> Result<String, TemplateError> {
        self.render("form_field", options)
    }

    /// Resolve a step's content to markup
    pub fn render_step(&self, step: &StepDefinition) -> Result<String, TemplateError> {
        match &step.content {
            StepContent::Inline(markup) => Ok(markup.clone()),
            StepContent::Rendered(render) => Ok(render(step)),
            StepContent::Named(name) => self.render_named(name, step),
        }
    }

    fn render_named(&self, name: &str, step: &StepDefinition) -> Result<String, TemplateError> {
        let mut context = self.step_context(step);

        match name {
            "intro" => {}
            "command_input" => self.prepare_command_input(step, &mut context)?,
            "form" => self.prepare_form(step, &mut context)?,
            "table" => {
                let options = table_options(step)?;
                context.insert("table_html".to_string(), Value::String(table::table(&options)));
            }
            "tree" => {
                let tree = tree_rows(step)?;
                context.insert("rows".to_string(), tree_context(&tree));
            }
            other => {
                tracing::debug!(template = other, step = %step.title, "Unknown template");
                return Ok(String::new());
            }
        }

        self.render(name, &Value::Object(context))
    }

    /// Step data, title, labels and the defaults every template relies on
    fn step_context(&self, step: &StepDefinition) -> Map<String, Value> {
        let mut context = match step.template_context() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        context.insert("labels".to_string(), json!(self.labels));

        let defaults = [
            ("description", self.labels.intro_description.as_str()),
            ("duration", self.labels.default_duration.as_str()),
            ("skill", self.labels.default_skill.as_str()),
        ];
        for (key, value) in defaults {
            context
                .entry(key)
                .or_insert_with(|| Value::String(value.to_string()));
        }
        context
    }

    fn prepare_command_input(
        &self,
        step: &StepDefinition,
        context: &mut Map<String, Value>,
    ) -> Result<(), TemplateError> {
        let command = step.field_str("command").unwrap_or_default();
        let input_id = step.field_str("input_id").unwrap_or(DEFAULT_COMMAND_FIELD);
        let values = json!({ "command": command });

        let prompt = self.render_markup(&self.labels.command_prompt, &values)?;
        let window = WindowOptions {
            title: step
                .field_str("window_title")
                .unwrap_or("SAP Easy Access")
                .to_string(),
            has_menu: true,
            has_toolbar: true,
            content: format!("<p class=\"wt-command-prompt\">{prompt}</p>"),
            toolbar_content: format!(
                "<div class=\"wt-button\"><span>↵</span></div>\
                 <input type=\"text\" class=\"wt-input\" id=\"{}\" placeholder=\"Command field\">",
                handlebars::html_escape(input_id)
            ),
            ..WindowOptions::default()
        };

        context.insert("window_html".to_string(), Value::String(self.window(&window)?));
        context.insert("input_id".to_string(), Value::String(input_id.to_string()));
        if step.has_validation() {
            context.insert("has_validation".to_string(), Value::Bool(true));
        }
        if !context.contains_key("tip") {
            let tip = self.render_markup(&self.labels.command_tip, &values)?;
            context.insert("tip".to_string(), Value::String(tip));
        }
        Ok(())
    }

    fn prepare_form(
        &self,
        step: &StepDefinition,
        context: &mut Map<String, Value>,
    ) -> Result<(), TemplateError> {
        let fields = form_fields(step)?;
        let mut body = String::new();
        for field in &fields {
            body.push_str(&self.form_field(field)?);
        }

        let window = WindowOptions {
            title: step
                .field_str("window_title")
                .unwrap_or(&step.title)
                .to_string(),
            has_menu: step.data.get("has_menu").and_then(Value::as_bool).unwrap_or(false),
            content: body,
            ..WindowOptions::default()
        };
        context.insert("window_html".to_string(), Value::String(self.window(&window)?));
        Ok(())
    }
}

fn invalid(template: &str, field: &'static str, source: serde_json::Error) -> TemplateError {
    TemplateError::InvalidField {
        template: template.to_string(),
        field,
        source,
    }
}

/// Form fields declared by a `form` step
pub fn form_fields(step: &StepDefinition) -> Result<Vec<FormFieldOptions>, TemplateError> {
    match step.data.get("fields") {
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| invalid("form", "fields", e))
        }
        None => Ok(Vec::new()),
    }
}

/// Table declared by a `table` step
pub fn table_options(step: &StepDefinition) -> Result<TableOptions, TemplateError> {
    match step.data.get("table") {
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| invalid("table", "table", e))
        }
        None => Ok(TableOptions::default()),
    }
}

/// Tree declared by a `tree` step
pub fn tree_rows(step: &StepDefinition) -> Result<TreeRows, TemplateError> {
    let rows: Vec<TreeRow> = match step.data.get("rows") {
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|e| invalid("tree", "rows", e))?
        }
        None => Vec::new(),
    };
    Ok(TreeRows::new(rows))
}

fn tree_context(tree: &TreeRows) -> Value {
    let rows: Vec<Value> = tree
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            json!({
                "label": row.label,
                "level": row.level,
                "indent": row.level * 20,
                "visible": row.visible,
                "has_children": tree.has_children(i),
                "expander": row.expander(),
            })
        })
        .collect();
    Value::Array(rows)
}
