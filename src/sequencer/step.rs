//! Step definitions handed to the sequencer

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// Predicate gating forward navigation past a step
pub type Validation = Box<dyn FnMut() -> bool>;

/// Callback fired when a step becomes current
pub type ShowCallback = Box<dyn FnMut()>;

/// Render function producing markup for a step
pub type RenderFn = Rc<dyn Fn(&StepDefinition) -> String>;

/// What a step displays. Opaque to the sequencer; resolved by the renderer.
#[derive(Clone)]
pub enum StepContent {
    /// A template registered under this name
    Named(String),
    /// Markup used as-is
    Inline(String),
    /// Markup produced on demand from the step itself
    Rendered(RenderFn),
}

impl StepContent {
    pub fn named(name: impl Into<String>) -> Self {
        StepContent::Named(name.into())
    }

    pub fn inline(markup: impl Into<String>) -> Self {
        StepContent::Inline(markup.into())
    }

    pub fn rendered(render: impl Fn(&StepDefinition) -> String + 'static) -> Self {
        StepContent::Rendered(Rc::new(render))
    }

    /// Template name, if this content refers to one
    pub fn template_name(&self) -> Option<&str> {
        match self {
            StepContent::Named(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Debug for StepContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepContent::Named(name) => f.debug_tuple("Named").field(name).finish(),
            StepContent::Inline(markup) => f.debug_tuple("Inline").field(&markup.len()).finish(),
            StepContent::Rendered(_) => f.write_str("Rendered(..)"),
        }
    }
}

/// One page of the walkthrough
pub struct StepDefinition {
    pub title: String,
    pub content: StepContent,
    /// Template fields (description, command, fields, table, ...)
    pub data: Map<String, Value>,
    pub(crate) validation: Option<Validation>,
    pub(crate) on_show: Option<ShowCallback>,
}

impl StepDefinition {
    pub fn new(title: impl Into<String>, content: StepContent) -> Self {
        Self {
            title: title.into(),
            content,
            data: Map::new(),
            validation: None,
            on_show: None,
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_validation(mut self, predicate: impl FnMut() -> bool + 'static) -> Self {
        self.validation = Some(Box::new(predicate));
        self
    }

    pub fn on_show(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_show = Some(Box::new(callback));
        self
    }

    pub fn has_validation(&self) -> bool {
        self.validation.is_some()
    }

    /// String template field, if present
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Template context: the step data plus its title
    pub fn template_context(&self) -> Value {
        let mut context = self.data.clone();
        context.insert("title".to_string(), Value::String(self.title.clone()));
        Value::Object(context)
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("title", &self.title)
            .field("content", &self.content)
            .field("data", &self.data)
            .field("validation", &self.validation.is_some())
            .field("on_show", &self.on_show.is_some())
            .finish()
    }
}
