//! Shared single-line input fields
//!
//! A field is a cheap `Rc` handle: the renderer edits it, validation
//! predicates read it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct FieldState {
    value: String,
    /// Cursor position in chars
    cursor: usize,
    placeholder: String,
    readonly: bool,
    highlighted: bool,
    focused: bool,
}

#[derive(Debug, Clone)]
pub struct InputField {
    id: String,
    state: Rc<RefCell<FieldState>>,
}

impl InputField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Rc::new(RefCell::new(FieldState::default())),
        }
    }

    pub fn with_value(self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn with_placeholder(self, placeholder: &str) -> Self {
        self.state.borrow_mut().placeholder = placeholder.to_string();
        self
    }

    pub fn readonly(self, readonly: bool) -> Self {
        self.state.borrow_mut().readonly = readonly;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        let mut state = self.state.borrow_mut();
        state.value = value.to_string();
        state.cursor = state.value.chars().count();
    }

    pub fn placeholder(&self) -> String {
        self.state.borrow().placeholder.clone()
    }

    pub fn is_readonly(&self) -> bool {
        self.state.borrow().readonly
    }

    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    pub fn is_highlighted(&self) -> bool {
        self.state.borrow().highlighted
    }

    pub fn highlight(&self) {
        self.state.borrow_mut().highlighted = true;
    }

    pub fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    pub fn focus(&self) {
        self.state.borrow_mut().focused = true;
    }

    pub fn blur(&self) {
        self.state.borrow_mut().focused = false;
    }

    pub fn insert_char(&self, c: char) {
        let mut state = self.state.borrow_mut();
        if state.readonly {
            return;
        }
        let at = byte_offset(&state.value, state.cursor);
        state.value.insert(at, c);
        state.cursor += 1;
        state.highlighted = false;
    }

    pub fn backspace(&self) {
        let mut state = self.state.borrow_mut();
        if state.readonly || state.cursor == 0 {
            return;
        }
        state.cursor -= 1;
        let at = byte_offset(&state.value, state.cursor);
        state.value.remove(at);
        state.highlighted = false;
    }

    pub fn delete(&self) {
        let mut state = self.state.borrow_mut();
        if state.readonly || state.cursor >= state.value.chars().count() {
            return;
        }
        let at = byte_offset(&state.value, state.cursor);
        state.value.remove(at);
        state.highlighted = false;
    }

    pub fn move_left(&self) {
        let mut state = self.state.borrow_mut();
        state.cursor = state.cursor.saturating_sub(1);
    }

    pub fn move_right(&self) {
        let mut state = self.state.borrow_mut();
        if state.cursor < state.value.chars().count() {
            state.cursor += 1;
        }
    }

    pub fn move_home(&self) {
        self.state.borrow_mut().cursor = 0;
    }

    pub fn move_end(&self) {
        let mut state = self.state.borrow_mut();
        state.cursor = state.value.chars().count();
    }
}

fn byte_offset(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(value.len())
}

/// Fields of a walkthrough, keyed by id
#[derive(Debug, Default, Clone)]
pub struct FieldRegistry {
    fields: BTreeMap<String, InputField>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the field with this id, creating an empty one if needed
    pub fn get_or_create(&mut self, id: &str) -> InputField {
        self.fields
            .entry(id.to_string())
            .or_insert_with(|| InputField::new(id))
            .clone()
    }

    pub fn insert(&mut self, field: InputField) {
        self.fields.insert(field.id().to_string(), field);
    }

    pub fn get(&self, id: &str) -> Option<&InputField> {
        self.fields.get(id)
    }

    pub fn blur_all(&self) {
        for field in self.fields.values() {
            field.blur();
        }
    }

    /// The field currently holding focus, if any
    pub fn focused(&self) -> Option<&InputField> {
        self.fields.values().find(|f| f.is_focused())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
