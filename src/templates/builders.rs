//! Option types and small HTML builders for simulated application chrome

use handlebars::html_escape;
use serde::{Deserialize, Serialize};

/// Menu entries shown when a window has a menu bar but none are given
pub const DEFAULT_MENU_ITEMS: &[&str] = &["Menu", "Edit", "Favorites", "Extras", "System"];

/// Simulated application window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    pub title: String,
    /// Extra class for the title bar
    pub titlebar_class: String,
    pub has_menu: bool,
    pub has_toolbar: bool,
    pub menu_items: Vec<String>,
    /// Window body markup
    pub content: String,
    /// Toolbar markup
    pub toolbar_content: String,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Window".to_string(),
            titlebar_class: String::new(),
            has_menu: false,
            has_toolbar: false,
            menu_items: DEFAULT_MENU_ITEMS.iter().map(|s| (*s).to_string()).collect(),
            content: String::new(),
            toolbar_content: String::new(),
        }
    }
}

/// Labelled text input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFieldOptions {
    pub label: String,
    pub id: String,
    pub value: String,
    pub readonly: bool,
    pub width: String,
}

impl Default for FormFieldOptions {
    fn default() -> Self {
        Self {
            label: String::new(),
            id: String::new(),
            value: String::new(),
            readonly: false,
            width: "200px".to_string(),
        }
    }
}

impl FormFieldOptions {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorShape {
    #[default]
    Circle,
    Box,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorSize {
    #[default]
    Normal,
    Small,
}

/// Marker drawn over something the reader should click
pub fn click_indicator(shape: IndicatorShape, size: IndicatorSize) -> String {
    let shape_class = match shape {
        IndicatorShape::Circle => "click-indicator",
        IndicatorShape::Box => "click-indicator-box",
    };
    let size_class = match size {
        IndicatorSize::Normal => "",
        IndicatorSize::Small => "click-indicator-small",
    };
    format!("<div class=\"{shape_class} {size_class}\"></div>")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusItem {
    #[serde(default)]
    pub icon: Option<String>,
    pub label: String,
    pub value: String,
}

pub fn status_panel(items: &[StatusItem]) -> String {
    let mut html = String::from("<div class=\"wt-status-panel\">");
    for item in items {
        html += &format!(
            "<div class=\"wt-status-item\"><span class=\"wt-status-icon\">{}</span>\
             <span class=\"wt-status-label\">{}</span>\
             <span class=\"wt-status-value\">{}</span></div>",
            item.icon.as_deref().unwrap_or("📄"),
            item.label,
            item.value
        );
    }
    html.push_str("</div>");
    html
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarButton {
    pub label: String,
    /// Emitted as a `data-action` attribute
    #[serde(default)]
    pub on_click: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BottomToolbar {
    #[serde(default)]
    pub buttons: Vec<ToolbarButton>,
}

/// Item dropdown on the left, action buttons on the right
pub fn bottom_toolbar(toolbar: &BottomToolbar) -> String {
    let mut html = String::from("<div class=\"wt-bottom-toolbar\">");
    html.push_str("<div class=\"wt-item-dropdown\"><label>Item</label>");
    html.push_str("<select><option>New Item</option></select></div>");

    html.push_str("<div class=\"wt-action-buttons\">");
    for button in &toolbar.buttons {
        html += &format!(
            "<button class=\"wt-action-button\" data-action=\"{}\">{}</button>",
            html_escape(button.on_click.as_deref().unwrap_or_default()),
            button.label
        );
    }
    html.push_str("</div></div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_indicator_classes() {
        assert_eq!(
            click_indicator(IndicatorShape::Circle, IndicatorSize::Normal),
            "<div class=\"click-indicator \"></div>"
        );
        assert_eq!(
            click_indicator(IndicatorShape::Box, IndicatorSize::Small),
            "<div class=\"click-indicator-box click-indicator-small\"></div>"
        );
    }

    #[test]
    fn test_status_panel_default_icon() {
        let html = status_panel(&[StatusItem {
            icon: None,
            label: "Vendor".to_string(),
            value: "1000".to_string(),
        }]);
        assert!(html.contains("📄"));
        assert!(html.contains("<span class=\"wt-status-value\">1000</span>"));
    }

    #[test]
    fn test_bottom_toolbar_buttons() {
        let html = bottom_toolbar(&BottomToolbar {
            buttons: vec![
                ToolbarButton {
                    label: "Save".to_string(),
                    on_click: Some("save".to_string()),
                },
                ToolbarButton {
                    label: "Cancel".to_string(),
                    on_click: None,
                },
            ],
        });
        assert!(html.contains("data-action=\"save\">Save</button>"));
        assert!(html.contains("data-action=\"\">Cancel</button>"));
        assert!(html.contains("New Item"));
    }

    #[test]
    fn test_window_defaults_include_standard_menu() {
        let window = WindowOptions::default();
        assert_eq!(window.menu_items.len(), 5);
        assert_eq!(window.menu_items[0], "Menu");
        assert!(!window.has_menu);
    }
}
