//! Simple and advanced table markup

use handlebars::html_escape;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::builders::{
    bottom_toolbar, click_indicator, status_panel, BottomToolbar, IndicatorShape, IndicatorSize,
    StatusItem,
};

/// Rows rendered by an advanced table that has no data
pub const DEFAULT_EMPTY_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Simple,
    /// Any other kind renders as an advanced table
    #[serde(other)]
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Icon,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub header: String,
    pub field: String,
    #[serde(default)]
    pub align: Option<String>,
    /// Width class: narrow, medium, wide
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    #[serde(rename = "type")]
    pub kind: TableKind,
    pub columns: Vec<Column>,
    pub data: Vec<Map<String, Value>>,
    pub has_selection: bool,
    pub has_row_numbers: bool,
    pub has_scrolling: bool,
    pub tabs: Vec<String>,
    pub status_panel: Vec<StatusItem>,
    pub bottom_toolbar: Option<BottomToolbar>,
    pub empty_rows: Option<usize>,
}

impl TableOptions {
    /// Rows an advanced table renders: the data, or blank rows when empty
    pub fn row_count(&self) -> usize {
        if self.data.is_empty() {
            self.empty_rows.unwrap_or(DEFAULT_EMPTY_ROWS)
        } else {
            self.data.len()
        }
    }
}

/// Action run when a clickable row is activated, `None` for plain rows
pub fn row_action(row: &Map<String, Value>) -> Option<&str> {
    if row.get("clickable").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    Some(row.get("on_click").and_then(Value::as_str).unwrap_or_default())
}

/// Display text for a cell; missing and falsy values render empty
pub fn cell_text(row: &Map<String, Value>, field: &str) -> String {
    match row.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}

fn align_style(column: &Column) -> String {
    column
        .align
        .as_deref()
        .map(|align| format!(" style=\"text-align: {align}\""))
        .unwrap_or_default()
}

/// Generate a fresh table element id
pub fn new_table_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("walk-table-{}", &id[..9])
}

pub fn table(options: &TableOptions) -> String {
    match options.kind {
        TableKind::Simple => simple_table(options),
        TableKind::Advanced => advanced_table(options, &new_table_id()),
    }
}

pub fn simple_table(options: &TableOptions) -> String {
    let mut html = String::from("<table class=\"wt-table\"><thead><tr>");
    for column in &options.columns {
        html += &format!("<th>{}</th>", column.header);
    }
    html.push_str("</tr></thead><tbody>");

    for row in &options.data {
        let action = row_action(row);
        match action {
            Some(action) => {
                html += &format!(
                    "<tr class=\"clickable-area\" data-action=\"{}\">",
                    html_escape(action)
                );
            }
            None => html.push_str("<tr>"),
        }
        for (index, column) in options.columns.iter().enumerate() {
            let mut cell = cell_text(row, &column.field);
            // Indicator sits in the first cell until the row is clicked
            if index == 0 && action.is_some() {
                cell.push_str(&click_indicator(IndicatorShape::Circle, IndicatorSize::Small));
            }
            html += &format!("<td{}>{}</td>", align_style(column), cell);
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

pub fn advanced_table(options: &TableOptions, table_id: &str) -> String {
    let mut html = String::from("<div class=\"wt-table-container\">");

    if !options.tabs.is_empty() {
        html.push_str("<div class=\"wt-tab-container\">");
        for (index, tab) in options.tabs.iter().enumerate() {
            let active = if index == 0 { " active" } else { "" };
            html += &format!(
                "<div class=\"wt-tab{active}\" data-action=\"switch-tab\" data-table=\"{table_id}\" data-tab-index=\"{index}\">{tab}</div>"
            );
        }
        html.push_str("</div>");
    }

    if !options.status_panel.is_empty() {
        html.push_str(&status_panel(&options.status_panel));
    }

    html += &format!("<div class=\"wt-table-scroll-wrapper\" id=\"{table_id}-wrapper\">");
    html += &format!("<table class=\"wt-table-advanced\" id=\"{table_id}\"><thead><tr>");

    if options.has_selection {
        html += &format!(
            "<th class=\"narrow selection-col\"><input type=\"checkbox\" data-action=\"toggle-all-rows\" data-table=\"{table_id}\"></th>"
        );
    }
    if options.has_row_numbers {
        html.push_str("<th class=\"narrow\">#</th>");
    }
    for column in &options.columns {
        html += &format!(
            "<th class=\"{}\"{}>{}</th>",
            column.width.as_deref().unwrap_or("medium"),
            align_style(column),
            column.header
        );
    }
    html.push_str("</tr></thead><tbody>");

    let empty = Map::new();
    for i in 0..options.row_count() {
        let row = options.data.get(i).unwrap_or(&empty);
        html.push_str("<tr>");

        if options.has_selection {
            html.push_str("<td class=\"selection-col\"><input type=\"checkbox\"></td>");
        }
        if options.has_row_numbers {
            html += &format!("<td class=\"row-number\">{}</td>", i + 1);
        }

        for column in &options.columns {
            let value = cell_text(row, &column.field);
            let style = align_style(column);
            match column.kind {
                ColumnKind::Icon => {
                    let icon = if value.is_empty() {
                        String::new()
                    } else {
                        format!("<span class=\"icon-indicator\">{value}</span>")
                    };
                    html += &format!("<td class=\"icon-cell\"{style}>{icon}</td>");
                }
                ColumnKind::Input => {
                    html += &format!(
                        "<td{style}><input type=\"text\" class=\"wt-input\" value=\"{}\"></td>",
                        html_escape(&value)
                    );
                }
                ColumnKind::Text => {
                    html += &format!("<td{style}>{value}</td>");
                }
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");

    if options.has_scrolling {
        html += &format!(
            "<div class=\"wt-horizontal-scrollbar\" id=\"{table_id}-scrollbar\">\
             <div class=\"wt-scrollbar-track\"><div class=\"wt-scrollbar-thumb\" id=\"{table_id}-thumb\"></div></div></div>"
        );
    }

    html.push_str(
        "<div class=\"wt-table-navigation\"><div class=\"wt-table-nav-buttons\">\
         <button class=\"wt-table-nav-button\" title=\"First page\">◀◀</button>\
         <button class=\"wt-table-nav-button\" title=\"Previous page\">◀</button>\
         <button class=\"wt-table-nav-button\" title=\"Next page\">▶</button>\
         <button class=\"wt-table-nav-button\" title=\"Last page\">▶▶</button>\
         </div><span class=\"wt-table-nav-more\">...</span>\
         <button class=\"wt-table-nav-button\">⬆</button>\
         <button class=\"wt-table-nav-button\">⬇</button></div>",
    );

    if let Some(toolbar) = &options.bottom_toolbar {
        html.push_str(&bottom_toolbar(toolbar));
    }

    html.push_str("</div>");
    html
}
