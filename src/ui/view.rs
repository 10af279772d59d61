//! Terminal collaborator: header with progress markers, the current step,
//! and a footer with the navigation controls.

use std::collections::BTreeSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::content::StepBody;
use crate::config::Labels;
use crate::controls::{RowSelection, Scrollbar, TabStrip, ThumbDrag, TreeRows};
use crate::manual::ManualMeta;
use crate::page::{MarkerState, COMPLETED_MARK};
use crate::sequencer::{NextAction, ShowHook, StepDefinition, StepView};
use crate::templates::table::{cell_text, row_action, TableKind, TableOptions};
use crate::templates::{TemplateError, TemplateRenderer};
use crate::validation::{FieldRegistry, InputField};

/// Interactive state of a table step
#[derive(Debug)]
pub struct TableView {
    options: TableOptions,
    selection: RowSelection,
    tabs: TabStrip,
    cursor: usize,
    offset: u16,
    drag: Option<ThumbDrag>,
    /// Scrollbar and its track from the last draw
    track: Option<(Rect, Scrollbar)>,
    /// Clickable rows already activated; their indicator is hidden
    clicked: BTreeSet<usize>,
}

impl TableView {
    fn new(options: TableOptions) -> Self {
        Self {
            selection: RowSelection::new(options.row_count()),
            tabs: TabStrip::new(options.tabs.clone()),
            cursor: 0,
            offset: 0,
            drag: None,
            track: None,
            clicked: BTreeSet::new(),
            options,
        }
    }

    fn is_advanced(&self) -> bool {
        self.options.kind == TableKind::Advanced
    }

    fn row_count(&self) -> usize {
        if self.is_advanced() {
            self.options.row_count()
        } else {
            self.options.data.len()
        }
    }

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    pub fn tabs(&self) -> &TabStrip {
        &self.tabs
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// Whether a clickable row still shows its indicator
    pub fn shows_indicator(&self, row: usize) -> bool {
        self.row_action(row).is_some() && !self.clicked.contains(&row)
    }

    fn row_action(&self, row: usize) -> Option<&str> {
        self.options.data.get(row).and_then(row_action)
    }

    fn has_clickable_rows(&self) -> bool {
        self.options.data.iter().any(|row| row_action(row).is_some())
    }

    fn column_widths(&self) -> Vec<usize> {
        self.options
            .columns
            .iter()
            .map(|column| {
                let widest = self
                    .options
                    .data
                    .iter()
                    .map(|row| cell_text(row, &column.field).chars().count())
                    .max()
                    .unwrap_or(0);
                widest.max(column.header.chars().count()).max(4) + 2
            })
            .collect()
    }

    fn row_number_width(&self) -> usize {
        self.row_count().to_string().len() + 1
    }

    fn header_text(&self, widths: &[usize]) -> String {
        let mut text = String::new();
        if self.has_clickable_rows() {
            text.push_str("  ");
        }
        if self.is_advanced() && self.options.has_selection {
            text.push_str(checkbox(self.selection.header_checked()));
        }
        if self.is_advanced() && self.options.has_row_numbers {
            text.push_str(&" ".repeat(self.row_number_width()));
        }
        for (column, width) in self.options.columns.iter().zip(widths) {
            text.push_str(&pad(&column.header, *width));
        }
        text
    }

    fn row_text(&self, row: usize, widths: &[usize]) -> String {
        let mut text = String::new();
        if self.has_clickable_rows() {
            text.push_str(if self.shows_indicator(row) { "● " } else { "  " });
        }
        if self.is_advanced() && self.options.has_selection {
            text.push_str(checkbox(self.selection.is_checked(row)));
        }
        if self.is_advanced() && self.options.has_row_numbers {
            text.push_str(&pad(&(row + 1).to_string(), self.row_number_width()));
        }
        for (column, width) in self.options.columns.iter().zip(widths) {
            let cell = self
                .options
                .data
                .get(row)
                .map(|data| cell_text(data, &column.field))
                .unwrap_or_default();
            text.push_str(&pad(&cell, *width));
        }
        text
    }
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x] "
    } else {
        "[ ] "
    }
}

fn pad(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{truncated:<width$}")
}

/// Window of `text` starting `offset` chars in, at most `width` chars long
fn slice(text: &str, offset: u16, width: u16) -> String {
    text.chars()
        .skip(usize::from(offset))
        .take(usize::from(width))
        .collect()
}

/// Interactive state of a tree step
#[derive(Debug)]
pub struct TreeView {
    rows: TreeRows,
    /// Position among the visible rows
    cursor: usize,
}

impl TreeView {
    pub fn rows(&self) -> &TreeRows {
        &self.rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[derive(Debug)]
enum Widget {
    None,
    Table(TableView),
    Tree(TreeView),
}

#[derive(Debug)]
struct StepScreen {
    title: String,
    body: StepBody,
    widget: Widget,
}

pub struct TuiView {
    meta: ManualMeta,
    labels: Labels,
    screens: Vec<StepScreen>,
    fields: FieldRegistry,
    index: usize,
    total: usize,
    markers: Vec<MarkerState>,
    completed: Vec<bool>,
    show_previous: bool,
    next_label: String,
    scroll: u16,
    min_thumb: u16,
}

impl TuiView {
    pub fn new(
        meta: ManualMeta,
        steps: &[StepDefinition],
        fields: FieldRegistry,
        renderer: &TemplateRenderer,
        min_thumb: u16,
    ) -> Result<Self, TemplateError> {
        let screens = steps
            .iter()
            .map(|step| {
                let body = StepBody::from_step(step, renderer)?;
                let widget = match &body {
                    StepBody::Table(options) => Widget::Table(TableView::new(options.clone())),
                    StepBody::Tree(rows) => Widget::Tree(TreeView {
                        rows: rows.clone(),
                        cursor: 0,
                    }),
                    _ => Widget::None,
                };
                Ok(StepScreen {
                    title: step.title.clone(),
                    body,
                    widget,
                })
            })
            .collect::<Result<Vec<_>, TemplateError>>()?;

        let labels = renderer.labels().clone();
        Ok(Self {
            meta,
            total: screens.len(),
            markers: vec![MarkerState::Neutral; screens.len()],
            completed: vec![false; screens.len()],
            screens,
            fields,
            index: 0,
            show_previous: false,
            next_label: labels.next.clone(),
            labels,
            scroll: 0,
            min_thumb,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn markers(&self) -> &[MarkerState] {
        &self.markers
    }

    /// Marker label: ✓ for the first and every completed step
    pub fn marker_label(&self, index: usize) -> String {
        if index == 0 || self.completed.get(index).copied().unwrap_or(false) {
            COMPLETED_MARK.to_string()
        } else {
            index.to_string()
        }
    }

    pub fn show_previous(&self) -> bool {
        self.show_previous
    }

    pub fn next_label(&self) -> &str {
        &self.next_label
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    /// Editable fields of the current step
    pub fn current_inputs(&self) -> Vec<InputField> {
        self.screens
            .get(self.index)
            .map(|screen| {
                screen
                    .body
                    .input_ids()
                    .iter()
                    .filter_map(|id| self.fields.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Focus the next editable field of the current step, wrapping around
    pub fn focus_next_input(&self) -> Option<InputField> {
        let inputs = self.current_inputs();
        if inputs.is_empty() {
            return None;
        }
        let next = inputs
            .iter()
            .position(InputField::is_focused)
            .map_or(0, |i| (i + 1) % inputs.len());
        self.fields.blur_all();
        inputs[next].focus();
        Some(inputs[next].clone())
    }

    pub fn table(&self) -> Option<&TableView> {
        match &self.screens.get(self.index)?.widget {
            Widget::Table(table) => Some(table),
            _ => None,
        }
    }

    fn table_mut(&mut self) -> Option<&mut TableView> {
        match &mut self.screens.get_mut(self.index)?.widget {
            Widget::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn tree(&self) -> Option<&TreeView> {
        match &self.screens.get(self.index)?.widget {
            Widget::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    fn tree_mut(&mut self) -> Option<&mut TreeView> {
        match &mut self.screens.get_mut(self.index)?.widget {
            Widget::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Scroll the current table horizontally
    pub fn scroll_table(&mut self, delta: i32) {
        if let Some(table) = self.table_mut() {
            let max = table.track.map_or(0, |(_, bar)| bar.max_scroll());
            table.offset = (i32::from(table.offset) + delta).clamp(0, i32::from(max)) as u16;
        }
    }

    /// Move the table or tree cursor
    pub fn move_cursor(&mut self, delta: i32) {
        let step = |cursor: usize, len: usize| {
            if len == 0 {
                return 0;
            }
            (cursor as i64 + i64::from(delta)).clamp(0, len as i64 - 1) as usize
        };
        if let Some(table) = self.table_mut() {
            table.cursor = step(table.cursor, table.row_count());
        } else if let Some(tree) = self.tree_mut() {
            let visible = tree.rows.visible_indices().len();
            tree.cursor = step(tree.cursor, visible);
        }
    }

    /// Activate the clickable row under the cursor: hide its indicator and
    /// return the action it runs
    pub fn activate_row(&mut self) -> Option<String> {
        let table = self.table_mut()?;
        let action = table.row_action(table.cursor)?.to_string();
        table.clicked.insert(table.cursor);
        Some(action)
    }

    pub fn toggle_row(&mut self) {
        if let Some(table) = self.table_mut() {
            if table.options.has_selection {
                table.selection.toggle_row(table.cursor);
            }
        }
    }

    pub fn toggle_all_rows(&mut self) {
        if let Some(table) = self.table_mut() {
            if table.options.has_selection {
                table.selection.toggle_all();
            }
        }
    }

    pub fn next_tab(&mut self) {
        if let Some(table) = self.table_mut() {
            table.tabs.next();
        }
    }

    pub fn prev_tab(&mut self) {
        if let Some(table) = self.table_mut() {
            table.tabs.prev();
        }
    }

    pub fn toggle_tree_node(&mut self) {
        if let Some(tree) = self.tree_mut() {
            let visible = tree.rows.visible_indices();
            if let Some(&row) = visible.get(tree.cursor) {
                tree.rows.toggle(row);
            }
            let remaining = tree.rows.visible_indices().len();
            tree.cursor = tree.cursor.min(remaining.saturating_sub(1));
        }
    }

    /// Start dragging when the press lands on the scrollbar thumb
    pub fn mouse_down(&mut self, column: u16, row: u16) {
        let Some(table) = self.table_mut() else {
            return;
        };
        let Some((track, bar)) = table.track else {
            return;
        };
        if row != track.y || column < track.x || column >= track.x + track.width {
            return;
        }
        if let Some(thumb) = bar.thumb(table.offset) {
            let x = column - track.x;
            if x >= thumb.left && x < thumb.left + thumb.width {
                table.drag = Some(ThumbDrag::begin(x, thumb.left));
            }
        }
    }

    pub fn mouse_drag(&mut self, column: u16) {
        let Some(table) = self.table_mut() else {
            return;
        };
        let (Some(drag), Some((track, bar))) = (table.drag, table.track) else {
            return;
        };
        if let Some(thumb) = bar.thumb(table.offset) {
            let (_, offset) = drag.drag_to(column.saturating_sub(track.x), &bar, thumb.width);
            table.offset = offset;
        }
    }

    pub fn mouse_up(&mut self) {
        if let Some(table) = self.table_mut() {
            table.drag = None;
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);
        self.render_step(frame, chunks[1]);
        self.render_footer(frame, chunks[2]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (i, state) in self.markers.iter().enumerate() {
            let style = match state {
                MarkerState::Active => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                MarkerState::Completed => Style::default().fg(Color::Green),
                MarkerState::Neutral => Style::default().fg(Color::DarkGray),
            };
            spans.push(Span::styled(format!(" {} ", self.marker_label(i)), style));
            spans.push(Span::raw(" "));
        }
        if let Some(screen) = self.screens.get(self.index) {
            spans.push(Span::styled(
                format!(" {}/{}  {}", self.index + 1, self.total, screen.title),
                Style::default().fg(Color::Gray),
            ));
        }

        let title = if self.meta.title.is_empty() {
            " Walkthrough ".to_string()
        } else {
            format!(" {} ", self.meta.title)
        };
        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(header, area);
    }

    fn render_step(&mut self, frame: &mut Frame, area: Rect) {
        let min_thumb = self.min_thumb;
        let scroll = self.scroll;
        let Some(screen) = self.screens.get_mut(self.index) else {
            return;
        };

        let block = Block::default()
            .title(format!(" {} ", screen.title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Widget::Table(table) = &mut screen.widget {
            render_table(frame, inner, table, min_thumb);
            return;
        }

        let lines = body_lines(&screen.body, &screen.widget, &self.fields, &self.labels);
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        frame.render_widget(paragraph, inner);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let button = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        if self.show_previous {
            spans.push(Span::styled(format!(" {} ", self.labels.previous), button));
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(format!(" {} ", self.next_label), button));
        spans.push(Span::styled(
            "   ? help  q quit",
            Style::default().fg(Color::DarkGray),
        ));

        let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
    }
}

impl ShowHook for TuiView {
    fn on_show(&mut self, view: &StepView<'_>) {
        self.index = view.index;
        self.total = view.total;

        for (i, marker) in self.markers.iter_mut().enumerate() {
            *marker = match i.cmp(&view.index) {
                std::cmp::Ordering::Less => {
                    self.completed[i] = true;
                    MarkerState::Completed
                }
                std::cmp::Ordering::Equal => MarkerState::Active,
                std::cmp::Ordering::Greater => MarkerState::Neutral,
            };
        }

        self.show_previous = view.show_previous();
        self.next_label = match view.next_action() {
            NextAction::Restart => self.labels.restart.clone(),
            NextAction::Advance => self.labels.next.clone(),
        };
        self.scroll = 0;

        self.fields.blur_all();
        if let Some(first) = self.current_inputs().first() {
            first.focus();
        }
    }
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn window_lines(title: &str, menu: Option<&[String]>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!(" {title} "),
        Style::default().fg(Color::White).bg(Color::Blue),
    ))];
    if let Some(menu) = menu {
        lines.push(Line::from(Span::styled(
            menu.join("  "),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

/// An input field as spans: value (or placeholder) with a block cursor when focused
fn field_spans(field: &InputField) -> Vec<Span<'static>> {
    let value = field.value();
    let base = if field.is_highlighted() {
        Style::default().fg(Color::Black).bg(Color::Green)
    } else if field.is_readonly() {
        Style::default().fg(Color::DarkGray)
    } else if field.is_focused() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let mut spans = vec![Span::styled("[", base)];
    if value.is_empty() && !field.is_focused() {
        spans.push(Span::styled(
            field.placeholder(),
            Style::default().fg(Color::DarkGray),
        ));
    } else if field.is_focused() {
        let cursor = field.cursor();
        let before: String = value.chars().take(cursor).collect();
        let at: String = value.chars().nth(cursor).map_or(" ".to_string(), String::from);
        let after: String = value.chars().skip(cursor + 1).collect();
        spans.push(Span::styled(before, base));
        spans.push(Span::styled(at, base.add_modifier(Modifier::REVERSED)));
        spans.push(Span::styled(after, base));
    } else {
        spans.push(Span::styled(value, base));
    }
    spans.push(Span::styled("]", base));
    spans
}

fn body_lines(
    body: &StepBody,
    widget: &Widget,
    fields: &FieldRegistry,
    labels: &Labels,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match body {
        StepBody::Intro {
            description,
            points,
            duration,
            skill,
        } => {
            lines.push(Line::from(description.clone()));
            lines.push(Line::from(""));
            lines.push(heading(&labels.learn_heading));
            for point in points {
                lines.push(Line::from(vec![
                    Span::styled("  ✓ ", Style::default().fg(Color::Green)),
                    Span::raw(point.clone()),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(format!("{}: {duration}", labels.duration_label)));
            lines.push(Line::from(format!("{}: {skill}", labels.skill_label)));
        }
        StepBody::Command {
            description,
            window_title,
            menu,
            prompt,
            tip,
            field,
            checkable,
        } => {
            if let Some(description) = description {
                lines.push(Line::from(description.clone()));
                lines.push(Line::from(""));
            }
            lines.extend(window_lines(window_title, Some(menu)));
            lines.push(Line::from(prompt.clone()));
            if let Some(input) = fields.get(field) {
                let mut spans = vec![Span::raw("↵ ")];
                spans.extend(field_spans(input));
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}: ", labels.tip_label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(tip.clone()),
            ]));
            if *checkable {
                lines.push(Line::from(Span::styled(
                    format!("Enter: {}", labels.check_button),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
        StepBody::Form {
            window_title,
            fields: options,
        } => {
            lines.extend(window_lines(window_title, None));
            for option in options {
                let mut spans = vec![Span::raw(format!("{:<24}", option.label))];
                if let Some(input) = fields.get(&option.id) {
                    spans.extend(field_spans(input));
                } else {
                    spans.push(Span::raw(format!("[{}]", option.value)));
                }
                lines.push(Line::from(spans));
            }
        }
        StepBody::Tree(_) => {
            if let Widget::Tree(tree) = widget {
                for (position, index) in tree.rows.visible_indices().into_iter().enumerate() {
                    let row = &tree.rows.rows()[index];
                    let expander = if tree.rows.has_children(index) {
                        row.expander()
                    } else {
                        " "
                    };
                    let text = format!("{}{expander} {}", "  ".repeat(row.level), row.label);
                    let style = if position == tree.cursor {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    lines.push(Line::from(Span::styled(text, style)));
                }
            }
        }
        StepBody::Text(text) => {
            lines.extend(text.iter().map(|line| Line::from(line.clone())));
        }
        StepBody::Table(_) => {}
    }
    lines
}

fn render_table(frame: &mut Frame, area: Rect, table: &mut TableView, min_thumb: u16) {
    let mut top: Vec<Line> = Vec::new();
    if !table.tabs.is_empty() {
        let mut spans = Vec::new();
        for (i, title) in table.tabs.titles().iter().enumerate() {
            let style = if i == table.tabs.active() {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {title} "), style));
            spans.push(Span::raw(" "));
        }
        top.push(Line::from(spans));
    }
    if !table.options.status_panel.is_empty() {
        let items: Vec<String> = table
            .options
            .status_panel
            .iter()
            .map(|item| {
                format!(
                    "{} {}: {}",
                    item.icon.as_deref().unwrap_or("📄"),
                    item.label,
                    item.value
                )
            })
            .collect();
        top.push(Line::from(items.join("   ")));
    }
    let toolbar = table.options.bottom_toolbar.as_ref().map(|toolbar| {
        toolbar
            .buttons
            .iter()
            .map(|b| format!("[{}]", b.label))
            .collect::<Vec<_>>()
            .join(" ")
    });

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top.len() as u16),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(u16::from(toolbar.is_some())),
        ])
        .split(area);

    let widths = table.column_widths();
    let header = table.header_text(&widths);
    let content_width = header.chars().count() as u16;
    let viewport = chunks[1].width;
    let bar = Scrollbar::new(content_width, viewport, chunks[2].width, min_thumb);
    table.offset = table.offset.min(bar.max_scroll());
    table.track = Some((chunks[2], bar));

    let visible_rows = usize::from(chunks[1].height.saturating_sub(1));
    let first = table.cursor.saturating_sub(visible_rows.saturating_sub(1));
    let mut rows = vec![Line::from(Span::styled(
        slice(&header, table.offset, viewport),
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))];
    for row in (first..table.row_count()).take(visible_rows) {
        let style = if row == table.cursor {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        rows.push(Line::from(Span::styled(
            slice(&table.row_text(row, &widths), table.offset, viewport),
            style,
        )));
    }

    frame.render_widget(Paragraph::new(top), chunks[0]);
    frame.render_widget(Paragraph::new(rows), chunks[1]);

    if let Some(thumb) = bar.thumb(table.offset) {
        let track: String = (0..chunks[2].width)
            .map(|x| {
                if x >= thumb.left && x < thumb.left + thumb.width {
                    '█'
                } else {
                    '░'
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Span::styled(track, Style::default().fg(Color::Gray))),
            chunks[2],
        );
    }

    if let Some(toolbar) = toolbar {
        frame.render_widget(Paragraph::new(toolbar), chunks[3]);
    }
}
