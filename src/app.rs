use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::Frame;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::manual::ManualFile;
use crate::sequencer::StepSequencer;
use crate::templates::TemplateRenderer;
use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};
use crate::ui::{AlertDialog, HelpDialog, TuiView};
use crate::validation::{ack, AckTimer, Acknowledgment, AlertQueue, FieldCheck, InputField, SharedNotifier};

/// Columns scrolled per `h`/`l` press
const TABLE_SCROLL_STEP: i32 = 4;

pub struct App {
    config: Config,
    sequencer: StepSequencer<TuiView>,
    /// Check bound to Enter in a step's input, keyed by step index
    checks: BTreeMap<usize, FieldCheck>,
    alerts: AlertQueue,
    alert_dialog: AlertDialog,
    help_dialog: HelpDialog,
    acks: UnboundedReceiver<Acknowledgment>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, manual: ManualFile) -> Result<Self> {
        let labels = manual
            .effective_labels(&config.labels)
            .context("Failed to apply manual labels")?;
        let renderer = TemplateRenderer::new(labels).context("Failed to set up templates")?;

        let alerts = AlertQueue::new();
        let notifier: SharedNotifier = Rc::new(alerts.clone());
        let (ack_timer, acks) = AckTimer::channel(config.ui.ack_delay());

        let built = manual
            .build(&renderer, &notifier, &ack_timer)
            .context("Failed to build manual")?;
        let view = TuiView::new(
            built.meta,
            &built.steps,
            built.fields,
            &renderer,
            config.ui.min_thumb_width,
        )
        .context("Failed to lay out steps")?;
        let sequencer = StepSequencer::initialize(built.steps, view)?;

        Ok(Self {
            config,
            sequencer,
            checks: built.checks,
            alerts,
            alert_dialog: AlertDialog::new(),
            help_dialog: HelpDialog::new(),
            acks,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let (_guard, mut terminal) = TerminalGuard::enter()?;
        let tick_rate = self.config.ui.tick_rate();

        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            // Poll off the runtime thread so acknowledgment timers keep running
            let ready = tokio::task::spawn_blocking(move || event::poll(tick_rate)).await??;
            if ready {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            self.tick();
        }

        tracing::info!(step = self.sequencer.current_index(), "Walkthrough closed");
        Ok(())
    }

    pub fn sequencer(&self) -> &StepSequencer<TuiView> {
        &self.sequencer
    }

    pub fn alert_dialog(&self) -> &AlertDialog {
        &self.alert_dialog
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Apply fired acknowledgments and surface queued alerts
    pub fn tick(&mut self) {
        while let Ok(fired) = self.acks.try_recv() {
            ack::apply(fired, &mut self.sequencer, &self.alerts);
        }
        self.alert_dialog.take_from(&self.alerts);
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.sequencer.hook_mut().render(frame);
        self.help_dialog.render(frame);
        self.alert_dialog.render(frame);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // Alerts are modal
        if self.alert_dialog.is_visible() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.alert_dialog.dismiss();
            }
            return;
        }

        if self.help_dialog.visible {
            self.help_dialog.visible = false;
            return;
        }

        let focused = self.sequencer.hook().fields().focused().cloned();
        if let Some(field) = focused {
            self.handle_input_key(&field, key.code);
            self.tick();
            return;
        }

        let view = self.sequencer.hook_mut();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.help_dialog.toggle(),
            KeyCode::Right | KeyCode::Char('n') => {
                self.sequencer.next();
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.sequencer.retreat();
            }
            KeyCode::Home => self.sequencer.restart(),
            KeyCode::Up => view.scroll_by(-1),
            KeyCode::Down => view.scroll_by(1),
            KeyCode::Tab => {
                view.focus_next_input();
            }
            KeyCode::Char('h') => view.scroll_table(-TABLE_SCROLL_STEP),
            KeyCode::Char('l') => view.scroll_table(TABLE_SCROLL_STEP),
            KeyCode::Char('j') => view.move_cursor(1),
            KeyCode::Char('k') => view.move_cursor(-1),
            KeyCode::Char(' ') => view.toggle_row(),
            KeyCode::Char('a') => view.toggle_all_rows(),
            KeyCode::Char('[') => view.prev_tab(),
            KeyCode::Char(']') => view.next_tab(),
            KeyCode::Char('t') => view.toggle_tree_node(),
            KeyCode::Enter => {
                if let Some(action) = view.activate_row() {
                    self.run_action(&action);
                }
            }
            _ => {}
        }
        self.tick();
    }

    /// Run the `data-action` of an activated element
    fn run_action(&mut self, action: &str) {
        match action {
            "next-step" => {
                self.sequencer.next();
            }
            "previous-step" => {
                self.sequencer.retreat();
            }
            "restart" => self.sequencer.restart(),
            other => tracing::debug!(action = other, "Row action has no handler"),
        }
    }

    fn handle_input_key(&mut self, field: &InputField, key: KeyCode) {
        match key {
            KeyCode::Enter => self.check_field(field),
            KeyCode::Esc => self.sequencer.hook().fields().blur_all(),
            KeyCode::Tab => {
                self.sequencer.hook().focus_next_input();
            }
            KeyCode::Char(c) => field.insert_char(c),
            KeyCode::Backspace => field.backspace(),
            KeyCode::Delete => field.delete(),
            KeyCode::Left => field.move_left(),
            KeyCode::Right => field.move_right(),
            KeyCode::Home => field.move_home(),
            KeyCode::End => field.move_end(),
            _ => {}
        }
    }

    fn check_field(&mut self, field: &InputField) {
        let index = self.sequencer.current_index();
        match self.checks.get(&index) {
            Some(check) if check.field().id() == field.id() => {
                check.confirm();
            }
            _ => tracing::debug!(step = index, field = field.id(), "No check for this field"),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let view = self.sequencer.hook_mut();
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => view.mouse_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => view.mouse_drag(mouse.column),
            MouseEventKind::Up(MouseButton::Left) => view.mouse_up(),
            MouseEventKind::ScrollDown => view.scroll_by(1),
            MouseEventKind::ScrollUp => view.scroll_by(-1),
            _ => {}
        }
    }
}
