//! Standalone HTML document that mirrors the sequencer state

use serde::Serialize;
use serde_json::json;

use crate::config::Labels;
use crate::manual::ManualMeta;
use crate::sequencer::{NextAction, ShowHook, StepDefinition, StepView};
use crate::templates::{TemplateError, TemplateRenderer};

/// Label shown on the first marker and on every completed one
pub const COMPLETED_MARK: &str = "✓";

/// Regions the page contains. A missing region is skipped on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub title: bool,
    pub purpose: bool,
    pub warnings: bool,
    pub overview: bool,
    pub progress: bool,
    pub containers: bool,
    pub prev_button: bool,
    pub next_button: bool,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            title: true,
            purpose: true,
            warnings: true,
            overview: true,
            progress: true,
            containers: true,
            prev_button: true,
            next_button: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerState {
    Neutral,
    Active,
    Completed,
}

impl MarkerState {
    fn class(self) -> &'static str {
        match self {
            MarkerState::Neutral => "",
            MarkerState::Active => "active",
            MarkerState::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressMarker {
    pub id: String,
    pub label: String,
    pub state: MarkerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepContainer {
    pub id: String,
    pub html: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavButton {
    pub action: &'static str,
    pub label: String,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
struct WarningView {
    title: String,
    text: String,
}

#[derive(Debug)]
pub struct HtmlPage {
    layout: PageLayout,
    lang: String,
    meta: ManualMeta,
    overview: Vec<String>,
    markers: Vec<ProgressMarker>,
    containers: Vec<StepContainer>,
    prev: NavButton,
    next: NavButton,
    next_label: String,
    restart_label: String,
    warning_title: String,
    scroll_top: u32,
}

impl HtmlPage {
    /// Pre-render every step and lay out the regions.
    ///
    /// Nothing is active until the sequencer shows the first step.
    pub fn build(
        meta: ManualMeta,
        steps: &[StepDefinition],
        renderer: &TemplateRenderer,
        layout: PageLayout,
    ) -> Result<Self, TemplateError> {
        let labels: &Labels = renderer.labels();

        let containers = if layout.containers {
            steps
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    Ok(StepContainer {
                        id: format!("step{i}"),
                        html: renderer.render_step(step)?,
                        active: false,
                    })
                })
                .collect::<Result<Vec<_>, TemplateError>>()?
        } else {
            Vec::new()
        };

        let markers = if layout.progress {
            (0..steps.len())
                .map(|i| ProgressMarker {
                    id: format!("prog{i}"),
                    label: if i == 0 {
                        COMPLETED_MARK.to_string()
                    } else {
                        i.to_string()
                    },
                    state: MarkerState::Neutral,
                })
                .collect()
        } else {
            Vec::new()
        };

        let overview = if layout.overview {
            steps.iter().skip(1).map(|s| s.title.clone()).collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            layout,
            lang: labels.lang.clone(),
            meta,
            overview,
            markers,
            containers,
            prev: NavButton {
                action: "previous-step",
                label: labels.previous.clone(),
                visible: false,
            },
            next: NavButton {
                action: "next-step",
                label: labels.next.clone(),
                visible: true,
            },
            next_label: labels.next.clone(),
            restart_label: labels.restart.clone(),
            warning_title: labels.warning_title.clone(),
            scroll_top: 0,
        })
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    pub fn markers(&self) -> &[ProgressMarker] {
        &self.markers
    }

    pub fn containers(&self) -> &[StepContainer] {
        &self.containers
    }

    /// Id of the visible step container
    pub fn active_container(&self) -> Option<&str> {
        self.containers
            .iter()
            .find(|c| c.active)
            .map(|c| c.id.as_str())
    }

    pub fn prev_button(&self) -> Option<&NavButton> {
        self.layout.prev_button.then_some(&self.prev)
    }

    pub fn next_button(&self) -> Option<&NavButton> {
        self.layout.next_button.then_some(&self.next)
    }

    pub fn overview(&self) -> &[String] {
        &self.overview
    }

    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.scroll_top = offset;
    }

    /// The whole page as an HTML document
    pub fn render_document(&self, renderer: &TemplateRenderer) -> Result<String, TemplateError> {
        let warnings: Vec<WarningView> = if self.layout.warnings {
            self.meta
                .warnings
                .iter()
                .map(|w| WarningView {
                    title: w.title.clone().unwrap_or_else(|| self.warning_title.clone()),
                    text: w.text.clone(),
                })
                .collect()
        } else {
            Vec::new()
        };

        let markers: Vec<_> = self
            .markers
            .iter()
            .map(|m| json!({ "id": m.id, "label": m.label, "class": m.state.class() }))
            .collect();

        let context = json!({
            "lang": self.lang,
            "title": self.meta.title,
            "has_title": self.layout.title && !self.meta.title.is_empty(),
            "purpose": self.meta.purpose,
            "has_purpose": self.layout.purpose && !self.meta.purpose.is_empty(),
            "warnings": warnings,
            "overview": self.overview,
            "markers": markers,
            "containers": self.containers,
            "prev": self.prev_button(),
            "next": self.next_button(),
        });
        renderer.render("page", &context)
    }
}

impl ShowHook for HtmlPage {
    fn on_show(&mut self, view: &StepView<'_>) {
        for (i, container) in self.containers.iter_mut().enumerate() {
            container.active = i == view.index;
        }

        for (i, marker) in self.markers.iter_mut().enumerate() {
            marker.state = match i.cmp(&view.index) {
                std::cmp::Ordering::Less => {
                    marker.label = COMPLETED_MARK.to_string();
                    MarkerState::Completed
                }
                std::cmp::Ordering::Equal => MarkerState::Active,
                std::cmp::Ordering::Greater => MarkerState::Neutral,
            };
        }

        self.prev.visible = view.show_previous();
        self.next.label = match view.next_action() {
            NextAction::Restart => self.restart_label.clone(),
            NextAction::Advance => self.next_label.clone(),
        };
        self.scroll_top = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::Warning;
    use crate::sequencer::{StepContent, StepSequencer};

    fn steps() -> Vec<StepDefinition> {
        vec![
            StepDefinition::new("Intro", StepContent::inline("<p>intro</p>")),
            StepDefinition::new("Open ME21N", StepContent::inline("<p>one</p>")),
            StepDefinition::new("Save", StepContent::inline("<p>two</p>")),
        ]
    }

    fn meta() -> ManualMeta {
        ManualMeta {
            title: "Purchase order".to_string(),
            purpose: "Create a purchase order".to_string(),
            warnings: vec![Warning {
                title: None,
                text: "Use the test client.".to_string(),
            }],
        }
    }

    fn sequencer(layout: PageLayout) -> (StepSequencer<HtmlPage>, TemplateRenderer) {
        let renderer = TemplateRenderer::new(Labels::default()).unwrap();
        let steps = steps();
        let page = HtmlPage::build(meta(), &steps, &renderer, layout).unwrap();
        (StepSequencer::initialize(steps, page).unwrap(), renderer)
    }

    fn labels(page: &HtmlPage) -> Vec<&str> {
        page.markers().iter().map(|m| m.label.as_str()).collect()
    }

    #[test]
    fn test_first_step_state() {
        let (seq, _) = sequencer(PageLayout::default());
        let page = seq.hook();

        assert_eq!(page.active_container(), Some("step0"));
        assert_eq!(labels(page), vec!["✓", "1", "2"]);
        assert_eq!(page.markers()[0].state, MarkerState::Active);
        assert!(!page.prev_button().unwrap().visible);
        assert_eq!(page.next_button().unwrap().label, "Next step →");
        assert_eq!(page.overview(), ["Open ME21N", "Save"]);
    }

    #[test]
    fn test_markers_complete_and_stay_checked() {
        let (mut seq, _) = sequencer(PageLayout::default());
        seq.go_to(2).unwrap();
        assert_eq!(labels(seq.hook()), vec!["✓", "✓", "2"]);
        assert_eq!(seq.hook().markers()[1].state, MarkerState::Completed);
        assert_eq!(seq.hook().markers()[2].state, MarkerState::Active);

        seq.go_to(0).unwrap();
        assert_eq!(labels(seq.hook()), vec!["✓", "✓", "2"]);
        assert_eq!(seq.hook().markers()[1].state, MarkerState::Neutral);
    }

    #[test]
    fn test_terminal_step_offers_restart() {
        let (mut seq, _) = sequencer(PageLayout::default());
        seq.go_to(2).unwrap();
        let page = seq.hook();
        assert_eq!(page.next_button().unwrap().label, "Start over");
        assert!(page.prev_button().unwrap().visible);

        seq.next();
        assert_eq!(seq.hook().next_button().unwrap().label, "Next step →");
    }

    #[test]
    fn test_transition_resets_scroll() {
        let (mut seq, _) = sequencer(PageLayout::default());
        seq.hook_mut().scroll_to(420);
        seq.advance();
        assert_eq!(seq.hook().scroll_top(), 0);
    }

    #[test]
    fn test_missing_regions_are_skipped() {
        let layout = PageLayout {
            progress: false,
            containers: false,
            prev_button: false,
            ..PageLayout::default()
        };
        let (mut seq, renderer) = sequencer(layout);
        assert!(seq.advance());
        assert!(seq.advance());
        assert!(seq.hook().markers().is_empty());
        assert!(seq.hook().prev_button().is_none());

        let html = seq.hook().render_document(&renderer).unwrap();
        assert!(!html.contains("progress-indicator"));
        assert!(!html.contains("prevBtn"));
        assert!(html.contains("id=\"nextBtn\""));
    }

    #[test]
    fn test_document_reflects_current_step() {
        let (mut seq, renderer) = sequencer(PageLayout::default());
        seq.advance();
        let html = seq.hook().render_document(&renderer).unwrap();

        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<h1 id=\"manual-title\">Purchase order</h1>"));
        assert!(html.contains("<strong>⚠️ Note:</strong><br>Use the test client."));
        assert!(html.contains("class=\"wt-step-container active\" id=\"step1\""));
        assert!(html.contains("class=\"wt-step-container\" id=\"step0\""));
        assert!(html.contains("class=\"wt-progress-step completed\" id=\"prog0\""));
        assert!(html.contains("data-action=\"previous-step\" style=\"display: block\""));
        assert!(html.contains("<li>Open ME21N</li>"));
    }
}
