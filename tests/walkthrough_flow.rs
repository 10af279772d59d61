//! End-to-end walkthroughs over the bundled demo manuals
//!
//! These load the files under `demos/`, build them the way the CLI does and
//! drive the sequencer through gates, acknowledgments and restarts.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use walkthrough::config::Config;
use walkthrough::manual::{BuiltManual, ManualFile};
use walkthrough::page::{HtmlPage, MarkerState, PageLayout};
use walkthrough::sequencer::StepSequencer;
use walkthrough::templates::TemplateRenderer;
use walkthrough::validation::{ack, AckTimer, Acknowledgment, AlertQueue, SharedNotifier};

use tokio::sync::mpsc::UnboundedReceiver;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name)
}

struct Session {
    sequencer: StepSequencer<HtmlPage>,
    renderer: TemplateRenderer,
    alerts: AlertQueue,
    checks: std::collections::BTreeMap<usize, walkthrough::validation::FieldCheck>,
    fields: walkthrough::validation::FieldRegistry,
    acks: UnboundedReceiver<Acknowledgment>,
}

impl Session {
    fn open(name: &str) -> Self {
        let manual = ManualFile::load(&demo(name)).unwrap();
        let config = Config::default();
        let labels = manual.effective_labels(&config.labels).unwrap();
        let renderer = TemplateRenderer::new(labels).unwrap();

        let alerts = AlertQueue::new();
        let notifier: SharedNotifier = Rc::new(alerts.clone());
        let (ack_timer, acks) = AckTimer::channel(config.ui.ack_delay());

        let BuiltManual {
            meta,
            steps,
            fields,
            checks,
        } = manual.build(&renderer, &notifier, &ack_timer).unwrap();
        let page = HtmlPage::build(meta, &steps, &renderer, PageLayout::default()).unwrap();

        Self {
            sequencer: StepSequencer::initialize(steps, page).unwrap(),
            renderer,
            alerts,
            checks,
            fields,
            acks,
        }
    }

    fn type_into(&self, field: &str, value: &str) {
        self.fields.get(field).unwrap().set_value(value);
    }

    fn drain_alerts(&self) -> Vec<String> {
        std::iter::from_fn(|| self.alerts.pop()).collect()
    }

    fn document(&self) -> String {
        self.sequencer.hook().render_document(&self.renderer).unwrap()
    }
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[test]
fn test_demo_manuals_build() {
    let me21n = Session::open("me21n.toml");
    assert_eq!(me21n.sequencer.total_steps(), 6);
    assert_eq!(me21n.checks.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert!(me21n.fields.get("commandField").is_some());
    assert!(me21n.fields.get("docType").unwrap().is_readonly());
    assert_eq!(me21n.fields.get("docType").unwrap().value(), "NB");

    let mm01 = Session::open("mm01.yaml");
    assert_eq!(mm01.sequencer.total_steps(), 4);
    assert_eq!(mm01.checks.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert!(mm01.fields.get("mmCommand").is_some());
}

// ─── Gates ───────────────────────────────────────────────────────────────────

#[test]
fn test_check_flag_offers_check_without_gating() {
    let mut session = Session::open("me21n.toml");
    assert!(session.sequencer.next());
    assert!(session.sequencer.next());
    assert_eq!(session.sequencer.current_index(), 2);
    assert!(session.drain_alerts().is_empty());

    session.sequencer.go_to(1).unwrap();
    assert!(!session.checks[&1].confirm());
    assert_eq!(
        session.drain_alerts(),
        vec!["Sláðu inn ME21N eða /nME21N í skipanasvæðið."]
    );
    assert!(session.fields.get("commandField").unwrap().is_focused());
}

#[test]
fn test_command_gate_accepts_direct_prefix() {
    let mut session = Session::open("mm01.yaml");
    assert!(session.sequencer.next());

    assert!(!session.sequencer.next());
    assert_eq!(session.sequencer.current_index(), 1);
    assert_eq!(
        session.drain_alerts(),
        vec!["Enter MM01 or /nMM01 in the command field."]
    );
    assert!(session.fields.get("mmCommand").unwrap().is_focused());

    session.type_into("mmCommand", " /nmm01 ");
    assert!(session.sequencer.next());
    assert_eq!(session.sequencer.current_index(), 2);
    assert!(session.fields.get("mmCommand").unwrap().is_highlighted());
    assert!(session.drain_alerts().is_empty());
}

#[test]
fn test_form_gate_requires_exact_value() {
    let mut session = Session::open("me21n.toml");
    session.sequencer.go_to(2).unwrap();

    session.type_into("vendor", "100073 ");
    assert!(!session.sequencer.next());
    assert_eq!(
        session.drain_alerts(),
        vec!["Sláðu inn 100073 í reitinn."]
    );

    session.type_into("vendor", "100073");
    assert!(session.sequencer.next());
    assert_eq!(session.sequencer.current_index(), 3);
}

#[test]
fn test_previous_is_never_gated() {
    let mut session = Session::open("mm01.yaml");
    session.sequencer.go_to(2).unwrap();

    assert!(session.sequencer.retreat());
    assert!(session.sequencer.retreat());
    assert_eq!(session.sequencer.current_index(), 0);
    assert!(!session.sequencer.retreat());
    assert!(session.drain_alerts().is_empty());
}

// ─── Acknowledgments ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_check_acknowledges_then_advances() {
    let mut session = Session::open("mm01.yaml");
    session.sequencer.go_to(1).unwrap();
    session.type_into("mmCommand", "mm01");

    assert!(session.checks[&1].confirm());
    assert_eq!(session.sequencer.current_index(), 1);
    assert!(session.acks.try_recv().is_err());

    tokio::time::sleep(Duration::from_millis(550)).await;
    let fired = session.acks.recv().await.unwrap();
    assert!(ack::apply(fired, &mut session.sequencer, &session.alerts));

    assert_eq!(session.sequencer.current_index(), 2);
    assert_eq!(
        session.drain_alerts(),
        vec!["Correct! The MM01 window opens."]
    );
}

#[tokio::test(start_paused = true)]
async fn test_failed_check_schedules_nothing() {
    let mut session = Session::open("mm01.yaml");
    session.sequencer.go_to(2).unwrap();
    session.type_into("sector", "m");

    assert!(!session.checks[&2].confirm());
    assert_eq!(session.drain_alerts(), vec!["Enter M in the field."]);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(session.acks.try_recv().is_err());
    assert_eq!(session.sequencer.current_index(), 2);
}

// ─── Page ────────────────────────────────────────────────────────────────────

#[test]
fn test_page_tracks_progress_through_manual() {
    let mut session = Session::open("me21n.toml");
    session.type_into("vendor", "100073");

    for _ in 0..5 {
        assert!(session.sequencer.next());
    }

    let page = session.sequencer.hook();
    assert_eq!(page.active_container(), Some("step5"));
    assert_eq!(page.next_button().unwrap().label, "Byrja aftur");
    assert!(page.prev_button().unwrap().visible);
    assert!(page.markers()[..5]
        .iter()
        .all(|m| m.state == MarkerState::Completed && m.label == "✓"));
    assert_eq!(page.markers()[5].state, MarkerState::Active);

    let html = session.document();
    assert!(html.contains(r#"<html lang="is">"#));
    assert!(html.contains("Byrja aftur"));
    assert!(html.contains("Vel gert!"));
    assert!(html.contains("<strong>⚠️ Athugið:</strong>"));
    assert!(html.contains("<strong>⚠️ Aðgangur:</strong>"));

    // Next on the terminal step starts over
    assert!(session.sequencer.next());
    let page = session.sequencer.hook();
    assert_eq!(page.active_container(), Some("step0"));
    assert_eq!(page.next_button().unwrap().label, "Næsta skref →");
    assert!(!page.prev_button().unwrap().visible);
    assert_eq!(page.markers()[3].label, "✓");
}

#[test]
fn test_overview_lists_steps_after_intro() {
    let session = Session::open("mm01.yaml");
    assert_eq!(
        session.sequencer.hook().overview(),
        ["Open MM01", "Industry sector", "Done"]
    );

    let html = session.document();
    assert!(html.contains("<li>Open MM01</li>"));
    assert!(html.contains("Material numbers cannot be changed after saving."));
    assert!(html.contains(r#"id="mmCommand""#));
}
