//! walkthrough - interactive step-by-step instruction manuals
//!
//! A manual is a linear list of steps driven by [`sequencer::StepSequencer`].
//! Rendering collaborators react to every transition: [`page::HtmlPage`]
//! produces a standalone HTML document and [`ui::TuiView`] drives the
//! terminal walkthrough.

pub mod app;
pub mod config;
pub mod controls;
pub mod logging;
pub mod manual;
pub mod page;
pub mod sequencer;
pub mod templates;
pub mod ui;
pub mod validation;
