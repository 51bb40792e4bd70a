//! `termania-core` — the control core for the Termania terminal
//! orchestrator.
//!
//! This crate owns all state, plugin instantiation, command dispatch,
//! and external-process coordination. It has no rendering, no native
//! GUI, and no TOML tokenizer of its own — those are external
//! collaborators the host provides. Everything here runs on one
//! thread; the only suspension point is the LLM HTTP call in
//! [`controller::Controller::poll_llm`].

pub mod action;
pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod keymap;
pub mod llm;
pub mod logging;
pub mod overlay;
pub mod pane;
pub mod tap;

pub use controller::Controller;
pub use error::CoreError;
