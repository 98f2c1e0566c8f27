//! Performance dashboard core.
//!
//! Providers publish snapshots, history and settings through watch cells;
//! [`controller::ViewStateController`] derives a [`view::ViewState`] from
//! them, and the `ui` module renders it without touching state.

pub mod action;
pub mod app;
pub mod config;
pub mod controller;
pub mod event;
pub mod export;
pub mod format;
pub mod health;
pub mod system;
pub mod ui;
pub mod view;
