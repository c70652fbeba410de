//! Stagehand Core - Scene Lifecycle Orchestration
//!
//! This crate decides which scene is on stage, hands a single state payload
//! from scene to scene without losing or duplicating it, and runs animated
//! transitions between them. It knows nothing about terminals, windows or
//! GPUs: scenes draw into a [`Canvas`] of cells that a surface translates to
//! whatever it renders with.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Host loop                               │
//! │          tick() / present(canvas) / resize(w, h)                 │
//! └───────────────────────────┬──────────────────────────────────────┘
//!                             │ Unit
//! ┌───────────────────────────┴──────────────────────────────────────┐
//! │            SceneManager            SceneDirector                 │
//! │        (switch on command)     (switch on trigger + RuleSet)     │
//! │                    └──────────┬───────────┘                      │
//! │                         current slot                             │
//! │                 ┌─────────────┴─────────────┐                    │
//! │              Scene<T>                Transition<T>               │
//! │      load / unload / aware hooks   fade, slide + Pacing          │
//! └──────────────────────────────────────────────────────────────────┘
//!            ▲                                   │
//!            └──── ControllerHandle (weak) ◄─────┘
//! ```
//!
//! # Key Types
//!
//! - [`Unit`]: Anything that can be ticked, presented and resized
//! - [`Scene`] / [`TransitionAware`]: Presentation units and their hand-off hooks
//! - [`SceneManager`]: Controller that switches on explicit command
//! - [`SceneDirector`]: Controller that switches when a [`Trigger`] matches a [`Directive`]
//! - [`Transition`]: Stand-in unit that animates between two scenes
//! - [`Clock`]: Injectable time source for timed transitions
//!
//! # Module Overview
//!
//! - [`unit`]: The `Unit` capability
//! - [`scene`]: Scenes, transition awareness and scene handles
//! - [`controller`]: Controller handles and the current-unit slot
//! - [`manager`]: Direct-switch controller
//! - [`director`]: Rule-driven controller
//! - [`transition`]: Transition contract, pacing, fade and slide
//! - [`clock`]: Time sources
//! - [`surface`]: Cell canvas scenes draw into
//! - [`config`]: TOML configuration
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clock;
pub mod config;
pub mod controller;
pub mod director;
pub mod manager;
pub mod scene;
pub mod surface;
pub mod transition;
pub mod unit;

#[cfg(test)]
mod test_utils;

// Re-exports for convenience
pub use clock::{default_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use controller::{ControllerHandle, Current};
pub use director::{Directive, RuleSet, SceneDirector, Trigger};
pub use manager::SceneManager;
pub use scene::{Scene, SceneRef, TransitionAware};
pub use surface::{pre_render, Block, Canvas, Color};
pub use transition::{
    FadeTransition, Pacing, SlideDirection, SlideTransition, Transition, TransitionBase,
    TransitionPhase, TransitionRef,
};
pub use unit::Unit;

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, PacingMode, StageConfig, StageToml, TransitionEffect, TransitionSpec,
    TransitionTiming,
};
