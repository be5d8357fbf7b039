//! # Core Viewer Logic
//!
//! Everything the viewer decides, independent of any UI technology.
//!
//! ```text
//!     ┌──────────────┐        ┌─────────────────────────┐
//!     │   SOURCE     │        │         CORE            │
//!     │ (reqwest)    │──────▶ │  (this module)          │
//!     │ fetch + load │ Action │                         │
//!     └──────────────┘        │  • message (normalize,  │
//!                             │    group by date)       │
//!                             │  • state (view data)    │
//!                             │  • update() (reducer)   │
//!                             │  • config (settings)    │
//!                             │                         │
//!                             │  No terminal. No clock  │
//!                             │  reads in update().     │
//!                             └───────────┬─────────────┘
//!                                         │ Effect
//!                                         ▼
//!                                  ┌────────────┐
//!                                  │    TUI     │
//!                                  │  Adapter   │
//!                                  │ (ratatui)  │
//!                                  └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`message`]: Raw records, normalized `Message`, date buckets and grouping
//! - [`state`]: The `ViewState` struct and scroll geometry
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: Config file, env and CLI resolution

pub mod action;
pub mod config;
pub mod message;
pub mod state;
