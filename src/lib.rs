//! # a3s-dispatch
//!
//! Synchronous, priority-ordered in-process event dispatch for the A3S ecosystem.
//!
//! ## Overview
//!
//! `a3s-dispatch` lets callers define event types, register handlers for
//! them with a priority, and dispatch events through every matching handler
//! in priority order. Any handler may cancel the event, which skips the
//! handlers that follow it.
//!
//! ## Quick Start
//!
//! ```rust
//! use a3s_dispatch::{impl_event, Event, EventKind, EventMeta, EventRegistry, Priority};
//!
//! struct MessageReceived {
//!     meta: EventMeta,
//!     text: String,
//! }
//!
//! impl_event!(MessageReceived);
//!
//! # fn example() -> a3s_dispatch::Result<()> {
//! let registry = EventRegistry::new();
//!
//! registry.on(
//!     |e: &mut MessageReceived| {
//!         if e.text == "stop" {
//!             e.cancel();
//!         }
//!     },
//!     Priority::Highest,
//! )?;
//! registry.on(|e: &mut MessageReceived| println!("{}", e.text), Priority::Normal)?;
//!
//! let mut event = MessageReceived {
//!     meta: EventMeta::new(EventKind::Post),
//!     text: "hello".to_string(),
//! };
//! let report = registry.dispatch(&mut event)?;
//! assert_eq!(report.invoked, 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Architecture
//!
//! - **Event** trait: any `'static` type exposing an `EventMeta` (kind + cancelled)
//! - **Handler**: a shared callable with a stable identity
//! - **HandlerEntry**: a handler paired with its `Priority`
//! - **EventRegistry**: event type → priority-sorted entries, plus dispatch

pub mod config;
pub mod error;
pub mod handler;
pub mod registry;
pub mod types;

// Re-export core types
pub use config::RegistryConfig;
pub use error::{DispatchError, Result};
pub use handler::{Handler, HandlerEntry};
pub use registry::{EventExt, EventRegistry};
pub use types::{
    AsAny, BasicEvent, DispatchReport, Event, EventKind, EventMeta, EventType, HandlerCounts,
    Priority,
};
