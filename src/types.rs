//! Core event types for the a3s-dispatch system
//!
//! Serializable types use lowercase/camelCase JSON for config compatibility.

use crate::error::{DispatchError, Result};
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Phase marker carried by every event
///
/// Purely informational: the registry never reads or alters it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Before the action the event describes
    #[default]
    Pre,
    /// While the action is in progress
    Period,
    /// After the action completed
    Post,
}

/// Handler execution priority
///
/// Lower values dispatch earlier. Ordering follows the numeric value,
/// so `Priority::Highest < Priority::Lowest`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Highest = 0,
    High = 1,
    #[default]
    Normal = 2,
    Low = 3,
    Lower = 4,
    Lowest = 5,
}

impl Priority {
    /// All levels, highest first
    pub const ALL: [Priority; 6] = [
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lower,
        Priority::Lowest,
    ];

    /// Ordinal value (0 = highest, 5 = lowest), used as the sort key
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Map an integer onto a level, clamping out-of-range values
    pub fn from_value(value: i64) -> Self {
        let clamped = value.clamp(0, 5) as usize;
        Self::ALL[clamped]
    }

    /// Parse a level name or integer, falling back to `Normal`
    pub fn parse_lenient(input: &str) -> Self {
        input.parse().unwrap_or_default()
    }

    /// Lowercase level name
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Highest => "highest",
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Lower => "lower",
            Priority::Lowest => "lowest",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let by_name = Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed));
        if let Some(priority) = by_name {
            return Ok(priority);
        }

        trimmed
            .parse::<i64>()
            .map(Self::from_value)
            .map_err(|_| DispatchError::InvalidPriority(s.to_string()))
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self::from_value(value)
    }
}

impl From<i32> for Priority {
    fn from(value: i32) -> Self {
        Self::from_value(i64::from(value))
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Self::from_value(i64::from(value))
    }
}

impl From<usize> for Priority {
    fn from(value: usize) -> Self {
        Self::from_value(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

/// State shared by every event: phase marker and cancellation flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Phase marker, set at construction
    pub kind: EventKind,

    /// Once set by a handler, remaining handlers are skipped
    #[serde(default)]
    pub cancelled: bool,
}

impl EventMeta {
    /// Create metadata for a fresh, uncancelled event
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            cancelled: false,
        }
    }
}

/// Runtime type access for events behind `dyn Event`
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An event that can be dispatched through an `EventRegistry`
///
/// The concrete type of the implementor selects which handlers run.
/// Use [`impl_event!`](crate::impl_event) for structs with an `EventMeta` field.
pub trait Event: AsAny {
    fn meta(&self) -> &EventMeta;

    fn meta_mut(&mut self) -> &mut EventMeta;

    fn kind(&self) -> EventKind {
        self.meta().kind
    }

    fn is_cancelled(&self) -> bool {
        self.meta().cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.meta_mut().cancelled = cancelled;
    }

    /// Mark the event cancelled, stopping the current dispatch after this handler
    fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

/// Events compare equal when they share concrete type, kind, and
/// cancellation state. Payload fields are not compared.
impl PartialEq for dyn Event {
    fn eq(&self, other: &Self) -> bool {
        self.as_any().type_id() == other.as_any().type_id() && self.meta() == other.meta()
    }
}

/// Implement [`Event`] for a struct holding an [`EventMeta`] field
///
/// The field defaults to `meta`; pass a second argument to name another.
///
/// ```rust
/// use a3s_dispatch::{impl_event, EventMeta};
///
/// struct MessageReceived {
///     meta: EventMeta,
///     text: String,
/// }
///
/// impl_event!(MessageReceived);
/// ```
#[macro_export]
macro_rules! impl_event {
    ($t:ty) => {
        $crate::impl_event!($t, meta);
    };
    ($t:ty, $field:ident) => {
        impl $crate::Event for $t {
            fn meta(&self) -> &$crate::EventMeta {
                &self.$field
            }

            fn meta_mut(&mut self) -> &mut $crate::EventMeta {
                &mut self.$field
            }
        }
    };
}

/// Payload-less event, dispatchable on its own
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicEvent {
    pub meta: EventMeta,
}

impl BasicEvent {
    pub fn new(kind: EventKind) -> Self {
        Self {
            meta: EventMeta::new(kind),
        }
    }
}

crate::impl_event!(BasicEvent);

/// Identifier of a concrete event type, used as the registry key
///
/// Equality and hashing use the `TypeId` only; the name is for display.
#[derive(Debug, Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Identifier for event type `E`
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: std::any::type_name::<E>(),
        }
    }

    /// Identifier for the concrete type behind an event reference
    pub fn of_val(event: &dyn Event) -> Self {
        Self {
            id: event.as_any().type_id(),
            name: event.type_name(),
        }
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Outcome of a single dispatch call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Number of handlers invoked
    pub invoked: usize,

    /// Whether a handler cancelled the event and cut dispatch short
    pub cancelled: bool,
}

/// Handler counts grouped by event type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerCounts {
    /// Counts per event type (fully qualified type name)
    pub event_types: HashMap<String, usize>,

    /// Total handler entries across all types
    pub total: usize,
}
