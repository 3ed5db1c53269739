//! Handlers and their prioritized registry entries
//!
//! A `Handler` is a shared callable with a stable identity. Clones of a
//! handler share that identity, so the registry can find "the entry for
//! this callable" without knowing its current priority.

use crate::types::{Event, EventType, Priority};
use std::fmt;
use std::sync::Arc;

type HandlerFn = dyn Fn(&mut dyn Event) + Send + Sync;

/// A callable invoked with a single event
///
/// Typed handlers (`Handler::new`) accept exactly one concrete event type;
/// erased handlers (`Handler::any`) accept every event.
#[derive(Clone)]
pub struct Handler {
    /// Identity shared by all clones (hdl-<uuid>)
    id: Arc<str>,

    /// Display name reported by `EventRegistry::handler_names`
    name: Arc<str>,

    /// Concrete event type this handler accepts, `None` for any
    accepts: Option<EventType>,

    func: Arc<HandlerFn>,
}

impl Handler {
    /// Create a handler for events of type `E`
    ///
    /// The name defaults to the closure's type name. Closure names carry a
    /// short id suffix so handlers built in one function stay distinct.
    /// Override it with [`with_name`](Self::with_name).
    pub fn new<E, F>(f: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        let func: Arc<HandlerFn> = Arc::new(move |event: &mut dyn Event| {
            match event.as_any_mut().downcast_mut::<E>() {
                Some(event) => f(event),
                None => tracing::warn!(
                    expected = std::any::type_name::<E>(),
                    "Typed handler received an event of another type"
                ),
            }
        });

        let id = new_id();
        Self {
            name: default_name::<F>(&id),
            id,
            accepts: Some(EventType::of::<E>()),
            func,
        }
    }

    /// Create a handler that accepts every event type
    pub fn any<F>(f: F) -> Self
    where
        F: Fn(&mut dyn Event) + Send + Sync + 'static,
    {
        let id = new_id();
        Self {
            name: default_name::<F>(&id),
            id,
            accepts: None,
            func: Arc::new(f),
        }
    }

    /// Set the display name, keeping the handler's identity
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single event type a typed handler accepts
    pub fn accepted_type(&self) -> Option<EventType> {
        self.accepts
    }

    /// Whether this handler can be subscribed to `event_type`
    pub fn accepts(&self, event_type: &EventType) -> bool {
        self.accepts.map_or(true, |accepted| accepted == *event_type)
    }

    /// Whether both values wrap the same underlying callable
    pub fn same_callable(&self, other: &Handler) -> bool {
        self.id == other.id
    }

    /// Invoke the callable with `event`
    pub fn call(&self, event: &mut dyn Event) {
        (self.func)(event);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("accepts", &self.accepts.map(|t| t.name()))
            .finish()
    }
}

fn new_id() -> Arc<str> {
    Arc::from(format!("hdl-{}", uuid::Uuid::new_v4()))
}

fn default_name<F>(id: &str) -> Arc<str> {
    let type_name = std::any::type_name::<F>();
    if !type_name.ends_with("{{closure}}") {
        return Arc::from(type_name);
    }

    let short_id = id.trim_start_matches("hdl-");
    let short_id = short_id.get(..8).unwrap_or(short_id);
    Arc::from(format!("{}#{}", type_name, short_id))
}

/// A handler paired with its dispatch priority
///
/// `PartialEq` is exact: same callable *and* same priority. Use
/// [`same_callable`](Self::same_callable) for priority-agnostic matching.
#[derive(Debug, Clone)]
pub struct HandlerEntry {
    handler: Handler,
    priority: Priority,
}

impl HandlerEntry {
    /// Create an entry; integer priorities are clamped into range
    pub fn new(handler: Handler, priority: impl Into<Priority>) -> Self {
        Self {
            handler,
            priority: priority.into(),
        }
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn set_priority(&mut self, priority: impl Into<Priority>) {
        self.priority = priority.into();
    }

    /// Sort key: 0 for highest, 5 for lowest
    pub fn priority_value(&self) -> u8 {
        self.priority.value()
    }

    /// Invoke the wrapped handler
    pub fn execute(&self, event: &mut dyn Event) {
        self.handler.call(event);
    }

    /// Whether this entry wraps `handler`, regardless of priority
    pub fn wraps(&self, handler: &Handler) -> bool {
        self.handler.same_callable(handler)
    }

    pub fn same_callable(&self, other: &HandlerEntry) -> bool {
        self.wraps(&other.handler)
    }

    pub fn same_entry(&self, other: &HandlerEntry) -> bool {
        self.same_callable(other) && self.priority == other.priority
    }
}

impl PartialEq for HandlerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.same_entry(other)
    }
}

impl Eq for HandlerEntry {}

/// Stable sort by priority value; equal priorities keep their order
pub(crate) fn sort_entries(entries: &mut [HandlerEntry]) {
    entries.sort_by_key(HandlerEntry::priority_value);
}
