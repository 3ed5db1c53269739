//! Event registry: handler subscription and priority-ordered dispatch
//!
//! `EventRegistry` maps each concrete event type to a list of handler
//! entries kept sorted by priority. Dispatch walks a snapshot of that
//! list, so handlers may subscribe, unsubscribe, or dispatch further
//! events while running without affecting the current call.

use crate::config::RegistryConfig;
use crate::error::{DispatchError, Result};
use crate::handler::{sort_entries, Handler, HandlerEntry};
use crate::types::{DispatchReport, Event, EventType, HandlerCounts, Priority};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type HandlerMap = HashMap<EventType, Vec<HandlerEntry>>;

/// Registry of prioritized event handlers
///
/// Thread-safe via one internal lock. The lock is never held while a
/// handler runs.
#[derive(Debug)]
pub struct EventRegistry {
    config: RegistryConfig,

    /// Event type → entries sorted ascending by priority value
    handlers: RwLock<HandlerMap>,
}

impl EventRegistry {
    /// Create an empty registry with the default config
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with the given config
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Subscribe `handler` to each of `event_types` at `priority`
    ///
    /// Re-subscribing an existing handler only refreshes its priority.
    /// If the handler cannot accept one of the types, nothing is
    /// registered and `InvalidHandlerShape` is returned.
    pub fn subscribe(
        &self,
        handler: &Handler,
        event_types: &[EventType],
        priority: impl Into<Priority>,
    ) -> Result<()> {
        let priority = priority.into();

        if let Some(rejected) = event_types.iter().find(|t| !handler.accepts(t)) {
            tracing::warn!(
                registry = %self.config.name,
                handler = %handler.name(),
                event_type = %rejected,
                "Subscription rejected"
            );
            return Err(DispatchError::InvalidHandlerShape {
                handler: handler.name().to_string(),
                event_type: rejected.to_string(),
            });
        }

        let mut map = self.write()?;
        for event_type in event_types {
            let entries = map.entry(*event_type).or_default();
            match entries.iter_mut().find(|e| e.wraps(handler)) {
                Some(existing) => existing.set_priority(priority),
                None => entries.push(HandlerEntry::new(handler.clone(), priority)),
            }
            sort_entries(entries);

            tracing::debug!(
                registry = %self.config.name,
                handler = %handler.name(),
                event_type = %event_type,
                priority = %priority,
                "Handler subscribed"
            );
        }

        Ok(())
    }

    /// Subscribe at the configured default priority
    pub fn subscribe_default(&self, handler: &Handler, event_types: &[EventType]) -> Result<()> {
        self.subscribe(handler, event_types, self.config.default_priority)
    }

    /// Build a typed handler for `E`, subscribe it, and return it
    ///
    /// Keep the returned handler to unsubscribe or re-prioritize later.
    /// The handler gets a generated name; use [`on_named`](Self::on_named)
    /// to choose the name reported by `handler_names`.
    pub fn on<E, F>(&self, f: F, priority: impl Into<Priority>) -> Result<Handler>
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.subscribe_typed::<E>(Handler::new(f), priority.into())
    }

    /// Like [`on`](Self::on), with an explicit handler name
    pub fn on_named<E, F>(
        &self,
        name: impl Into<String>,
        f: F,
        priority: impl Into<Priority>,
    ) -> Result<Handler>
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.subscribe_typed::<E>(Handler::new(f).with_name(name), priority.into())
    }

    /// Like [`on`](Self::on), at the configured default priority
    pub fn on_default<E, F>(&self, f: F) -> Result<Handler>
    where
        E: Event,
        F: Fn(&mut E) + Send + Sync + 'static,
    {
        self.on(f, self.config.default_priority)
    }

    fn subscribe_typed<E: Event>(&self, handler: Handler, priority: Priority) -> Result<Handler> {
        self.subscribe(&handler, &[EventType::of::<E>()], priority)?;
        Ok(handler)
    }

    /// Remove `handler` from each of `event_types`, whatever its priority
    pub fn unsubscribe(&self, handler: &Handler, event_types: &[EventType]) -> Result<()> {
        let mut map = self.write()?;
        for event_type in event_types {
            if remove_handler(&mut map, event_type, handler) {
                tracing::debug!(
                    registry = %self.config.name,
                    handler = %handler.name(),
                    event_type = %event_type,
                    "Handler unsubscribed"
                );
            }
        }
        Ok(())
    }

    /// Remove `handler` from every event type; returns how many it left
    pub fn unsubscribe_everywhere(&self, handler: &Handler) -> Result<usize> {
        let mut map = self.write()?;
        let subscribed: Vec<EventType> = map
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e.wraps(handler)))
            .map(|(event_type, _)| *event_type)
            .collect();

        for event_type in &subscribed {
            remove_handler(&mut map, event_type, handler);
        }

        tracing::debug!(
            registry = %self.config.name,
            handler = %handler.name(),
            removed = subscribed.len(),
            "Handler unsubscribed from all event types"
        );
        Ok(subscribed.len())
    }

    /// Whether `handler` is subscribed to `event_type`, at any priority
    pub fn contains_handler(&self, handler: &Handler, event_type: EventType) -> Result<bool> {
        let map = self.read()?;
        Ok(map
            .get(&event_type)
            .is_some_and(|entries| entries.iter().any(|e| e.wraps(handler))))
    }

    /// Names of the handlers for `event_type`, in dispatch order
    pub fn handler_names(&self, event_type: EventType) -> Result<Vec<String>> {
        let map = self.read()?;
        Ok(map
            .get(&event_type)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| e.handler().name().to_string())
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Handlers for `event_type`, in dispatch order
    pub fn handlers(&self, event_type: EventType) -> Result<Vec<Handler>> {
        let map = self.read()?;
        Ok(map
            .get(&event_type)
            .map(|entries| entries.iter().map(|e| e.handler().clone()).collect())
            .unwrap_or_default())
    }

    /// Copy of the entries for `event_type`, in dispatch order
    ///
    /// Mutating the returned entries does not affect the registry.
    pub fn handler_entries(&self, event_type: EventType) -> Result<Vec<HandlerEntry>> {
        let map = self.read()?;
        Ok(map.get(&event_type).cloned().unwrap_or_default())
    }

    /// Current priority of `handler` for `event_type`, if subscribed
    pub fn priority_of(
        &self,
        handler: &Handler,
        event_type: EventType,
    ) -> Result<Option<Priority>> {
        let map = self.read()?;
        Ok(map.get(&event_type).and_then(|entries| {
            entries
                .iter()
                .find(|e| e.wraps(handler))
                .map(HandlerEntry::priority)
        }))
    }

    /// Change the priority of a subscribed handler
    ///
    /// With `resort == false` the entry keeps its position until the
    /// next mutation of this event type re-sorts the list.
    pub fn set_priority(
        &self,
        handler: &Handler,
        event_type: EventType,
        priority: impl Into<Priority>,
        resort: bool,
    ) -> Result<()> {
        let priority = priority.into();
        let not_subscribed = || DispatchError::NotSubscribed {
            handler: handler.name().to_string(),
            event_type: event_type.to_string(),
        };

        let mut map = self.write()?;
        let Some(entries) = map.get_mut(&event_type) else {
            return Err(not_subscribed());
        };
        let Some(entry) = entries.iter_mut().find(|e| e.wraps(handler)) else {
            return Err(not_subscribed());
        };

        entry.set_priority(priority);
        if resort {
            sort_entries(entries);
        }

        tracing::debug!(
            registry = %self.config.name,
            handler = %handler.name(),
            event_type = %event_type,
            priority = %priority,
            resort,
            "Handler priority updated"
        );
        Ok(())
    }

    /// Unsubscribe every handler from `event_type`
    pub fn clear(&self, event_type: EventType) -> Result<()> {
        let mut map = self.write()?;
        if let Some(entries) = map.remove(&event_type) {
            tracing::debug!(
                registry = %self.config.name,
                event_type = %event_type,
                removed = entries.len(),
                "Event type cleared"
            );
        }
        Ok(())
    }

    /// Event types with at least one handler, sorted by name
    pub fn event_types(&self) -> Result<Vec<EventType>> {
        let map = self.read()?;
        let mut types: Vec<EventType> = map.keys().copied().collect();
        types.sort_by_key(|t| t.name());
        Ok(types)
    }

    /// Handler counts grouped by fully qualified event type name
    pub fn counts(&self) -> Result<HandlerCounts> {
        let map = self.read()?;
        let mut counts = HandlerCounts::default();

        for (event_type, entries) in map.iter() {
            *counts
                .event_types
                .entry(event_type.name().to_string())
                .or_insert(0) += entries.len();
            counts.total += entries.len();
        }

        Ok(counts)
    }

    /// Invoke the handlers for `event`'s concrete type in priority order
    ///
    /// Handlers run over a snapshot taken when dispatch starts. After
    /// each handler the event's cancellation flag is checked; once set,
    /// the remaining handlers are skipped. An event type with no
    /// handlers dispatches to nothing.
    pub fn dispatch(&self, event: &mut dyn Event) -> Result<DispatchReport> {
        let event_type = EventType::of_val(&*event);
        let snapshot = {
            let map = self.read()?;
            map.get(&event_type).cloned().unwrap_or_default()
        };

        tracing::trace!(
            registry = %self.config.name,
            event_type = %event_type,
            handlers = snapshot.len(),
            "Dispatching event"
        );

        let mut report = DispatchReport::default();
        for entry in &snapshot {
            entry.execute(&mut *event);
            report.invoked += 1;

            if event.is_cancelled() {
                report.cancelled = true;
                tracing::debug!(
                    registry = %self.config.name,
                    event_type = %event_type,
                    handler = %entry.handler().name(),
                    skipped = snapshot.len() - report.invoked,
                    "Event cancelled"
                );
                break;
            }
        }

        Ok(report)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HandlerMap>> {
        self.handlers
            .read()
            .map_err(|e| DispatchError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HandlerMap>> {
        self.handlers
            .write()
            .map_err(|e| DispatchError::LockPoisoned(e.to_string()))
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove `handler` from one event type, dropping the type once empty
fn remove_handler(map: &mut HandlerMap, event_type: &EventType, handler: &Handler) -> bool {
    let Some(entries) = map.get_mut(event_type) else {
        return false;
    };

    let before = entries.len();
    entries.retain(|e| !e.wraps(handler));
    let removed = entries.len() != before;

    if entries.is_empty() {
        map.remove(event_type);
    }
    removed
}

/// Dispatch sugar for sized events: `event.fire(&registry)`
pub trait EventExt: Event + Sized {
    fn fire(&mut self, registry: &EventRegistry) -> Result<DispatchReport> {
        registry.dispatch(self)
    }
}

impl<E: Event> EventExt for E {}
