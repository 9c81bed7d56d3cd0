// events/bus/event_bus.rs
//
// Core event bus implementation.
//
// DESIGN PRINCIPLES:
// 1. Synchronous - handlers execute immediately in subscription order
// 2. Re-entrant - handlers may emit, subscribe or unsubscribe
// 3. Observable - every emission is logged
// 4. Type-safe - events are strongly typed
// 5. Isolated - a panicking handler never reaches the emitter

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use crate::events::types::DomainEvent;

/// Type-erased event handler function
/// Takes a reference to Any (downcasted to concrete event type inside)
type EventHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

type HandlerMap = HashMap<TypeId, HandlerSlot>;

/// Keep at most this many entries in the emission log
const MAX_EVENT_LOG_ENTRIES: usize = 1_000;

/// Handle returned by every subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// Pointer identity of a shared handler, for deduplication
    identity: Option<usize>,
    handler: EventHandler,
}

struct HandlerSlot {
    event_name: &'static str,
    subscriptions: Vec<Subscription>,
}

/// The Event Bus
///
/// Central coordination point between the store, the controller and the
/// view. Producers emit typed events; consumers subscribe by event type.
///
/// Key characteristics:
/// - Synchronous execution: `emit` returns after every handler ran
/// - Handlers execute in subscription order
/// - Dispatch iterates over a snapshot, so handlers can re-enter the bus
/// - Cloning shares the same subscriptions
pub struct EventBus {
    /// Map from event TypeId to its handlers
    handlers: Arc<RwLock<HandlerMap>>,

    /// Event emission log (for debugging)
    event_log: Arc<RwLock<Vec<EventLogEntry>>>,

    next_subscription: Arc<AtomicU64>,
}

/// A logged event for debugging and tracing
#[derive(Debug, Clone)]
pub struct EventLogEntry {
    pub event_type: String,
    pub event_id: String,
    pub occurred_at: String,
    pub handler_count: usize,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            event_log: Arc::new(RwLock::new(Vec::new())),
            next_subscription: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Subscribe to a specific event type
    ///
    /// Handlers are executed in the order they are subscribed. Every call
    /// creates a new subscription.
    ///
    /// Example:
    /// ```ignore
    /// bus.subscribe::<BookAdded, _>(|event| {
    ///     println!("Book added: {}", event.book.title);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: DomainEvent + 'static,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.insert::<E>(Subscription {
            id,
            identity: None,
            handler: wrap_handler(handler),
        });
        id
    }

    /// Subscribe a shared handler.
    ///
    /// Subscribing the same `Arc` twice for the same event type is a no-op
    /// that returns the existing subscription.
    pub fn subscribe_shared<E>(&self, handler: Arc<dyn Fn(&E) + Send + Sync>) -> SubscriptionId
    where
        E: DomainEvent + 'static,
    {
        let identity = Arc::as_ptr(&handler) as *const () as usize;

        {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            let existing = handlers.get(&TypeId::of::<E>()).and_then(|slot| {
                slot.subscriptions
                    .iter()
                    .find(|s| s.identity == Some(identity))
                    .map(|s| s.id)
            });
            if let Some(id) = existing {
                log::debug!("Handler already subscribed to {} as {:?}", E::NAME, id);
                return id;
            }
        }

        let id = self.allocate_id();
        self.insert::<E>(Subscription {
            id,
            identity: Some(identity),
            handler: wrap_handler(move |event: &E| handler(event)),
        });
        id
    }

    /// Subscribe a handler that runs for the next emission only
    pub fn subscribe_once<E, F>(&self, handler: F) -> SubscriptionId
    where
        E: DomainEvent + 'static,
        F: FnOnce(&E) + Send + 'static,
    {
        let id = self.allocate_id();
        let pending = Mutex::new(Some(handler));
        let handlers: Weak<RwLock<HandlerMap>> = Arc::downgrade(&self.handlers);

        let once = move |event: &E| {
            let taken = pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handler) = taken {
                if let Some(handlers) = handlers.upgrade() {
                    remove_subscription(&handlers, id);
                }
                handler(event);
            }
        };

        self.insert::<E>(Subscription {
            id,
            identity: None,
            handler: wrap_handler(once),
        });
        id
    }

    /// Remove one subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscription(&self.handlers, id)
    }

    /// Remove every subscriber of one event type
    pub fn clear_subscribers<E>(&self)
    where
        E: DomainEvent + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.remove(&TypeId::of::<E>());
    }

    /// Remove every subscriber of every event type
    pub fn clear_all_subscribers(&self) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Emit an event
    ///
    /// This will:
    /// 1. Log the event
    /// 2. Execute all handlers for this event type (in subscription order)
    /// 3. Return once every handler has run
    ///
    /// If a handler panics, the panic is caught and logged, but other handlers
    /// still execute.
    pub fn emit<E>(&self, event: E)
    where
        E: DomainEvent + 'static,
    {
        // Snapshot the handlers so none of the locks is held while they run
        let snapshot: Vec<EventHandler> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(&TypeId::of::<E>())
                .map(|slot| slot.subscriptions.iter().map(|s| Arc::clone(&s.handler)).collect())
                .unwrap_or_default()
        };

        let log_entry = EventLogEntry {
            event_type: event.event_type().to_string(),
            event_id: event.event_id().to_string(),
            occurred_at: event.occurred_at().to_rfc3339(),
            handler_count: snapshot.len(),
        };

        log::debug!(
            "[EVENT] {} (id: {}) | {} handlers",
            log_entry.event_type,
            log_entry.event_id,
            log_entry.handler_count
        );

        {
            let mut log = self.event_log.write().unwrap_or_else(PoisonError::into_inner);
            if log.len() >= MAX_EVENT_LOG_ENTRIES {
                log.remove(0);
            }
            log.push(log_entry);
        }

        for (idx, handler) in snapshot.iter().enumerate() {
            // Catch panics to prevent one handler from breaking others
            let result = catch_unwind(AssertUnwindSafe(|| handler(&event as &dyn Any)));

            if let Err(panic) = result {
                log::error!(
                    "Handler {} for {} panicked: {}",
                    idx,
                    event.event_type(),
                    panic_message(panic.as_ref())
                );
            }
        }
    }

    /// Names of the event types that currently have subscribers
    pub fn event_names(&self) -> Vec<&'static str> {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<&'static str> = handlers
            .values()
            .filter(|slot| !slot.subscriptions.is_empty())
            .map(|slot| slot.event_name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Get the number of subscribers for a specific event type
    pub fn subscriber_count<E>(&self) -> usize
    where
        E: 'static,
    {
        let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
        handlers
            .get(&TypeId::of::<E>())
            .map(|slot| slot.subscriptions.len())
            .unwrap_or(0)
    }

    /// Get the event log (for debugging)
    pub fn get_event_log(&self) -> Vec<EventLogEntry> {
        self.event_log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear the event log
    pub fn clear_event_log(&self) {
        self.event_log
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    fn insert<E>(&self, subscription: Subscription)
    where
        E: DomainEvent + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| HandlerSlot {
                event_name: E::NAME,
                subscriptions: Vec::new(),
            })
            .subscriptions
            .push(subscription);
    }
}

/// Wrap a typed handler in a type-erased closure
fn wrap_handler<E, F>(handler: F) -> EventHandler
where
    E: DomainEvent + 'static,
    F: Fn(&E) + Send + Sync + 'static,
{
    Arc::new(move |event_any: &dyn Any| {
        if let Some(event) = event_any.downcast_ref::<E>() {
            handler(event);
        } else {
            log::error!(
                "Failed to downcast event in handler for {}",
                std::any::type_name::<E>()
            );
        }
    })
}

fn remove_subscription(handlers: &RwLock<HandlerMap>, id: SubscriptionId) -> bool {
    let mut handlers = handlers.write().unwrap_or_else(PoisonError::into_inner);
    for slot in handlers.values_mut() {
        if let Some(pos) = slot.subscriptions.iter().position(|s| s.id == id) {
            slot.subscriptions.remove(pos);
            return true;
        }
    }
    false
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// Make EventBus cloneable (shared reference)
impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_log: Arc::clone(&self.event_log),
            next_subscription: Arc::clone(&self.next_subscription),
        }
    }
}
