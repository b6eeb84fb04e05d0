use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::component::DeviceRef;
use crate::event::ComponentEvent;

/// Trait for reacting to change events from any device.
pub trait InputListener: Send {
    fn on_input(&mut self, event: &ComponentEvent);
}

impl<F> InputListener for F
where
    F: FnMut(&ComponentEvent) + Send,
{
    fn on_input(&mut self, event: &ComponentEvent) {
        self(event)
    }
}

/// Handle returned by [`InputEventBus::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Determines which kinds of events a listener wants to receive.
#[derive(Clone, Copy)]
pub enum EventFilter {
    All,
    AxisOnly,
    /// Buttons and keys.
    ButtonsOnly,
    Custom(fn(&ComponentEvent) -> bool),
}

impl EventFilter {
    fn accepts(&self, event: &ComponentEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::AxisOnly => event.is_axis(),
            EventFilter::ButtonsOnly => event.is_button(),
            EventFilter::Custom(f) => f(event),
        }
    }
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFilter::All => f.write_str("All"),
            EventFilter::AxisOnly => f.write_str("AxisOnly"),
            EventFilter::ButtonsOnly => f.write_str("ButtonsOnly"),
            EventFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
    tag: Option<DeviceRef>,
}

/// Fan-out of change events to registered listeners.
///
/// Listeners run in registration order. A listener that panics is disabled and
/// the remaining listeners still receive the event.
#[derive(Default)]
pub struct InputEventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, ListenerEntry)>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter and an optional device tag.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        tag: Option<DeviceRef>,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                tag,
            },
        ));
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: ListenerId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: ListenerId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.enabled = false;
        }
    }

    pub fn is_enabled(&self, id: ListenerId) -> bool {
        self.listeners
            .iter()
            .any(|(lid, entry)| *lid == id && entry.enabled)
    }

    /// Unregisters a listener entirely. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn entry_mut(&mut self, id: ListenerId) -> Option<&mut ListenerEntry> {
        self.listeners
            .iter_mut()
            .find(|(lid, _)| *lid == id)
            .map(|(_, entry)| entry)
    }

    /// Emits one event to all active and matching listeners.
    fn emit(&mut self, event: &ComponentEvent) {
        for (id, entry) in self.listeners.iter_mut() {
            if !entry.enabled {
                continue;
            }

            if let Some(wanted) = entry.tag {
                if event.device() != wanted {
                    continue;
                }
            }

            if !entry.filter.accepts(event) {
                continue;
            }

            let listener = &mut entry.listener;
            if panic::catch_unwind(AssertUnwindSafe(|| listener.on_input(event))).is_err() {
                tracing::error!(
                    listener = id.0,
                    component = %event.component.id(),
                    "input listener panicked; disabling it"
                );
                entry.enabled = false;
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[ComponentEvent]) {
        if self.listeners.is_empty() {
            return;
        }
        for event in events {
            self.emit(event);
        }
    }
}

impl fmt::Debug for InputEventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputEventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
