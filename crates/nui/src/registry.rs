//! Process-wide event dispatch table.
//!
//! Handlers are invoked in subscription order on the thread that owns the
//! registry. Each subscription is tied to a [`Subscription`] guard; dropping
//! the guard removes the handler, so a torn down widget never sees another
//! event.

use crate::event::{Event, Topic};
use crate::name::EventName;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Rc<dyn Fn(&Event)>;

#[derive(Default)]
struct Table {
    next_id: u64,
    handlers: HashMap<EventName, Vec<(SubscriptionId, Handler)>>,
}

impl Table {
    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    fn insert(&mut self, name: EventName, id: SubscriptionId, handler: Handler) {
        self.handlers.entry(name).or_default().push((id, handler));
    }

    fn remove(&mut self, name: &EventName, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(entry, _)| *entry != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(name);
        }
        removed
    }

    fn contains(&self, name: &EventName, id: SubscriptionId) -> bool {
        self.handlers
            .get(name)
            .is_some_and(|list| list.iter().any(|(entry, _)| *entry == id))
    }

    fn snapshot(&self, name: &EventName) -> Vec<(SubscriptionId, Handler)> {
        self.handlers.get(name).cloned().unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub struct EventRegistry {
    table: Rc<RefCell<Table>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        name: impl Into<EventName>,
        handler: impl Fn(&Event) + 'static,
    ) -> Subscription {
        let name = name.into();
        let mut table = self.table.borrow_mut();
        let id = table.allocate();
        table.insert(name.clone(), id, Rc::new(handler));
        self.guard(name, id)
    }

    /// Subscribes with the payload type of `T` resolved statically.
    pub fn on<T: Topic>(&self, handler: impl Fn(&T::Payload) + 'static) -> Subscription {
        self.subscribe(T::NAME, move |event| {
            if let Some(payload) = T::payload(event) {
                handler(payload);
            }
        })
    }

    /// The handler runs for the next matching event only.
    pub fn once(
        &self,
        name: impl Into<EventName>,
        handler: impl FnOnce(&Event) + 'static,
    ) -> Subscription {
        let name = name.into();
        let mut table = self.table.borrow_mut();
        let id = table.allocate();

        let weak = Rc::downgrade(&self.table);
        let key = name.clone();
        let slot = RefCell::new(Some(handler));
        table.insert(
            name.clone(),
            id,
            Rc::new(move |event: &Event| {
                if let Some(table) = weak.upgrade() {
                    table.borrow_mut().remove(&key, id);
                }
                let handler = slot.borrow_mut().take();
                if let Some(handler) = handler {
                    handler(event);
                }
            }),
        );
        self.guard(name, id)
    }

    /// Invokes every handler registered for the event's name and returns how many ran.
    ///
    /// The handler list is captured when dispatch starts. Handlers added while
    /// dispatching wait for the next event; handlers removed while dispatching
    /// are skipped.
    pub fn dispatch(&self, event: &Event) -> usize {
        let name = event.name();
        let snapshot = self.table.borrow().snapshot(&name);

        let mut invoked = 0;
        for (id, handler) in snapshot {
            if !self.table.borrow().contains(&name, id) {
                continue;
            }
            handler(event);
            invoked += 1;
        }
        invoked
    }

    pub fn handler_count(&self, name: &str) -> usize {
        self.table.borrow().handlers.get(name).map_or(0, Vec::len)
    }

    fn guard(&self, name: EventName, id: SubscriptionId) -> Subscription {
        Subscription {
            name,
            id,
            table: Rc::downgrade(&self.table),
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.borrow();
        let mut map = f.debug_map();
        for (name, handlers) in &table.handlers {
            map.entry(&name.as_str(), &handlers.len());
        }
        map.finish()
    }
}

/// Removes its handler from the registry when dropped.
#[must_use = "dropping a subscription unsubscribes it"]
pub struct Subscription {
    name: EventName,
    id: SubscriptionId,
    table: Weak<RefCell<Table>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn name(&self) -> &EventName {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.table
            .upgrade()
            .is_some_and(|table| table.borrow().contains(&self.name, self.id))
    }

    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.borrow_mut().remove(&self.name, self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish()
    }
}
