//! Global pointer events and the tracker that mirrors the latest position.
//!
//! `PointerHub` stands in for the host's global pointer event source. The
//! window event loop feeds every cursor movement into it; components mount a
//! [`PointerTracker`] to observe the latest coordinate pair. Registration is
//! tied to the lifetime of a [`PointerSubscription`], so a listener can never
//! outlive the component that registered it.
//!
//! Everything here runs on the event loop thread, hence `Rc`/`RefCell`.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Pointer coordinates in physical viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

type Listener = Box<dyn FnMut(PointerPosition)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Default)]
struct Shared {
    registry: RefCell<Registry>,
    /// Subscriptions dropped while `registry` was borrowed by a dispatch.
    released: RefCell<Vec<u64>>,
}

impl Shared {
    fn remove_released(&self) {
        loop {
            let released = std::mem::take(&mut *self.released.borrow_mut());
            if released.is_empty() {
                return;
            }
            self.registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| !released.contains(id));
        }
    }
}

/// Source of pointer-movement events.
#[derive(Clone, Default)]
pub struct PointerHub {
    shared: Rc<Shared>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`; it stays registered until the returned guard is
    /// dropped.
    #[must_use = "dropping the subscription immediately deregisters the listener"]
    pub fn subscribe<F>(&self, listener: F) -> PointerSubscription
    where
        F: FnMut(PointerPosition) + 'static,
    {
        let mut registry = self.shared.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        PointerSubscription {
            shared: Rc::downgrade(&self.shared),
            id,
        }
    }

    /// Delivers one pointer-move event to every registered listener.
    ///
    /// Listeners must not subscribe from inside the callback. A subscription
    /// dropped during dispatch receives no further events and is removed
    /// before `dispatch` returns.
    pub fn dispatch(&self, position: PointerPosition) {
        {
            let mut registry = self.shared.registry.borrow_mut();
            for (id, listener) in registry.listeners.iter_mut() {
                if self.shared.released.borrow().contains(id) {
                    continue;
                }
                listener(position);
            }
        }
        self.shared.remove_released();
    }

    pub fn listener_count(&self) -> usize {
        self.shared.registry.borrow().listeners.len()
    }
}

/// Guard returned by [`PointerHub::subscribe`]; deregisters on drop.
pub struct PointerSubscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if let Ok(mut registry) = shared.registry.try_borrow_mut() {
            registry.listeners.retain(|(id, _)| *id != self.id);
        } else {
            tracing::trace!(listener = self.id, "pointer listener released during dispatch");
            shared.released.borrow_mut().push(self.id);
        };
    }
}

/// Mirrors the most recent pointer position for as long as it is mounted.
pub struct PointerTracker {
    position: Rc<Cell<PointerPosition>>,
    _subscription: PointerSubscription,
}

impl PointerTracker {
    /// Subscribes to `hub`; the position starts at `(0, 0)` until the first
    /// event arrives.
    pub fn mount(hub: &PointerHub) -> Self {
        let position = Rc::new(Cell::new(PointerPosition::default()));
        let sink = Rc::clone(&position);
        let subscription = hub.subscribe(move |event| sink.set(event));
        Self {
            position,
            _subscription: subscription,
        }
    }

    pub fn position(&self) -> PointerPosition {
        self.position.get()
    }

    /// Releases the listener. Dropping the tracker has the same effect.
    pub fn unmount(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn tracker_follows_latest_event() {
        let hub = PointerHub::new();
        let tracker = PointerTracker::mount(&hub);
        assert_eq!(tracker.position(), PointerPosition::default());

        hub.dispatch(PointerPosition::new(10.0, 20.0));
        hub.dispatch(PointerPosition::new(640.5, 360.25));
        assert_eq!(tracker.position(), PointerPosition::new(640.5, 360.25));
    }

    #[test]
    fn mount_unmount_cycles_leave_no_listeners() {
        let hub = PointerHub::new();
        for _ in 0..50 {
            let tracker = PointerTracker::mount(&hub);
            assert_eq!(hub.listener_count(), 1);
            tracker.unmount();
        }
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn overlapping_trackers_release_independently() {
        let hub = PointerHub::new();
        let first = PointerTracker::mount(&hub);
        let second = PointerTracker::mount(&hub);
        assert_eq!(hub.listener_count(), 2);

        drop(first);
        hub.dispatch(PointerPosition::new(3.0, 4.0));
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(second.position(), PointerPosition::new(3.0, 4.0));

        drop(second);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn listener_released_when_setup_panics() {
        let hub = PointerHub::new();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _tracker = PointerTracker::mount(&hub);
            panic!("setup failed after subscribing");
        }));
        assert!(result.is_err());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn subscription_dropped_during_dispatch_is_removed() {
        let hub = PointerHub::new();
        let slot: Rc<RefCell<Option<PointerSubscription>>> = Rc::default();
        let _releaser = hub.subscribe({
            let slot = Rc::clone(&slot);
            move |_| {
                slot.borrow_mut().take();
            }
        });
        let calls = Rc::new(Cell::new(0));
        let counted = hub.subscribe({
            let calls = Rc::clone(&calls);
            move |_| calls.set(calls.get() + 1)
        });
        *slot.borrow_mut() = Some(counted);
        assert_eq!(hub.listener_count(), 2);

        hub.dispatch(PointerPosition::new(1.0, 1.0));
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(calls.get(), 0);

        hub.dispatch(PointerPosition::new(2.0, 2.0));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn subscription_outliving_hub_is_harmless() {
        let hub = PointerHub::new();
        let tracker = PointerTracker::mount(&hub);
        drop(hub);
        drop(tracker);
    }
}
