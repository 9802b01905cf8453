//! Change notification for cameras and lights
//!
//! Subjects hold observers weakly: attaching never keeps an observer alive,
//! and observers that were dropped are pruned on the next notification.
//! Notifications iterate over a snapshot, so the list may change while a
//! notification is in flight.

use std::fmt;
use std::rc::{Rc, Weak};

use super::lighting::Light;
use super::primitives::Camera;

/// Receives camera changes
pub trait CameraObserver {
    /// The camera moved, turned or changed its projection
    fn on_camera_changed(&self, camera: &Camera);
}

/// Receives light changes
pub trait LightObserver {
    /// A light property changed
    fn on_light_changed(&self, light: &Light);

    /// The light is being dropped; this is the last notification it sends
    fn on_light_destroyed(&self, light: &Light);
}

/// Weak, duplicate-free list of observers
pub struct ObserverList<T: ?Sized> {
    observers: Vec<Weak<T>>,
}

impl<T: ?Sized> Default for ObserverList<T> {
    fn default() -> Self {
        Self { observers: Vec::new() }
    }
}

impl<T: ?Sized> fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<T: ?Sized> ObserverList<T> {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; returns `false` if it was already attached
    pub fn attach(&mut self, observer: &Rc<T>) -> bool {
        let weak = Rc::downgrade(observer);
        if self.observers.iter().any(|existing| Weak::ptr_eq(existing, &weak)) {
            return false;
        }
        self.observers.push(weak);
        true
    }

    /// Remove an observer; returns `false` if it was not attached
    pub fn detach(&mut self, observer: &Rc<T>) -> bool {
        let weak = Rc::downgrade(observer);
        let before = self.observers.len();
        self.observers.retain(|existing| !Weak::ptr_eq(existing, &weak));
        self.observers.len() != before
    }

    /// Live observers at this instant; dead entries are pruned
    pub fn snapshot(&mut self) -> Vec<Rc<T>> {
        self.observers.retain(|weak| weak.strong_count() > 0);
        self.observers.iter().filter_map(Weak::upgrade).collect()
    }

    /// Remove every observer
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Number of entries, including ones not yet pruned
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True when nothing is attached
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Ping {
        fn ping(&self) -> u32;
    }

    struct Pong(u32);

    impl Ping for Pong {
        fn ping(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_attach_is_idempotent() {
        let mut list: ObserverList<dyn Ping> = ObserverList::new();
        let observer: Rc<dyn Ping> = Rc::new(Pong(1));

        assert!(list.attach(&observer));
        assert!(!list.attach(&observer));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_detach_absent_is_no_op() {
        let mut list: ObserverList<dyn Ping> = ObserverList::new();
        let attached: Rc<dyn Ping> = Rc::new(Pong(1));
        let stranger: Rc<dyn Ping> = Rc::new(Pong(2));
        list.attach(&attached);

        assert!(!list.detach(&stranger));
        assert!(list.detach(&attached));
        assert!(list.is_empty());
    }

    #[test]
    fn test_snapshot_prunes_dropped_observers() {
        let mut list: ObserverList<dyn Ping> = ObserverList::new();
        let kept: Rc<dyn Ping> = Rc::new(Pong(1));
        let dropped: Rc<dyn Ping> = Rc::new(Pong(2));
        list.attach(&kept);
        list.attach(&dropped);
        drop(dropped);

        let live = list.snapshot();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].ping(), 1);
        assert_eq!(list.len(), 1);
    }
}
