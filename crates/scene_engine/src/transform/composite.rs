//! Transform composite
//!
//! Folds an ordered list of dynamic components and an ordered list of static
//! components into a single model matrix:
//!
//! ```text
//! M = D0 · D1 · … · Dn · S0 · S1 · … · Sm
//! ```
//!
//! The product is cached and only rebuilt after a component was added,
//! advanced or mutated through the composite.

use std::cell::Cell;

use crate::foundation::math::Mat4;
use super::component::TransformComponent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ComponentList {
    Dynamic,
    Static,
}

/// Stable reference to a component owned by a [`Transformation`]
///
/// Components are never removed, so a handle stays valid for the lifetime of
/// the composite that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentHandle {
    list: ComponentList,
    index: usize,
}

/// Ordered set of transform components with a cached combined matrix
#[derive(Debug, Clone)]
pub struct Transformation {
    dynamic: Vec<TransformComponent>,
    statics: Vec<TransformComponent>,
    cached: Cell<Mat4>,
    dirty: Cell<bool>,
    recomputes: Cell<u64>,
}

impl Default for Transformation {
    fn default() -> Self {
        Self::new()
    }
}

impl Transformation {
    /// Empty composite; its matrix is the identity
    pub fn new() -> Self {
        Self {
            dynamic: Vec::new(),
            statics: Vec::new(),
            cached: Cell::new(Mat4::identity()),
            dirty: Cell::new(false),
            recomputes: Cell::new(0),
        }
    }

    /// Append a component to the static list
    pub fn add_static(&mut self, component: TransformComponent) -> ComponentHandle {
        self.statics.push(component);
        self.dirty.set(true);
        ComponentHandle {
            list: ComponentList::Static,
            index: self.statics.len() - 1,
        }
    }

    /// Append a component to the dynamic list
    pub fn add_dynamic(&mut self, component: TransformComponent) -> ComponentHandle {
        self.dynamic.push(component);
        self.dirty.set(true);
        ComponentHandle {
            list: ComponentList::Dynamic,
            index: self.dynamic.len() - 1,
        }
    }

    /// [`add_static`](Self::add_static) for a component that may be missing
    ///
    /// `None` is a silent no-op and leaves the cache untouched.
    pub fn add_static_opt(&mut self, component: Option<TransformComponent>) -> Option<ComponentHandle> {
        component.map(|c| self.add_static(c))
    }

    /// [`add_dynamic`](Self::add_dynamic) for a component that may be missing
    pub fn add_dynamic_opt(&mut self, component: Option<TransformComponent>) -> Option<ComponentHandle> {
        component.map(|c| self.add_dynamic(c))
    }

    /// Read a component
    pub fn component(&self, handle: ComponentHandle) -> Option<&TransformComponent> {
        match handle.list {
            ComponentList::Dynamic => self.dynamic.get(handle.index),
            ComponentList::Static => self.statics.get(handle.index),
        }
    }

    /// Mutate a component; the combined matrix is rebuilt on next query
    pub fn component_mut(&mut self, handle: ComponentHandle) -> Option<&mut TransformComponent> {
        let component = match handle.list {
            ComponentList::Dynamic => self.dynamic.get_mut(handle.index),
            ComponentList::Static => self.statics.get_mut(handle.index),
        };
        if component.is_some() {
            self.dirty.set(true);
        }
        component
    }

    /// Advance every component (both lists) by `delta_time` seconds
    pub fn advance(&mut self, delta_time: f32) {
        for component in self.dynamic.iter_mut().chain(self.statics.iter_mut()) {
            component.advance(delta_time);
        }
        if !self.is_empty() {
            self.dirty.set(true);
        }
    }

    /// Combined matrix: product of the dynamic list, then of the static list
    pub fn matrix(&self) -> Mat4 {
        if self.dirty.get() {
            let combined = self
                .dynamic
                .iter()
                .chain(self.statics.iter())
                .fold(Mat4::identity(), |acc, component| acc * component.matrix());

            self.cached.set(combined);
            self.dirty.set(false);
            self.recomputes.set(self.recomputes.get() + 1);
        }
        self.cached.get()
    }

    /// How many times the combined matrix has been rebuilt
    pub fn recompute_count(&self) -> u64 {
        self.recomputes.get()
    }

    /// Number of dynamic components
    pub fn dynamic_len(&self) -> usize {
        self.dynamic.len()
    }

    /// Number of static components
    pub fn static_len(&self) -> usize {
        self.statics.len()
    }

    /// Total number of components
    pub fn len(&self) -> usize {
        self.dynamic.len() + self.statics.len()
    }

    /// True when no component was added
    pub fn is_empty(&self) -> bool {
        self.dynamic.is_empty() && self.statics.is_empty()
    }
}
