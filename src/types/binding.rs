// Copyright (c) 2024 Mike Tsao

//! Bindings connect a feedback to the host property it drives.

use super::FeedbackError;
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// A readable and writable host property. `get()` returns `None` and `set()`
/// returns `false` once the underlying object is gone.
pub trait Property<V> {
    /// Reads the current value.
    fn get(&self) -> Option<V>;

    /// Writes a new value. Returns whether the write landed.
    fn set(&mut self, value: V) -> bool;
}

/// A property the feedback shares ownership of. It never goes away.
impl<V: Copy> Property<V> for Rc<RefCell<V>> {
    fn get(&self) -> Option<V> {
        Some(*self.borrow())
    }

    fn set(&mut self, value: V) -> bool {
        *self.borrow_mut() = value;
        true
    }
}

/// A property owned by the host. Once the host drops it, reads and writes
/// fail.
impl<V: Copy> Property<V> for Weak<RefCell<V>> {
    fn get(&self) -> Option<V> {
        self.upgrade().map(|value| *value.borrow())
    }

    fn set(&mut self, value: V) -> bool {
        if let Some(rc) = self.upgrade() {
            *rc.borrow_mut() = value;
            true
        } else {
            false
        }
    }
}

/// A property made from a getter and a setter closure, for hosts whose
/// values don't live in an `Rc<RefCell<_>>`.
pub struct FnProperty<G, S> {
    getter: G,
    setter: S,
}
impl<G, S> FnProperty<G, S> {
    #[allow(missing_docs)]
    pub fn new(getter: G, setter: S) -> Self {
        Self { getter, setter }
    }
}
impl<V, G, S> Property<V> for FnProperty<G, S>
where
    G: Fn() -> Option<V>,
    S: FnMut(V) -> bool,
{
    fn get(&self) -> Option<V> {
        (self.getter)()
    }

    fn set(&mut self, value: V) -> bool {
        (self.setter)(value)
    }
}

/// The optional connection between a feedback and a [Property].
pub struct PropertyBinding<V>(Option<Box<dyn Property<V>>>);
impl<V> Default for PropertyBinding<V> {
    fn default() -> Self {
        Self(None)
    }
}
impl<V> core::fmt::Debug for PropertyBinding<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyBinding")
            .field("is_bound", &self.is_bound())
            .finish()
    }
}
impl<V> PropertyBinding<V> {
    /// Binds to the given property.
    pub fn new(property: impl Property<V> + 'static) -> Self {
        Self(Some(Box::new(property)))
    }

    /// Whether a property was ever attached. A bound property can still have
    /// gone away; see [PropertyBinding::get()].
    pub fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    /// Reads the property.
    pub fn get(&self) -> Result<V, FeedbackError> {
        self.0
            .as_ref()
            .and_then(|property| property.get())
            .ok_or(FeedbackError::MissingTarget)
    }

    /// Writes the property.
    pub fn set(&mut self, value: V) -> Result<(), FeedbackError> {
        match self.0.as_mut() {
            Some(property) => {
                if property.set(value) {
                    Ok(())
                } else {
                    Err(FeedbackError::MissingTarget)
                }
            }
            None => Err(FeedbackError::MissingTarget),
        }
    }
}
impl<V: Copy + 'static> From<Rc<RefCell<V>>> for PropertyBinding<V> {
    fn from(value: Rc<RefCell<V>>) -> Self {
        Self::new(value)
    }
}
impl<V: Copy + 'static> From<Weak<RefCell<V>>> for PropertyBinding<V> {
    fn from(value: Weak<RefCell<V>>) -> Self {
        Self::new(value)
    }
}
