use crate::{
    node::{NeverEqual, NodeId},
    runtime::{current_runtime, RuntimeId},
    SignalDispose,
};
use std::{any::Any, cell::RefCell, fmt::Debug, marker::PhantomData, rc::Rc};

/// Stores a value and returns a **non-reactive** [`StoredValue`] handle for
/// it.
///
/// If you want a reactive container, use [`create_signal`](crate::create_signal).
/// Storing a value gives any type a stable, `Copy`, `'static` identity
/// inside the runtime; accessing it neither subscribes an observer nor
/// notifies anything on update. The wrapper layer uses this to hand out
/// copyable handles to boxed closures.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// #[derive(Clone)]
/// struct Name {
///     value: String,
/// }
/// let data = store_value(Name { value: "a".into() });
/// assert_eq!(data.get_value().value, "a");
/// data.update_value(|data| data.value = "b".into());
/// assert_eq!(data.with_value(|data| data.value.clone()), "b");
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn store_value<T>(value: T) -> StoredValue<T>
where
    T: 'static,
{
    let runtime = current_runtime();
    let id = runtime.create_concrete_signal(
        Rc::new(RefCell::new(value)) as Rc<RefCell<dyn Any>>,
        Rc::new(NeverEqual),
    );
    StoredValue {
        runtime,
        id,
        ty: PhantomData,
    }
}

/// A non-reactive wrapper for any value; see [`store_value`].
pub struct StoredValue<T>
where
    T: 'static,
{
    runtime: RuntimeId,
    id: NodeId,
    ty: PhantomData<T>,
}

impl<T> Clone for StoredValue<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StoredValue<T> {}

impl<T> Debug for StoredValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredValue")
            .field("runtime", &self.runtime)
            .field("id", &self.id)
            .finish()
    }
}

impl<T> PartialEq for StoredValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for StoredValue<T> {}

impl<T> StoredValue<T> {
    /// Clones and returns the stored value. Panics if it has been disposed.
    pub fn get_value(&self) -> T
    where
        T: Clone,
    {
        self.with_value(T::clone)
    }

    /// Clones and returns the stored value, or `None` if it has been
    /// disposed.
    pub fn try_get_value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.try_with_value(T::clone)
    }

    /// Applies a function to a reference to the stored value. Panics if it
    /// has been disposed.
    pub fn with_value<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with_value(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    /// Applies a function to a reference to the stored value, or returns
    /// `None` if it has been disposed.
    pub fn try_with_value<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.id.try_with_no_subscription(self.runtime, f).ok()
    }

    /// Replaces the stored value. Nothing is notified: stored values are not
    /// reactive.
    pub fn set_value(&self, new_value: T) {
        if self.try_set_value(new_value).is_some() {
            crate::macros::debug_warn!("tried to set {self:?} after it was disposed");
        }
    }

    /// Replaces the stored value, handing `new_value` back if it has been
    /// disposed.
    pub fn try_set_value(&self, new_value: T) -> Option<T> {
        let mut new_value = Some(new_value);
        _ = self.id.try_update_value(self.runtime, |v: &mut T| {
            if let Some(incoming) = new_value.take() {
                *v = incoming;
            }
        });
        new_value
    }

    /// Mutates the stored value in place. Nothing is notified.
    pub fn update_value(&self, f: impl FnOnce(&mut T)) {
        if self.try_update_value(f).is_none() {
            crate::macros::debug_warn!("tried to update {self:?} after it was disposed");
        }
    }

    /// Mutates the stored value in place, returning the closure's result or
    /// `None` if it has been disposed.
    pub fn try_update_value<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.try_update_value(self.runtime, f).ok()
    }
}

impl<T> SignalDispose for StoredValue<T> {
    fn dispose(self) {
        self.id.dispose(self.runtime);
    }
}
