use crate::{
    node::{Comparator, NodeId, ReactiveNode, ReactiveNodeState, ReactiveNodeType},
    runtime::{current_runtime, with_runtime, RuntimeId},
};
use std::{any::Any, cell::RefCell, fmt::Debug, marker::PhantomData, rc::Rc};

/// Creates a signal, the basic reactive primitive: a value plus the set of
/// observers that have read it. Returns a `(getter, setter)` pair.
///
/// Writes through the setter are equality-gated: setting a value equal to
/// the current one (by `PartialEq`) notifies nobody. Use
/// [`create_signal_with_compare`] to supply a different predicate.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (count, set_count) = create_signal(0);
///
/// // the getter reads the value, subscribing if called inside an observer
/// assert_eq!(count.get(), 0);
/// // the setter replaces the value
/// set_count.set(1);
/// assert_eq!(count.get(), 1);
/// // or we can mutate it in place with update()
/// set_count.update(|n| *n += 1);
/// assert_eq!(count.get(), 2);
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_signal<T>(value: T) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: PartialEq + 'static,
{
    current_runtime().create_signal(value)
}

/// Like [`create_signal`], but writes are gated by the given equality
/// predicate instead of `PartialEq`.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// // only notify when the integer part changes
/// let (val, set_val) = create_signal_with_compare(1.2_f64, |a, b| a.trunc() == b.trunc());
/// set_val.set(1.9);
/// assert_eq!(val.get(), 1.2); // suppressed, same integer part
/// set_val.set(2.1);
/// assert_eq!(val.get(), 2.1);
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_signal_with_compare<T>(
    value: T,
    compare: impl Fn(&T, &T) -> bool + 'static,
) -> (ReadSignal<T>, WriteSignal<T>)
where
    T: 'static,
{
    current_runtime().create_signal_with_compare(value, compare)
}

/// Creates a signal without the read/write segregation, as a single
/// [`RwSignal`] handle.
#[track_caller]
pub fn create_rw_signal<T>(value: T) -> RwSignal<T>
where
    T: PartialEq + 'static,
{
    current_runtime().create_rw_signal(value)
}

impl RuntimeId {
    pub(crate) fn create_concrete_signal(self, value: Rc<RefCell<dyn Any>>, eq: Rc<dyn crate::node::AnyEq>) -> NodeId {
        with_runtime(self, |runtime| {
            runtime.nodes.borrow_mut().insert(ReactiveNode {
                value,
                state: ReactiveNodeState::Clean,
                node_type: ReactiveNodeType::Signal { eq },
            })
        })
        .expect("tried to create a signal in a runtime that has been disposed")
    }

    #[track_caller]
    pub(crate) fn create_signal<T>(self, value: T) -> (ReadSignal<T>, WriteSignal<T>)
    where
        T: PartialEq + 'static,
    {
        self.create_signal_with_compare(value, PartialEq::eq)
    }

    #[track_caller]
    pub(crate) fn create_signal_with_compare<T>(
        self,
        value: T,
        compare: impl Fn(&T, &T) -> bool + 'static,
    ) -> (ReadSignal<T>, WriteSignal<T>)
    where
        T: 'static,
    {
        let id = self.create_concrete_signal(
            Rc::new(RefCell::new(value)) as Rc<RefCell<dyn Any>>,
            Rc::new(Comparator::new(compare)),
        );
        (
            ReadSignal {
                runtime: self,
                id,
                ty: PhantomData,
                #[cfg(debug_assertions)]
                defined_at: std::panic::Location::caller(),
            },
            WriteSignal {
                runtime: self,
                id,
                ty: PhantomData,
                #[cfg(debug_assertions)]
                defined_at: std::panic::Location::caller(),
            },
        )
    }

    #[track_caller]
    pub(crate) fn create_rw_signal<T>(self, value: T) -> RwSignal<T>
    where
        T: PartialEq + 'static,
    {
        let id = self.create_concrete_signal(
            Rc::new(RefCell::new(value)) as Rc<RefCell<dyn Any>>,
            Rc::new(Comparator::new(T::eq)),
        );
        RwSignal {
            runtime: self,
            id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at: std::panic::Location::caller(),
        }
    }
}

/// The reading half of a signal: a `Copy` handle whose `get`/`with` calls
/// subscribe the currently running observer, if any. Outside any observer
/// they are plain reads.
pub struct ReadSignal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: NodeId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadSignal<T> {}

impl<T> Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ReadSignal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for ReadSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for ReadSignal<T> {}

impl<T> std::hash::Hash for ReadSignal<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.runtime.hash(state);
        self.id.hash(state);
    }
}

/// The writing half of a signal.
pub struct WriteSignal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: NodeId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for WriteSignal<T> {}

impl<T> Debug for WriteSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("WriteSignal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for WriteSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for WriteSignal<T> {}

impl<T> WriteSignal<T> {
    /// Computes a new value from the current one and writes it through the
    /// signal's equality gate, exactly as [`SignalSet::set`] would: if the
    /// produced value compares equal to the current one, nobody is
    /// notified. Contrast [`SignalUpdate::update`], which mutates in place
    /// and always notifies.
    ///
    /// ```
    /// # use rd_reactive::*;
    /// # let runtime = create_runtime();
    /// let (count, set_count) = create_signal(1);
    /// set_count.set_with(|n| n * 2);
    /// assert_eq!(count.get(), 2);
    /// # runtime.dispose();
    /// ```
    #[track_caller]
    pub fn set_with(&self, f: impl FnOnce(&T) -> T) {
        match self.id.try_with_no_subscription(self.runtime, f) {
            Ok(new_value) => {
                _ = self.id.try_set(self.runtime, new_value);
            }
            Err(_) => {
                crate::macros::debug_warn!("tried to set {self:?} after it was disposed")
            }
        }
    }
}

/// A signal without read/write segregation: one `Copy` handle that can both
/// be read (with subscription) and written (with notification).
pub struct RwSignal<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: NodeId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> Clone for RwSignal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RwSignal<T> {}

impl<T> Debug for RwSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("RwSignal");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for RwSignal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for RwSignal<T> {}

impl<T> RwSignal<T> {
    /// Returns the read-only half of this signal. Both handles share the
    /// same underlying node.
    #[track_caller]
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            runtime: self.runtime,
            id: self.id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at: std::panic::Location::caller(),
        }
    }

    /// Returns the write-only half of this signal.
    #[track_caller]
    pub fn write_only(&self) -> WriteSignal<T> {
        WriteSignal {
            runtime: self.runtime,
            id: self.id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at: std::panic::Location::caller(),
        }
    }

    /// Computes a new value from the current one and writes it through the
    /// signal's equality gate; see [`WriteSignal::set_with`].
    #[track_caller]
    pub fn set_with(&self, f: impl FnOnce(&T) -> T) {
        match self.id.try_with_no_subscription(self.runtime, f) {
            Ok(new_value) => {
                _ = self.id.try_set(self.runtime, new_value);
            }
            Err(_) => {
                crate::macros::debug_warn!("tried to set {self:?} after it was disposed")
            }
        }
    }
}

/// Clones the current value out of a reactive container, subscribing the
/// running observer.
pub trait SignalGet {
    /// The value held by the container.
    type Value;

    /// Clones and returns the value. Panics if the node has been disposed.
    fn get(&self) -> Self::Value;

    /// Clones and returns the value, or `None` if the node has been
    /// disposed.
    fn try_get(&self) -> Option<Self::Value>;
}

/// Applies a function to the current value by reference, subscribing the
/// running observer; avoids cloning.
pub trait SignalWith {
    /// The value held by the container.
    type Value;

    /// Applies `f` to the value. Panics if the node has been disposed.
    fn with<O>(&self, f: impl FnOnce(&Self::Value) -> O) -> O;

    /// Applies `f` to the value, or returns `None` if the node has been
    /// disposed.
    fn try_with<O>(&self, f: impl FnOnce(&Self::Value) -> O) -> Option<O>;

    /// Subscribes the running observer without using the value.
    fn track(&self) {
        _ = self.try_with(|_| ());
    }
}

/// Replaces the current value, notifying subscribers unless the new value
/// compares equal to the old one under the signal's equality predicate.
pub trait SignalSet {
    /// The value held by the container.
    type Value;

    /// Sets the value. A no-op (with a logged warning in debug builds) if
    /// the node has been disposed.
    fn set(&self, new_value: Self::Value);

    /// Sets the value, returning `Some(new_value)` back if the node has
    /// been disposed.
    fn try_set(&self, new_value: Self::Value) -> Option<Self::Value>;
}

/// Mutates the current value in place, then notifies subscribers. Unlike
/// [`SignalSet::set`] this always notifies: the old value is consumed by the
/// closure, so there is nothing left to compare against.
pub trait SignalUpdate {
    /// The value held by the container.
    type Value;

    /// Mutates the value in place. A no-op (with a logged warning in debug
    /// builds) if the node has been disposed.
    fn update(&self, f: impl FnOnce(&mut Self::Value));

    /// Mutates the value in place and returns the closure's result, or
    /// `None` if the node has been disposed.
    fn try_update<O>(&self, f: impl FnOnce(&mut Self::Value) -> O) -> Option<O>;
}

/// [`SignalGet`] without subscribing: reads the value as a plain,
/// non-reactive access.
pub trait SignalGetUntracked {
    /// The value held by the container.
    type Value;

    /// Clones and returns the value without subscribing.
    fn get_untracked(&self) -> Self::Value;

    /// Clones and returns the value without subscribing, or `None` if the
    /// node has been disposed.
    fn try_get_untracked(&self) -> Option<Self::Value>;
}

/// [`SignalWith`] without subscribing.
pub trait SignalWithUntracked {
    /// The value held by the container.
    type Value;

    /// Applies `f` to the value without subscribing.
    fn with_untracked<O>(&self, f: impl FnOnce(&Self::Value) -> O) -> O;

    /// Applies `f` to the value without subscribing, or returns `None` if
    /// the node has been disposed.
    fn try_with_untracked<O>(&self, f: impl FnOnce(&Self::Value) -> O) -> Option<O>;
}

/// [`SignalSet`] without notifying subscribers.
pub trait SignalSetUntracked {
    /// The value held by the container.
    type Value;

    /// Sets the value without notifying subscribers.
    fn set_untracked(&self, new_value: Self::Value);

    /// Sets the value without notifying subscribers, returning
    /// `Some(new_value)` back if the node has been disposed.
    fn try_set_untracked(&self, new_value: Self::Value) -> Option<Self::Value>;
}

/// [`SignalUpdate`] without notifying subscribers.
pub trait SignalUpdateUntracked {
    /// The value held by the container.
    type Value;

    /// Mutates the value in place without notifying subscribers.
    fn update_untracked(&self, f: impl FnOnce(&mut Self::Value));

    /// Mutates the value in place without notifying subscribers, returning
    /// the closure's result or `None` if the node has been disposed.
    fn try_update_untracked<O>(&self, f: impl FnOnce(&mut Self::Value) -> O) -> Option<O>;
}

/// Removes a node from the reactive graph: its subscriptions in both
/// directions are released and later accesses report disposal.
pub trait SignalDispose {
    /// Disposes the underlying node. Other handles sharing the node (e.g.
    /// the paired read or write half) are invalidated too.
    fn dispose(self);
}

impl<T: Clone> SignalGet for ReadSignal<T> {
    type Value = T;

    #[cfg_attr(
        debug_assertions,
        tracing::instrument(
            level = "trace",
            name = "ReadSignal::get()",
            skip_all,
            fields(
                defined_at = %self.defined_at,
                ty = %std::any::type_name::<T>()
            )
        )
    )]
    fn get(&self) -> T {
        self.try_get()
            .unwrap_or_else(|| panic!("tried to get {self:?} after it was disposed"))
    }

    fn try_get(&self) -> Option<T> {
        self.id.try_with(self.runtime, T::clone).ok()
    }
}

impl<T> SignalWith for ReadSignal<T> {
    type Value = T;

    #[cfg_attr(
        debug_assertions,
        tracing::instrument(
            level = "trace",
            name = "ReadSignal::with()",
            skip_all,
            fields(
                defined_at = %self.defined_at,
                ty = %std::any::type_name::<T>()
            )
        )
    )]
    fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.id.try_with(self.runtime, f).ok()
    }
}

impl<T: Clone> SignalGetUntracked for ReadSignal<T> {
    type Value = T;

    fn get_untracked(&self) -> T {
        self.try_get_untracked()
            .unwrap_or_else(|| panic!("tried to get {self:?} after it was disposed"))
    }

    fn try_get_untracked(&self) -> Option<T> {
        self.id
            .try_with_no_subscription(self.runtime, T::clone)
            .ok()
    }
}

impl<T> SignalWithUntracked for ReadSignal<T> {
    type Value = T;

    fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with_untracked(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.id.try_with_no_subscription(self.runtime, f).ok()
    }
}

impl<T> SignalDispose for ReadSignal<T> {
    fn dispose(self) {
        self.id.dispose(self.runtime);
    }
}

impl<T> SignalSet for WriteSignal<T> {
    type Value = T;

    #[cfg_attr(
        debug_assertions,
        tracing::instrument(
            level = "trace",
            name = "WriteSignal::set()",
            skip_all,
            fields(
                defined_at = %self.defined_at,
                ty = %std::any::type_name::<T>()
            )
        )
    )]
    fn set(&self, new_value: T) {
        if self.id.try_set(self.runtime, new_value).is_some() {
            crate::macros::debug_warn!("tried to set {self:?} after it was disposed");
        }
    }

    fn try_set(&self, new_value: T) -> Option<T> {
        self.id.try_set(self.runtime, new_value)
    }
}

impl<T> SignalUpdate for WriteSignal<T> {
    type Value = T;

    #[cfg_attr(
        debug_assertions,
        tracing::instrument(
            level = "trace",
            name = "WriteSignal::update()",
            skip_all,
            fields(
                defined_at = %self.defined_at,
                ty = %std::any::type_name::<T>()
            )
        )
    )]
    fn update(&self, f: impl FnOnce(&mut T)) {
        if self.id.try_update(self.runtime, f).is_err() {
            crate::macros::debug_warn!("tried to update {self:?} after it was disposed");
        }
    }

    fn try_update<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.try_update(self.runtime, f).ok()
    }
}

impl<T> SignalSetUntracked for WriteSignal<T> {
    type Value = T;

    fn set_untracked(&self, new_value: T) {
        if self.try_set_untracked(new_value).is_some() {
            crate::macros::debug_warn!("tried to set {self:?} after it was disposed");
        }
    }

    fn try_set_untracked(&self, new_value: T) -> Option<T> {
        let mut new_value = Some(new_value);
        _ = self.id.try_update_value(self.runtime, |v: &mut T| {
            if let Some(incoming) = new_value.take() {
                *v = incoming;
            }
        });
        new_value
    }
}

impl<T> SignalUpdateUntracked for WriteSignal<T> {
    type Value = T;

    fn update_untracked(&self, f: impl FnOnce(&mut T)) {
        if self.id.try_update_value(self.runtime, f).is_err() {
            crate::macros::debug_warn!("tried to update {self:?} after it was disposed");
        }
    }

    fn try_update_untracked<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.try_update_value(self.runtime, f).ok()
    }
}

impl<T> SignalDispose for WriteSignal<T> {
    fn dispose(self) {
        self.id.dispose(self.runtime);
    }
}

impl<T: Clone> SignalGet for RwSignal<T> {
    type Value = T;

    fn get(&self) -> T {
        self.try_get()
            .unwrap_or_else(|| panic!("tried to get {self:?} after it was disposed"))
    }

    fn try_get(&self) -> Option<T> {
        self.id.try_with(self.runtime, T::clone).ok()
    }
}

impl<T> SignalWith for RwSignal<T> {
    type Value = T;

    fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.id.try_with(self.runtime, f).ok()
    }
}

impl<T> SignalSet for RwSignal<T> {
    type Value = T;

    fn set(&self, new_value: T) {
        if self.id.try_set(self.runtime, new_value).is_some() {
            crate::macros::debug_warn!("tried to set {self:?} after it was disposed");
        }
    }

    fn try_set(&self, new_value: T) -> Option<T> {
        self.id.try_set(self.runtime, new_value)
    }
}

impl<T> SignalUpdate for RwSignal<T> {
    type Value = T;

    fn update(&self, f: impl FnOnce(&mut T)) {
        if self.id.try_update(self.runtime, f).is_err() {
            crate::macros::debug_warn!("tried to update {self:?} after it was disposed");
        }
    }

    fn try_update<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.try_update(self.runtime, f).ok()
    }
}

impl<T: Clone> SignalGetUntracked for RwSignal<T> {
    type Value = T;

    fn get_untracked(&self) -> T {
        self.try_get_untracked()
            .unwrap_or_else(|| panic!("tried to get {self:?} after it was disposed"))
    }

    fn try_get_untracked(&self) -> Option<T> {
        self.id
            .try_with_no_subscription(self.runtime, T::clone)
            .ok()
    }
}

impl<T> SignalWithUntracked for RwSignal<T> {
    type Value = T;

    fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with_untracked(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.id.try_with_no_subscription(self.runtime, f).ok()
    }
}

impl<T> SignalSetUntracked for RwSignal<T> {
    type Value = T;

    fn set_untracked(&self, new_value: T) {
        if self.try_set_untracked(new_value).is_some() {
            crate::macros::debug_warn!("tried to set {self:?} after it was disposed");
        }
    }

    fn try_set_untracked(&self, new_value: T) -> Option<T> {
        let mut new_value = Some(new_value);
        _ = self.id.try_update_value(self.runtime, |v: &mut T| {
            if let Some(incoming) = new_value.take() {
                *v = incoming;
            }
        });
        new_value
    }
}

impl<T> SignalUpdateUntracked for RwSignal<T> {
    type Value = T;

    fn update_untracked(&self, f: impl FnOnce(&mut T)) {
        if self.id.try_update_value(self.runtime, f).is_err() {
            crate::macros::debug_warn!("tried to update {self:?} after it was disposed");
        }
    }

    fn try_update_untracked<O>(&self, f: impl FnOnce(&mut T) -> O) -> Option<O> {
        self.id.try_update_value(self.runtime, f).ok()
    }
}

impl<T> SignalDispose for RwSignal<T> {
    fn dispose(self) {
        self.id.dispose(self.runtime);
    }
}
