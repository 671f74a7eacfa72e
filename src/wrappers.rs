use crate::{
    runtime::untrack, store_value, Memo, ReadSignal, RwSignal, SignalGet, SignalGetUntracked,
    SignalSet, SignalWith, SignalWithUntracked, StoredValue, WriteSignal,
};
use std::fmt::Debug;

/// A wrapper for any kind of readable reactive value: a
/// [`ReadSignal`](crate::ReadSignal), a [`Memo`](crate::Memo), an
/// [`RwSignal`](crate::RwSignal), or a derived closure.
///
/// This allows you to create APIs that take any kind of `Signal<T>` as an
/// argument, rather than adding a generic `F: Fn() -> T`. Values can be
/// accessed with the same `get()` and `with()` APIs as other signals.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (count, set_count) = create_signal(2);
/// let double_count = Signal::derive(move || count.get() * 2);
/// let memoized_double_count = create_memo(move |_| count.get() * 2);
///
/// // this function takes any kind of wrapped signal
/// fn above_3(arg: &Signal<i32>) -> bool {
///     arg.get() > 3
/// }
///
/// assert_eq!(above_3(&count.into()), false);
/// assert_eq!(above_3(&double_count), true);
/// assert_eq!(above_3(&memoized_double_count.into()), true);
/// # runtime.dispose();
/// ```
pub struct Signal<T>
where
    T: 'static,
{
    inner: SignalTypes<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal").field("inner", &self.inner).finish()
    }
}

impl<T> PartialEq for Signal<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Signal<T> {}

impl<T> Signal<T> {
    /// Wraps a derived closure, i.e., any computation that reads one or
    /// more reactive values. Unlike a memo, the closure re-runs on every
    /// access.
    pub fn derive(derived_signal: impl Fn() -> T + 'static) -> Self {
        Self {
            inner: SignalTypes::DerivedSignal(store_value(Box::new(derived_signal))),
        }
    }
}

impl<T: Clone> SignalGet for Signal<T> {
    type Value = T;

    fn get(&self) -> T {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.get(),
            SignalTypes::Memo(m) => m.get(),
            SignalTypes::DerivedSignal(f) => f.with_value(|f| f()),
        }
    }

    fn try_get(&self) -> Option<T> {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.try_get(),
            SignalTypes::Memo(m) => m.try_get(),
            SignalTypes::DerivedSignal(f) => f.try_with_value(|f| f()),
        }
    }
}

impl<T> SignalWith for Signal<T> {
    type Value = T;

    fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.with(f),
            SignalTypes::Memo(m) => m.with(f),
            SignalTypes::DerivedSignal(v) => f(&v.with_value(|v| v())),
        }
    }

    fn try_with<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.try_with(f),
            SignalTypes::Memo(m) => m.try_with(f),
            SignalTypes::DerivedSignal(v) => v.try_with_value(|v| v()).map(|value| f(&value)),
        }
    }
}

impl<T: Clone> SignalGetUntracked for Signal<T> {
    type Value = T;

    fn get_untracked(&self) -> T {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.get_untracked(),
            SignalTypes::Memo(m) => m.get_untracked(),
            SignalTypes::DerivedSignal(f) => untrack(|| f.with_value(|f| f())),
        }
    }

    fn try_get_untracked(&self) -> Option<T> {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.try_get_untracked(),
            SignalTypes::Memo(m) => m.try_get_untracked(),
            SignalTypes::DerivedSignal(f) => untrack(|| f.try_with_value(|f| f())),
        }
    }
}

impl<T> SignalWithUntracked for Signal<T> {
    type Value = T;

    fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.with_untracked(f),
            SignalTypes::Memo(m) => m.with_untracked(f),
            SignalTypes::DerivedSignal(v) => untrack(|| f(&v.with_value(|v| v()))),
        }
    }

    fn try_with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        match &self.inner {
            SignalTypes::ReadSignal(s) => s.try_with_untracked(f),
            SignalTypes::Memo(m) => m.try_with_untracked(f),
            SignalTypes::DerivedSignal(v) => {
                untrack(|| v.try_with_value(|v| v()).map(|value| f(&value)))
            }
        }
    }
}

impl<T> From<ReadSignal<T>> for Signal<T> {
    fn from(value: ReadSignal<T>) -> Self {
        Self {
            inner: SignalTypes::ReadSignal(value),
        }
    }
}

impl<T> From<RwSignal<T>> for Signal<T> {
    fn from(value: RwSignal<T>) -> Self {
        Self {
            inner: SignalTypes::ReadSignal(value.read_only()),
        }
    }
}

impl<T> From<Memo<T>> for Signal<T> {
    fn from(value: Memo<T>) -> Self {
        Self {
            inner: SignalTypes::Memo(value),
        }
    }
}

enum SignalTypes<T>
where
    T: 'static,
{
    ReadSignal(ReadSignal<T>),
    Memo(Memo<T>),
    DerivedSignal(StoredValue<Box<dyn Fn() -> T>>),
}

impl<T> Clone for SignalTypes<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SignalTypes<T> {}

impl<T> Debug for SignalTypes<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadSignal(arg0) => f.debug_tuple("ReadSignal").field(arg0).finish(),
            Self::Memo(arg0) => f.debug_tuple("Memo").field(arg0).finish(),
            Self::DerivedSignal(_) => f.debug_tuple("DerivedSignal").finish(),
        }
    }
}

impl<T> PartialEq for SignalTypes<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::ReadSignal(l0), Self::ReadSignal(r0)) => l0 == r0,
            (Self::Memo(l0), Self::Memo(r0)) => l0 == r0,
            (Self::DerivedSignal(l0), Self::DerivedSignal(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl<T> Eq for SignalTypes<T> {}

/// A value that is either a static literal or a reactive signal.
///
/// This is the marker consumers use to decide whether a value should be
/// bound reactively or treated as a constant: a rendering layer can accept
/// `impl Into<MaybeSignal<T>>` for a prop and re-render only for the
/// `Dynamic` case.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (count, set_count) = create_signal(2);
///
/// // this function takes either a reactive or a constant value
/// fn above_3(arg: &MaybeSignal<i32>) -> bool {
///     arg.get() > 3
/// }
///
/// assert_eq!(above_3(&4.into()), true);
/// assert_eq!(above_3(&count.into()), false);
/// set_count.set(5);
/// assert_eq!(above_3(&count.into()), true);
/// # runtime.dispose();
/// ```
#[derive(Debug, PartialEq, Eq)]
pub enum MaybeSignal<T>
where
    T: 'static,
{
    /// An unchanging value of type `T`.
    Static(T),
    /// A reactive signal that contains a value of type `T`.
    Dynamic(Signal<T>),
}

impl<T: Clone> Clone for MaybeSignal<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(item) => Self::Static(item.clone()),
            Self::Dynamic(signal) => Self::Dynamic(*signal),
        }
    }
}

impl<T: Copy> Copy for MaybeSignal<T> {}

impl<T: Default> Default for MaybeSignal<T> {
    fn default() -> Self {
        Self::Static(Default::default())
    }
}

impl<T> MaybeSignal<T> {
    /// Wraps a derived closure as a dynamic value.
    pub fn derive(derived_signal: impl Fn() -> T + 'static) -> Self {
        Self::Dynamic(Signal::derive(derived_signal))
    }
}

impl<T: Clone> SignalGet for MaybeSignal<T> {
    type Value = T;

    fn get(&self) -> T {
        match self {
            Self::Static(t) => t.clone(),
            Self::Dynamic(s) => s.get(),
        }
    }

    fn try_get(&self) -> Option<T> {
        match self {
            Self::Static(t) => Some(t.clone()),
            Self::Dynamic(s) => s.try_get(),
        }
    }
}

impl<T> SignalWith for MaybeSignal<T> {
    type Value = T;

    fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        match self {
            Self::Static(t) => f(t),
            Self::Dynamic(s) => s.with(f),
        }
    }

    fn try_with<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        match self {
            Self::Static(t) => Some(f(t)),
            Self::Dynamic(s) => s.try_with(f),
        }
    }
}

impl<T: Clone> SignalGetUntracked for MaybeSignal<T> {
    type Value = T;

    fn get_untracked(&self) -> T {
        match self {
            Self::Static(t) => t.clone(),
            Self::Dynamic(s) => s.get_untracked(),
        }
    }

    fn try_get_untracked(&self) -> Option<T> {
        match self {
            Self::Static(t) => Some(t.clone()),
            Self::Dynamic(s) => s.try_get_untracked(),
        }
    }
}

impl<T> SignalWithUntracked for MaybeSignal<T> {
    type Value = T;

    fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        match self {
            Self::Static(t) => f(t),
            Self::Dynamic(s) => s.with_untracked(f),
        }
    }

    fn try_with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        match self {
            Self::Static(t) => Some(f(t)),
            Self::Dynamic(s) => s.try_with_untracked(f),
        }
    }
}

impl<T> From<T> for MaybeSignal<T> {
    fn from(value: T) -> Self {
        Self::Static(value)
    }
}

impl<T> From<ReadSignal<T>> for MaybeSignal<T> {
    fn from(value: ReadSignal<T>) -> Self {
        Self::Dynamic(value.into())
    }
}

impl<T> From<RwSignal<T>> for MaybeSignal<T> {
    fn from(value: RwSignal<T>) -> Self {
        Self::Dynamic(value.into())
    }
}

impl<T> From<Memo<T>> for MaybeSignal<T> {
    fn from(value: Memo<T>) -> Self {
        Self::Dynamic(value.into())
    }
}

impl<T> From<Signal<T>> for MaybeSignal<T> {
    fn from(value: Signal<T>) -> Self {
        Self::Dynamic(value)
    }
}

/// A wrapper for any kind of settable reactive value: a
/// [`WriteSignal`](crate::WriteSignal), an [`RwSignal`](crate::RwSignal),
/// or a closure that receives a value and writes one or more signals
/// depending on it.
///
/// This allows you to create APIs that take any kind of `SignalSetter<T>`
/// as an argument, rather than adding a generic `F: Fn(T)`. Values can be
/// set with the same `set()` API as other signals.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (count, set_count) = create_signal(2);
/// let set_double_input = SignalSetter::map(move |n| set_count.set(n * 2));
///
/// // this function takes any kind of signal setter
/// fn set_to_4(setter: &SignalSetter<i32>) {
///     setter.set(4);
/// }
///
/// set_to_4(&set_count.into());
/// assert_eq!(count.get(), 4);
/// set_to_4(&set_double_input);
/// assert_eq!(count.get(), 8);
/// # runtime.dispose();
/// ```
pub struct SignalSetter<T>
where
    T: 'static,
{
    inner: SignalSetterTypes<T>,
}

impl<T> Clone for SignalSetter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SignalSetter<T> {}

impl<T> Debug for SignalSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalSetter")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T> PartialEq for SignalSetter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for SignalSetter<T> {}

impl<T> SignalSetter<T> {
    /// Wraps a signal-setting closure, i.e., any computation that writes
    /// one or more reactive signals from the incoming value.
    pub fn map(mapped_setter: impl Fn(T) + 'static) -> Self {
        Self {
            inner: SignalSetterTypes::Mapped(store_value(Box::new(mapped_setter))),
        }
    }
}

impl<T> SignalSet for SignalSetter<T> {
    type Value = T;

    fn set(&self, new_value: T) {
        match &self.inner {
            SignalSetterTypes::Write(w) => w.set(new_value),
            SignalSetterTypes::Mapped(s) => s.with_value(|setter| setter(new_value)),
        }
    }

    fn try_set(&self, new_value: T) -> Option<T> {
        match &self.inner {
            SignalSetterTypes::Write(w) => w.try_set(new_value),
            SignalSetterTypes::Mapped(s) => {
                let mut new_value = Some(new_value);
                _ = s.try_with_value(|setter| {
                    if let Some(value) = new_value.take() {
                        setter(value)
                    }
                });
                new_value
            }
        }
    }
}

impl<T> From<WriteSignal<T>> for SignalSetter<T> {
    fn from(value: WriteSignal<T>) -> Self {
        Self {
            inner: SignalSetterTypes::Write(value),
        }
    }
}

impl<T> From<RwSignal<T>> for SignalSetter<T> {
    fn from(value: RwSignal<T>) -> Self {
        Self {
            inner: SignalSetterTypes::Write(value.write_only()),
        }
    }
}

enum SignalSetterTypes<T>
where
    T: 'static,
{
    Write(WriteSignal<T>),
    Mapped(StoredValue<Box<dyn Fn(T)>>),
}

impl<T> Clone for SignalSetterTypes<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SignalSetterTypes<T> {}

impl<T> Debug for SignalSetterTypes<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Write(arg0) => f.debug_tuple("WriteSignal").field(arg0).finish(),
            Self::Mapped(_) => f.debug_tuple("Mapped").finish(),
        }
    }
}

impl<T> PartialEq for SignalSetterTypes<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Write(l0), Self::Write(r0)) => l0 == r0,
            (Self::Mapped(l0), Self::Mapped(r0)) => l0 == r0,
            _ => false,
        }
    }
}

impl<T> Eq for SignalSetterTypes<T> {}
