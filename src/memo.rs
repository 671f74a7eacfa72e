use crate::{
    node::{AnyComputation, ReactiveNode, ReactiveNodeState, ReactiveNodeType},
    runtime::{current_runtime, with_runtime, RuntimeId},
    ReadSignal, SignalDispose, SignalGet, SignalGetUntracked, SignalWith, SignalWithUntracked,
};
use std::{any::Any, cell::RefCell, fmt::Debug, marker::PhantomData, rc::Rc};

/// Creates an efficient derived reactive value based on other reactive
/// values.
///
/// Unlike a plain derived closure, a memo comes with two guarantees:
/// 1. The memo will only run *once* per change, no matter how many times you
///    access its value.
/// 2. The memo will only notify its dependents if the value of the
///    computation changes.
///
/// Reading a memo inside another observer subscribes that observer to the
/// memo's cached cell, not to the memo's own sources. Together with lazy
/// re-validation this is what collapses diamond-shaped graphs into a single
/// recomputation per change.
///
/// As with [`create_effect`](crate::create_effect), the argument to the memo
/// function is the previous value, `None` for the initial calculation.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (value, set_value) = create_signal(0);
/// let double_value = create_memo(move |_| value.get() * 2);
///
/// assert_eq!(double_value.get(), 0);
/// set_value.set(2);
/// assert_eq!(double_value.get(), 4);
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_memo<T>(f: impl Fn(Option<&T>) -> T + 'static) -> Memo<T>
where
    T: PartialEq + 'static,
{
    current_runtime().create_memo_with_compare(f, PartialEq::eq)
}

/// Like [`create_memo`], but downstream notification is gated by the given
/// equality predicate instead of `PartialEq`.
#[track_caller]
pub fn create_memo_with_compare<T>(
    f: impl Fn(Option<&T>) -> T + 'static,
    compare: impl Fn(&T, &T) -> bool + 'static,
) -> Memo<T>
where
    T: 'static,
{
    current_runtime().create_memo_with_compare(f, compare)
}

impl RuntimeId {
    #[track_caller]
    pub(crate) fn create_memo_with_compare<T>(
        self,
        f: impl Fn(Option<&T>) -> T + 'static,
        compare: impl Fn(&T, &T) -> bool + 'static,
    ) -> Memo<T>
    where
        T: 'static,
    {
        #[cfg(debug_assertions)]
        let defined_at = std::panic::Location::caller();

        let id = with_runtime(self, |runtime| {
            runtime.nodes.borrow_mut().insert(ReactiveNode {
                value: Rc::new(RefCell::new(None::<T>)) as Rc<RefCell<dyn Any>>,
                // memos are lazy: dirty when created, first computed when
                // first read
                state: ReactiveNodeState::Dirty,
                node_type: ReactiveNodeType::Memo {
                    f: Rc::new(MemoState {
                        f,
                        compare: Box::new(compare),
                        ty: PhantomData,
                    }),
                },
            })
        })
        .expect("tried to create a memo in a runtime that has been disposed");

        Memo(
            ReadSignal {
                runtime: self,
                id,
                ty: PhantomData,
                #[cfg(debug_assertions)]
                defined_at,
            },
            #[cfg(debug_assertions)]
            defined_at,
        )
    }
}

/// A cached derived reactive value; see [`create_memo`].
pub struct Memo<T>(
    pub(crate) ReadSignal<Option<T>>,
    #[cfg(debug_assertions)] pub(crate) &'static std::panic::Location<'static>,
)
where
    T: 'static;

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Memo<T> {}

impl<T> Debug for Memo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Memo");
        s.field("runtime", &self.0.runtime).field("id", &self.0.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.1);
        s.finish()
    }
}

impl<T> PartialEq for Memo<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Memo<T> {}

impl<T: Clone> SignalGet for Memo<T> {
    type Value = T;

    #[cfg_attr(
        debug_assertions,
        tracing::instrument(
            level = "trace",
            name = "Memo::get()",
            skip_all,
            fields(
                defined_at = %self.1,
                ty = %std::any::type_name::<T>()
            )
        )
    )]
    fn get(&self) -> T {
        self.with(T::clone)
    }

    fn try_get(&self) -> Option<T> {
        self.try_with(T::clone)
    }
}

impl<T> SignalWith for Memo<T> {
    type Value = T;

    fn with<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        // `T` is always `Some` by the time the node has been computed,
        // which reading it guarantees
        self.0
            .try_with(|t| t.as_ref().map(f))
            .flatten()
    }
}

impl<T: Clone> SignalGetUntracked for Memo<T> {
    type Value = T;

    fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }

    fn try_get_untracked(&self) -> Option<T> {
        self.try_with_untracked(T::clone)
    }
}

impl<T> SignalWithUntracked for Memo<T> {
    type Value = T;

    fn with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> O {
        self.try_with_untracked(f)
            .unwrap_or_else(|| panic!("tried to read {self:?} after it was disposed"))
    }

    fn try_with_untracked<O>(&self, f: impl FnOnce(&T) -> O) -> Option<O> {
        self.0
            .try_with_untracked(|t| t.as_ref().map(f))
            .flatten()
    }
}

impl<T> SignalDispose for Memo<T> {
    fn dispose(self) {
        self.0.id.dispose(self.0.runtime);
    }
}

pub(crate) struct MemoState<T, F>
where
    T: 'static,
    F: Fn(Option<&T>) -> T,
{
    pub f: F,
    pub compare: Box<dyn Fn(&T, &T) -> bool>,
    pub ty: PhantomData<T>,
}

impl<T, F> AnyComputation for MemoState<T, F>
where
    T: 'static,
    F: Fn(Option<&T>) -> T,
{
    fn run(&self, value: Rc<RefCell<dyn Any>>) -> bool {
        let (new_value, changed) = {
            let value = value.borrow();
            let curr_value = value
                .downcast_ref::<Option<T>>()
                .expect("to downcast memo value");

            // compute the new value
            let new_value = (self.f)(curr_value.as_ref());
            let changed = match curr_value.as_ref() {
                Some(curr_value) => !(self.compare)(curr_value, &new_value),
                None => true,
            };
            (new_value, changed)
        };

        // a recomputation yielding an equal value leaves the cached cell
        // untouched and suppresses downstream notification
        if changed {
            let mut value = value.borrow_mut();
            let value = value
                .downcast_mut::<Option<T>>()
                .expect("to downcast memo value");
            *value = Some(new_value);
        }

        changed
    }
}
