use crate::{
    node::{AnyComputation, NodeId, ReactiveNode, ReactiveNodeState, ReactiveNodeType},
    runtime::{current_runtime, with_runtime, RuntimeId},
};
use std::{any::Any, cell::RefCell, fmt::Debug, marker::PhantomData, rc::Rc};

/// Creates an effect: a computation that synchronizes the reactive system
/// with the outside world. The body runs once immediately; every signal or
/// memo read during that run subscribes the effect, and when any of them
/// changes, the whole body runs again.
///
/// The dependency set is rebuilt from zero on each run, so an effect that
/// stops reading a signal (for example behind a conditional) stops being
/// notified by it after the next run.
///
/// The argument passed to the body is the previous run's return value, or
/// `None` on the first run.
///
/// ```
/// # use rd_reactive::*;
/// # use std::{cell::RefCell, rc::Rc};
/// # let runtime = create_runtime();
/// let (a, set_a) = create_signal(-1);
///
/// // simulate an arbitrary side effect
/// let b = Rc::new(RefCell::new(String::new()));
///
/// create_effect({
///     let b = b.clone();
///     move |_| {
///         *b.borrow_mut() = format!("Value is {}", a.get());
///     }
/// });
/// assert_eq!(b.borrow().as_str(), "Value is -1");
///
/// set_a.set(1);
/// assert_eq!(b.borrow().as_str(), "Value is 1");
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_effect<T>(f: impl Fn(Option<T>) -> T + 'static) -> Effect<T>
where
    T: 'static,
{
    current_runtime().create_effect(f)
}

impl RuntimeId {
    pub(crate) fn create_concrete_effect(
        self,
        value: Rc<RefCell<dyn Any>>,
        effect: Rc<dyn AnyComputation>,
    ) -> NodeId {
        let id = with_runtime(self, |runtime| {
            let id = runtime.nodes.borrow_mut().insert(ReactiveNode {
                value: Rc::clone(&value),
                state: ReactiveNodeState::Clean,
                node_type: ReactiveNodeType::Effect {
                    f: Rc::clone(&effect),
                },
            });

            // run the effect for the first time, capturing its dependencies
            runtime.with_observer(id, || {
                effect.run(value);
            });

            id
        })
        .expect("tried to create an effect in a runtime that has been disposed");

        // the first run may have written other signals; deliver now that the
        // observer slot is clear
        _ = with_runtime(self, |runtime| runtime.run_effects());

        id
    }

    #[track_caller]
    pub(crate) fn create_effect<T>(self, f: impl Fn(Option<T>) -> T + 'static) -> Effect<T>
    where
        T: 'static,
    {
        #[cfg(debug_assertions)]
        let defined_at = std::panic::Location::caller();

        let effect = EffectState {
            f,
            ty: PhantomData,
        };
        let value = Rc::new(RefCell::new(None::<T>)) as Rc<RefCell<dyn Any>>;
        let id = self.create_concrete_effect(value, Rc::new(effect));

        Effect {
            runtime: self,
            id,
            ty: PhantomData,
            #[cfg(debug_assertions)]
            defined_at,
        }
    }
}

/// A handle to a running effect. Dropping the handle does nothing; call
/// [`Effect::dispose`] to unsubscribe the effect from everything it reads
/// and stop it permanently.
pub struct Effect<T>
where
    T: 'static,
{
    pub(crate) runtime: RuntimeId,
    pub(crate) id: NodeId,
    pub(crate) ty: PhantomData<T>,
    #[cfg(debug_assertions)]
    pub(crate) defined_at: &'static std::panic::Location<'static>,
}

impl<T> Clone for Effect<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Effect<T> {}

impl<T> Debug for Effect<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("Effect");
        s.field("runtime", &self.runtime).field("id", &self.id);
        #[cfg(debug_assertions)]
        s.field("defined_at", &self.defined_at);
        s.finish()
    }
}

impl<T> PartialEq for Effect<T> {
    fn eq(&self, other: &Self) -> bool {
        self.runtime == other.runtime && self.id == other.id
    }
}

impl<T> Eq for Effect<T> {}

impl<T> Effect<T> {
    /// Removes the effect from the subscriber set of every node it reads
    /// and deletes it from the graph. It will never run again.
    pub fn dispose(self) {
        self.id.dispose(self.runtime);
    }
}

pub(crate) struct EffectState<T, F>
where
    T: 'static,
    F: Fn(Option<T>) -> T,
{
    pub f: F,
    pub ty: PhantomData<T>,
}

impl<T, F> AnyComputation for EffectState<T, F>
where
    T: 'static,
    F: Fn(Option<T>) -> T,
{
    fn run(&self, value: Rc<RefCell<dyn Any>>) -> bool {
        let curr_value = {
            let mut value = value.borrow_mut();
            let value = value
                .downcast_mut::<Option<T>>()
                .expect("to downcast effect value");
            value.take()
        };

        // run the effect
        let new_value = (self.f)(curr_value);

        // set new value
        {
            let mut value = value.borrow_mut();
            let value = value
                .downcast_mut::<Option<T>>()
                .expect("to downcast effect value");
            *value = Some(new_value);
        }

        true
    }
}
