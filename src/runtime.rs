use crate::{
    macros::debug_warn,
    node::{NodeId, ReactiveNode, ReactiveNodeState, ReactiveNodeType},
};
use rustc_hash::FxHashSet;
use slotmap::{SecondaryMap, SlotMap};
use std::{
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::Rc,
};
use thiserror::Error;

thread_local! {
    pub(crate) static RUNTIMES: RefCell<SlotMap<RuntimeId, Runtime>> = Default::default();
    static CURRENT_RUNTIME: Cell<Option<RuntimeId>> = const { Cell::new(None) };
}

slotmap::new_key_type! {
    /// Unique ID assigned to a [`Runtime`].
    pub struct RuntimeId;
}

/// Errors caused by accessing the reactive graph after part of it has been
/// torn down. Internal plumbing: the public fallible accessors surface these
/// as `None` from their `try_*` variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum ReactiveError {
    /// The runtime the node belonged to has been disposed.
    #[error("tried to access a reactive runtime that has been disposed")]
    RuntimeDisposed,
    /// The node itself has been disposed.
    #[error("tried to access a reactive node that has been disposed")]
    NodeDisposed,
}

/// Creates a new reactive [`Runtime`] and makes it the current runtime for
/// this thread. All signals, effects, and memos created afterward belong to
/// it until it is disposed.
#[must_use = "Runtime will leak memory if Runtime::dispose() is never called"]
pub fn create_runtime() -> RuntimeId {
    let id = RUNTIMES.with(|runtimes| runtimes.borrow_mut().insert(Runtime::new()));
    CURRENT_RUNTIME.with(|current| current.set(Some(id)));
    id
}

impl RuntimeId {
    /// Disposes the runtime and every node created in it.
    pub fn dispose(self) {
        let runtime = RUNTIMES.with(|runtimes| runtimes.borrow_mut().remove(self));
        CURRENT_RUNTIME.with(|current| {
            if current.get() == Some(self) {
                current.set(None);
            }
        });
        drop(runtime);
    }
}

/// The runtime new nodes are created in. Panics if no runtime exists on this
/// thread.
pub(crate) fn current_runtime() -> RuntimeId {
    CURRENT_RUNTIME
        .with(|current| current.get())
        .expect("no current reactive runtime; call create_runtime() first")
}

pub(crate) fn with_runtime<T>(
    id: RuntimeId,
    f: impl FnOnce(&Runtime) -> T,
) -> Result<T, ReactiveError> {
    RUNTIMES.with(|runtimes| {
        let runtimes = runtimes.borrow();
        match runtimes.get(id) {
            Some(runtime) => Ok(f(runtime)),
            None => Err(ReactiveError::RuntimeDisposed),
        }
    })
}

/// Runs `f` untracked: reads inside it do not subscribe the currently
/// running observer, if any. The observer slot is restored on the way out,
/// including on panic.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (a, set_a) = create_signal(0);
/// let (b, set_b) = create_signal(0);
///
/// // this memo reads `a` reactively but `b` untracked, so it only
/// // recomputes when `a` changes
/// let sum = create_memo(move |_| a.get() + untrack(move || b.get()));
///
/// assert_eq!(sum.get(), 0);
/// set_b.set(10);
/// assert_eq!(sum.get(), 0);
/// set_a.set(1);
/// assert_eq!(sum.get(), 11);
/// # runtime.dispose();
/// ```
pub fn untrack<T>(f: impl FnOnce() -> T) -> T {
    with_runtime(current_runtime(), |runtime| {
        let _restore = RestoreObserver::new(&runtime.observer, None);
        f()
    })
    .expect("tried to run untracked code in a runtime that has been disposed")
}

/// Batches writes so that subscribers are notified once, at the end of the
/// batch, rather than once per write. Nested batches drain at the outermost
/// boundary.
///
/// ```
/// # use rd_reactive::*;
/// # use std::{cell::Cell, rc::Rc};
/// # let runtime = create_runtime();
/// let (first, set_first) = create_signal("Ada");
/// let (last, set_last) = create_signal("Lovelace");
/// let runs = Rc::new(Cell::new(0));
///
/// create_effect({
///     let runs = Rc::clone(&runs);
///     move |_| {
///         (first.get(), last.get());
///         runs.set(runs.get() + 1);
///     }
/// });
/// assert_eq!(runs.get(), 1);
///
/// batch(move || {
///     set_first.set("Grace");
///     set_last.set("Hopper");
/// });
/// // both writes, one notification pass
/// assert_eq!(runs.get(), 2);
/// # runtime.dispose();
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    let id = current_runtime();
    let value = {
        let _guard = BatchGuard::start(id);
        f()
    };
    // the guard has restored the previous batching state; at the outermost
    // boundary this drains everything queued during the batch
    _ = with_runtime(id, |runtime| runtime.run_effects());
    value
}

struct BatchGuard {
    id: RuntimeId,
    prev: bool,
}

impl BatchGuard {
    fn start(id: RuntimeId) -> Self {
        let prev = with_runtime(id, |runtime| runtime.batching.replace(true))
            .expect("tried to open a batch in a runtime that has been disposed");
        Self { id, prev }
    }
}

impl Drop for BatchGuard {
    fn drop(&mut self) {
        _ = with_runtime(self.id, |runtime| runtime.batching.set(self.prev));
    }
}

/// Restores the previous observer when dropped, so a panicking observer body
/// cannot leak a stale "current observer" into unrelated reads.
struct RestoreObserver<'a> {
    slot: &'a Cell<Option<NodeId>>,
    prev: Option<NodeId>,
}

impl<'a> RestoreObserver<'a> {
    fn new(slot: &'a Cell<Option<NodeId>>, observer: Option<NodeId>) -> Self {
        let prev = slot.replace(observer);
        Self { slot, prev }
    }
}

impl Drop for RestoreObserver<'_> {
    fn drop(&mut self) {
        self.slot.set(self.prev);
    }
}

#[derive(Default)]
pub(crate) struct Runtime {
    pub observer: Cell<Option<NodeId>>,
    pub nodes: RefCell<SlotMap<NodeId, ReactiveNode>>,
    pub node_subscribers: RefCell<SecondaryMap<NodeId, RefCell<FxHashSet<NodeId>>>>,
    pub node_sources: RefCell<SecondaryMap<NodeId, RefCell<FxHashSet<NodeId>>>>,
    pub pending_effects: RefCell<Vec<NodeId>>,
    pub batching: Cell<bool>,
}

// In terms of concept and algorithm, this propagation scheme is significantly
// inspired by Reactively (https://github.com/modderme123/reactively)
impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-validates a node that may be stale: checks its sources first (so a
    /// memo recomputing to an equal value stops propagation), recomputes it
    /// if it is actually dirty, and leaves it clean.
    pub(crate) fn update_if_necessary(&self, node_id: NodeId) {
        if self.current_state(node_id) == ReactiveNodeState::Check {
            let sources = {
                let sources = self.node_sources.borrow();
                sources.get(node_id).map(|n| n.borrow().clone())
            };
            for source in sources.into_iter().flatten() {
                self.update_if_necessary(source);
                if self.current_state(node_id) == ReactiveNodeState::Dirty {
                    // as soon as a single source has marked us dirty, we can
                    // stop checking the rest to avoid over-re-running
                    break;
                }
            }
        }

        if self.current_state(node_id) == ReactiveNodeState::Dirty {
            self.update(node_id);
        }

        self.mark_clean(node_id);
    }

    pub(crate) fn update(&self, node_id: NodeId) {
        debug_warn!("updating {node_id:?}");
        let node = {
            let nodes = self.nodes.borrow();
            nodes.get(node_id).cloned()
        };
        let subs = {
            let subs = self.node_subscribers.borrow();
            subs.get(node_id).cloned()
        };
        if let Some(node) = node {
            // memos and effects re-run; signals simply have their value
            let changed = match node.node_type {
                ReactiveNodeType::Signal { .. } => true,
                ReactiveNodeType::Memo { f } | ReactiveNodeType::Effect { f } => {
                    self.with_observer(node_id, || {
                        // subscriptions are rebuilt from zero on every run
                        self.cleanup_sources(node_id);
                        f.run(Rc::clone(&node.value))
                    })
                }
            };

            if changed {
                if let Some(subs) = subs {
                    let mut nodes = self.nodes.borrow_mut();
                    for sub_id in subs.borrow().iter() {
                        if let Some(sub) = nodes.get_mut(*sub_id) {
                            sub.state = ReactiveNodeState::Dirty;
                        }
                    }
                }
            }

            self.mark_clean(node_id);
        }
    }

    /// Removes `node_id` from the subscriber set of every node it read
    /// during its previous run, and clears its source set. Reads during the
    /// coming run rebuild both sides.
    pub(crate) fn cleanup_sources(&self, node_id: NodeId) {
        let sources = self.node_sources.borrow();
        if let Some(sources) = sources.get(node_id) {
            let subs = self.node_subscribers.borrow();
            for source in sources.borrow().iter() {
                if let Some(source) = subs.get(*source) {
                    source.borrow_mut().remove(&node_id);
                }
            }
            sources.borrow_mut().clear();
        }
    }

    fn current_state(&self, node: NodeId) -> ReactiveNodeState {
        match self.nodes.borrow().get(node) {
            None => ReactiveNodeState::Clean,
            Some(node) => node.state,
        }
    }

    pub(crate) fn with_observer<T>(&self, observer: NodeId, f: impl FnOnce() -> T) -> T {
        let _restore = RestoreObserver::new(&self.observer, Some(observer));
        f()
    }

    fn mark_clean(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(node) = nodes.get_mut(node) {
            node.state = ReactiveNodeState::Clean;
        }
    }

    /// Marks the written node dirty and every transitive subscriber as
    /// needing a check, queuing affected effects. Delivery happens in
    /// [`Runtime::run_effects`], never here.
    pub(crate) fn mark_dirty(&self, node: NodeId) {
        debug_warn!("marking {node:?} dirty");
        let mut nodes = self.nodes.borrow_mut();
        let mut pending_effects = self.pending_effects.borrow_mut();
        let subscribers = self.node_subscribers.borrow();
        let current_observer = self.observer.get();

        if let Some(current_node) = nodes.get_mut(node) {
            Runtime::mark(
                node,
                current_node,
                ReactiveNodeState::Dirty,
                &mut pending_effects,
                current_observer,
            );

            let mut descendants = FxHashSet::default();
            Runtime::gather_descendants(&subscribers, node, &mut descendants);
            for descendant in descendants {
                if let Some(node) = nodes.get_mut(descendant) {
                    Runtime::mark(
                        descendant,
                        node,
                        ReactiveNodeState::Check,
                        &mut pending_effects,
                        current_observer,
                    );
                }
            }
        }
    }

    fn mark(
        node_id: NodeId,
        node: &mut ReactiveNode,
        level: ReactiveNodeState,
        pending_effects: &mut Vec<NodeId>,
        current_observer: Option<NodeId>,
    ) {
        if level > node.state {
            node.state = level;
        }
        // a running observer is never queued for its own writes
        if matches!(node.node_type, ReactiveNodeType::Effect { .. })
            && current_observer != Some(node_id)
        {
            pending_effects.push(node_id);
        }
    }

    fn gather_descendants(
        subscribers: &SecondaryMap<NodeId, RefCell<FxHashSet<NodeId>>>,
        node: NodeId,
        descendants: &mut FxHashSet<NodeId>,
    ) {
        if let Some(children) = subscribers.get(node) {
            for child in children.borrow().iter() {
                if descendants.insert(*child) {
                    Runtime::gather_descendants(subscribers, *child, descendants);
                }
            }
        }
    }

    /// Drains the queue of affected effects. A no-op while a batch is open
    /// or an observer body is running: in both cases the queue is drained
    /// again once the outermost synchronous turn ends, so notification is
    /// never delivered re-entrantly into a running observer.
    pub(crate) fn run_effects(&self) {
        if self.batching.get() || self.observer.get().is_some() {
            return;
        }
        loop {
            let effects = self.pending_effects.take();
            if effects.is_empty() {
                break;
            }
            for effect_id in effects {
                // already-clean entries (duplicates from one pass) are no-ops
                self.update_if_necessary(effect_id);
            }
        }
    }

    pub(crate) fn dispose_node(&self, node: NodeId) {
        let sources = self.node_sources.borrow_mut().remove(node);
        if let Some(sources) = sources {
            let subs = self.node_subscribers.borrow();
            for source in sources.borrow().iter() {
                if let Some(source) = subs.get(*source) {
                    source.borrow_mut().remove(&node);
                }
            }
        }
        let subscribers = self.node_subscribers.borrow_mut().remove(node);
        if let Some(subscribers) = subscribers {
            let sources = self.node_sources.borrow();
            for subscriber in subscribers.borrow().iter() {
                if let Some(subscriber) = sources.get(*subscriber) {
                    subscriber.borrow_mut().remove(&node);
                }
            }
        }
        self.nodes.borrow_mut().remove(node);
    }
}

impl Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("observer", &self.observer)
            .field("pending_effects", &self.pending_effects)
            .field("batching", &self.batching)
            .finish()
    }
}

impl NodeId {
    /// Registers the current observer, if any, as a subscriber of this node,
    /// recording both edge directions.
    pub(crate) fn subscribe(&self, runtime: RuntimeId) -> Result<(), ReactiveError> {
        with_runtime(runtime, |runtime| {
            if let Some(observer) = runtime.observer.get() {
                let mut subs = runtime.node_subscribers.borrow_mut();
                if let Some(subs) = subs.entry(*self) {
                    subs.or_default().borrow_mut().insert(observer);
                }
                let mut sources = runtime.node_sources.borrow_mut();
                if let Some(sources) = sources.entry(observer) {
                    sources.or_default().borrow_mut().insert(*self);
                }
            }
        })
    }

    pub(crate) fn try_with<T, U>(
        &self,
        runtime: RuntimeId,
        f: impl FnOnce(&T) -> U,
    ) -> Result<U, ReactiveError>
    where
        T: 'static,
    {
        // revalidate before subscribing: a lazy computation triggered by
        // this read must not find the not-yet-notified reader in its
        // subscriber set and mark it dirty mid-run
        with_runtime(runtime, |runtime| runtime.update_if_necessary(*self))?;
        self.subscribe(runtime)?;
        self.try_with_no_subscription(runtime, f)
    }

    pub(crate) fn try_with_no_subscription<T, U>(
        &self,
        runtime: RuntimeId,
        f: impl FnOnce(&T) -> U,
    ) -> Result<U, ReactiveError>
    where
        T: 'static,
    {
        let value = with_runtime(runtime, |runtime| {
            // lazy memos compute on first read; clean nodes are no-ops
            runtime.update_if_necessary(*self);
            let nodes = runtime.nodes.borrow();
            nodes
                .get(*self)
                .map(|node| Rc::clone(&node.value))
                .ok_or(ReactiveError::NodeDisposed)
        })??;
        let value = value.borrow();
        match value.downcast_ref::<T>() {
            Some(value) => Ok(f(value)),
            None => panic!(
                "tried to read reactive node {self:?} as a {}, but it holds a different type",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Updates the stored value without notifying anyone.
    pub(crate) fn try_update_value<T, U>(
        &self,
        runtime: RuntimeId,
        f: impl FnOnce(&mut T) -> U,
    ) -> Result<U, ReactiveError>
    where
        T: 'static,
    {
        let value = with_runtime(runtime, |runtime| {
            let nodes = runtime.nodes.borrow();
            nodes
                .get(*self)
                .map(|node| Rc::clone(&node.value))
                .ok_or(ReactiveError::NodeDisposed)
        })??;
        let mut value = value.borrow_mut();
        match value.downcast_mut::<T>() {
            Some(value) => Ok(f(value)),
            None => panic!(
                "tried to write reactive node {self:?} as a {}, but it holds a different type",
                std::any::type_name::<T>()
            ),
        }
    }

    /// Equality-gated write. Stores the value synchronously and schedules
    /// notification, unless the node's comparator says nothing changed.
    /// Returns the rejected value if the node or runtime is gone.
    pub(crate) fn try_set<T>(&self, runtime: RuntimeId, new_value: T) -> Option<T>
    where
        T: 'static,
    {
        let mut new_value = Some(new_value);
        _ = with_runtime(runtime, |runtime| {
            let located = {
                let nodes = runtime.nodes.borrow();
                nodes.get(*self).map(|node| {
                    let eq = match &node.node_type {
                        ReactiveNodeType::Signal { eq } => Some(Rc::clone(eq)),
                        // memo/effect cells are written only by their own
                        // computation, never through a setter
                        _ => None,
                    };
                    (Rc::clone(&node.value), eq)
                })
            };
            let Some((value, Some(eq))) = located else {
                return;
            };
            let changed = {
                let mut value = value.borrow_mut();
                let unchanged = new_value
                    .as_ref()
                    .map(|incoming| eq.eq(&*value, incoming as &dyn std::any::Any))
                    .unwrap_or(true);
                if unchanged {
                    new_value = None;
                    false
                } else {
                    match value.downcast_mut::<T>() {
                        Some(current) => {
                            if let Some(incoming) = new_value.take() {
                                *current = incoming;
                            }
                            true
                        }
                        None => panic!(
                            "tried to set reactive node {self:?} to a {}, but it holds a \
                             different type",
                            std::any::type_name::<T>()
                        ),
                    }
                }
            };
            if changed {
                runtime.mark_dirty(*self);
                runtime.run_effects();
            }
        });
        new_value
    }

    /// In-place update. Always notifies: with the old value consumed by the
    /// closure there is nothing left to compare against.
    pub(crate) fn try_update<T, U>(
        &self,
        runtime: RuntimeId,
        f: impl FnOnce(&mut T) -> U,
    ) -> Result<U, ReactiveError>
    where
        T: 'static,
    {
        let ret = self.try_update_value(runtime, f)?;
        with_runtime(runtime, |runtime| {
            runtime.mark_dirty(*self);
            runtime.run_effects();
        })?;
        Ok(ret)
    }

    pub(crate) fn dispose(&self, runtime: RuntimeId) {
        let result = with_runtime(runtime, |rt| rt.dispose_node(*self));
        if result.is_err() {
            debug_warn!("tried to dispose {self:?} after its runtime was disposed");
        }
    }
}
