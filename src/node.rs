use std::{any::Any, cell::RefCell, marker::PhantomData, rc::Rc};

slotmap::new_key_type! {
    /// Unique ID assigned to a node in the reactive graph.
    pub struct NodeId;
}

#[derive(Clone)]
pub(crate) struct ReactiveNode {
    pub value: Rc<RefCell<dyn Any>>,
    pub state: ReactiveNodeState,
    pub node_type: ReactiveNodeType,
}

#[derive(Clone)]
pub(crate) enum ReactiveNodeType {
    Signal { eq: Rc<dyn AnyEq> },
    Memo { f: Rc<dyn AnyComputation> },
    Effect { f: Rc<dyn AnyComputation> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum ReactiveNodeState {
    Clean,
    /// A source somewhere upstream may have changed; sources must be
    /// re-validated before this node can be considered clean.
    Check,
    Dirty,
}

/// A type-erased memo or effect body, re-run by the runtime whenever one of
/// the node's sources changes. Returns `true` if the node's value changed,
/// which propagates dirtiness to its subscribers.
pub(crate) trait AnyComputation {
    fn run(&self, value: Rc<RefCell<dyn Any>>) -> bool;
}

/// Type-erased equality predicate used to gate signal writes: if the new
/// value compares equal to the current one, no subscriber is notified.
pub(crate) trait AnyEq {
    fn eq(&self, a: &dyn Any, b: &dyn Any) -> bool;
}

/// Wraps a typed comparison function so it can live on an untyped node.
pub(crate) struct Comparator<T> {
    compare: Box<dyn Fn(&T, &T) -> bool>,
    ty: PhantomData<T>,
}

impl<T> Comparator<T>
where
    T: 'static,
{
    pub fn new(compare: impl Fn(&T, &T) -> bool + 'static) -> Self {
        Self {
            compare: Box::new(compare),
            ty: PhantomData,
        }
    }
}

impl<T> AnyEq for Comparator<T>
where
    T: 'static,
{
    fn eq(&self, a: &dyn Any, b: &dyn Any) -> bool {
        match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
            (Some(a), Some(b)) => (self.compare)(a, b),
            // a type mismatch is surfaced by the downcast at the write site
            _ => false,
        }
    }
}

/// Comparator for values that should always notify on write, used for the
/// non-reactive stored-value nodes.
pub(crate) struct NeverEqual;

impl AnyEq for NeverEqual {
    fn eq(&self, _: &dyn Any, _: &dyn Any) -> bool {
        false
    }
}
