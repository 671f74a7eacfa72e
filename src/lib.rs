#![forbid(unsafe_code)]

//! A fine-grained reactive system, the state engine beneath the rd-dom
//! renderer.
//!
//! ## Fine-Grained Reactivity
//!
//! Individual reactive values ("signals", sometimes known as observables)
//! trigger the code that reacts to them ("effects", sometimes known as
//! observers) to re-run. These two halves of the reactive system are
//! inter-dependent. Without effects, signals can change within the reactive
//! system but never be observed in a way that interacts with the outside
//! world. Without signals, effects run once but never again, as there's no
//! observable value to subscribe to.
//!
//! The system is a graph: reading a signal inside an effect or memo
//! subscribes that computation to the signal, and the dependency set is
//! rediscovered from scratch on every run, so conditional reads prune
//! themselves. Writes are equality-gated and notification is batched per
//! synchronous turn, so diamond-shaped graphs recompute each dependent once
//! per change and no observer ever sees a half-propagated ("glitched")
//! state.
//!
//! Here are the most commonly-used functions and types:
//!
//! ### Signals
//! 1. *Signals:* [`create_signal`], which returns a ([`ReadSignal`],
//!    [`WriteSignal`]) tuple, or [`create_rw_signal`], which returns a
//!    [`RwSignal`] without this read-write segregation.
//! 2. *Derived signals:* any closure that relies on another signal, or the
//!    [`Signal::derive`] wrapper around one.
//! 3. *Memos:* [`create_memo`], which returns a cached, lazily recomputed
//!    [`Memo`].
//! 4. *Computed values:* [`create_computed`] and
//!    [`create_writable_computed`], derived values whose write half runs
//!    through caller-supplied logic.
//!
//! ### Effects
//! Use [`create_effect`] when you need to synchronize the reactive system
//! with something outside it (logging to the console, writing to storage, a
//! rendering layer binding DOM attributes).
//!
//! ### Example
//! ```
//! use rd_reactive::*;
//!
//! // creates a new reactive runtime
//! // this is omitted from most of the examples in the docs
//! let runtime = create_runtime();
//!
//! // a signal: returns a (getter, setter) pair
//! let (count, set_count) = create_signal(0);
//!
//! // the getter reads the value; the setter replaces it
//! assert_eq!(count.get(), 0);
//! set_count.set(1);
//! // or we can mutate it in place with update()
//! set_count.update(|n| *n += 1);
//!
//! // a derived signal: a plain closure that relies on the signal
//! let double_count = move || count.get() * 2;
//! assert_eq!(double_count(), 4);
//!
//! // a memo: subscribes to the signal, recomputes only when count changes
//! let memoized_triple_count = create_memo(move |_| count.get() * 3);
//! assert_eq!(memoized_triple_count.get(), 6);
//!
//! // this effect will run whenever count changes
//! create_effect(move |_| {
//!     println!("Count = {}", count.get());
//! });
//!
//! runtime.dispose();
//! ```

mod computed;
mod effect;
mod macros;
mod memo;
mod node;
mod runtime;
mod signal;
mod stored_value;
mod wrappers;

pub use computed::*;
pub use effect::{create_effect, Effect};
pub use memo::{create_memo, create_memo_with_compare, Memo};
pub use runtime::{batch, create_runtime, untrack, RuntimeId};
pub use signal::*;
pub use stored_value::*;
pub use wrappers::*;

/// Everything a consumer needs to work with signal values: the access traits
/// and the signal constructors.
pub mod signal_prelude {
    pub use crate::{
        create_memo, create_rw_signal, create_signal, create_signal_with_compare, Memo,
        ReadSignal, RwSignal, SignalDispose, SignalGet, SignalGetUntracked, SignalSet,
        SignalSetUntracked, SignalUpdate, SignalUpdateUntracked, SignalWith,
        SignalWithUntracked, WriteSignal,
    };
}
