use crate::{create_memo, Signal, SignalSetter};

/// Creates a read-only computed value: a cached derivation of other
/// reactive values, behind the [`Signal`] wrapper. Equivalent to a
/// [`Memo`](crate::Memo) without the previous-value argument.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (count, set_count) = create_signal(0);
/// let doubled = create_computed(move || count.get() * 2);
///
/// assert_eq!(doubled.get(), 0);
/// set_count.set(5);
/// assert_eq!(doubled.get(), 10);
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_computed<T>(get: impl Fn() -> T + 'static) -> Signal<T>
where
    T: PartialEq + 'static,
{
    create_memo(move |_| get()).into()
}

/// Creates a read/write computed value.
///
/// The read half behaves exactly as [`create_computed`]. The write half does
/// **not** touch the cached value: setting it invokes the caller's `set`
/// function, which must write one or more upstream signals that `get` reads.
/// The cache refreshes only when the getter re-runs in response to those
/// upstream writes. This indirection lets a computed value decompose a
/// composite write into updates of its constituent signals.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (first, set_first) = create_signal("Ada".to_string());
/// let (last, set_last) = create_signal("Lovelace".to_string());
///
/// let (full_name, set_full_name) = create_writable_computed(
///     move || format!("{} {}", first.get(), last.get()),
///     move |name: String| {
///         let mut parts = name.splitn(2, ' ');
///         set_first.set(parts.next().unwrap_or_default().to_string());
///         set_last.set(parts.next().unwrap_or_default().to_string());
///     },
/// );
///
/// assert_eq!(full_name.get(), "Ada Lovelace");
/// set_full_name.set("Grace Hopper".to_string());
/// assert_eq!(first.get(), "Grace");
/// assert_eq!(full_name.get(), "Grace Hopper");
/// # runtime.dispose();
/// ```
#[track_caller]
pub fn create_writable_computed<T>(
    get: impl Fn() -> T + 'static,
    set: impl Fn(T) + 'static,
) -> (Signal<T>, SignalSetter<T>)
where
    T: PartialEq + 'static,
{
    (create_computed(get), SignalSetter::map(set))
}
