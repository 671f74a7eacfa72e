macro_rules! debug_warn {
    ($($x:tt)*) => {
        {
            #[cfg(debug_assertions)]
            {
                tracing::warn!($($x)*)
            }
            #[cfg(not(debug_assertions))]
            { }
        }
    }
}

pub(crate) use debug_warn;

/// Reads several signals at once without hand-nesting
/// [`with`](crate::SignalWith::with) calls.
///
/// Each name between the pipes is captured from the environment and rebound,
/// inside the body, to a reference to that signal's current value. Prefixing
/// the closure with `move` makes every expanded closure `move`.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let (first, _) = create_signal("Bob".to_string());
/// let (last, _) = create_signal("Smith".to_string());
/// let name = with!(|first, last| format!("{first} {last}"));
/// assert_eq!(name, "Bob Smith");
/// # runtime.dispose();
/// ```
///
/// which expands to
///
/// ```ignore
/// first.with(|first| last.with(|last| format!("{first} {last}")))
/// ```
#[macro_export]
macro_rules! with {
    (|$ident:ident $(,)?| $body:expr) => {
        $crate::SignalWith::with(&$ident, |$ident| $body)
    };
    (move |$ident:ident $(,)?| $body:expr) => {
        $crate::SignalWith::with(&$ident, move |$ident| $body)
    };
    (|$first:ident, $($rest:ident),+ $(,)?| $body:expr) => {
        $crate::SignalWith::with(&$first, |$first| $crate::with!(|$($rest),+| $body))
    };
    (move |$first:ident, $($rest:ident),+ $(,)?| $body:expr) => {
        $crate::SignalWith::with(&$first, move |$first| $crate::with!(move |$($rest),+| $body))
    };
}

/// Writes several signals at once without hand-nesting
/// [`update`](crate::SignalUpdate::update) calls. Each name is rebound to a
/// mutable reference inside the body; every signal notifies its subscribers
/// afterward.
///
/// ```
/// # use rd_reactive::*;
/// # let runtime = create_runtime();
/// let a = create_rw_signal(1);
/// let b = create_rw_signal(2);
/// update!(|a, b| *a += *b);
/// assert_eq!(a.get(), 3);
/// # runtime.dispose();
/// ```
#[macro_export]
macro_rules! update {
    (|$ident:ident $(,)?| $body:expr) => {
        $crate::SignalUpdate::update(&$ident, |$ident| $body)
    };
    (move |$ident:ident $(,)?| $body:expr) => {
        $crate::SignalUpdate::update(&$ident, move |$ident| $body)
    };
    (|$first:ident, $($rest:ident),+ $(,)?| $body:expr) => {
        $crate::SignalUpdate::update(&$first, |$first| $crate::update!(|$($rest),+| $body))
    };
    (move |$first:ident, $($rest:ident),+ $(,)?| $body:expr) => {
        $crate::SignalUpdate::update(&$first, move |$first| $crate::update!(move |$($rest),+| $body))
    };
}
