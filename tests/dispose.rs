use rd_reactive::{create_effect, create_runtime, signal_prelude::*};
use std::{cell::Cell, rc::Rc};

#[test]
fn disposed_signal_reports_disposal() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    a.dispose();

    // both halves share the node, so both observe the disposal
    assert_eq!(a.try_get(), None);
    assert_eq!(set_a.try_set(5), Some(5));
    assert_eq!(set_a.try_update(|n| *n += 1), None);

    runtime.dispose();
}

#[test]
fn disposed_memo_reports_disposal() {
    let runtime = create_runtime();

    let (a, _) = create_signal(1);
    let doubled = create_memo(move |_| a.get() * 2);
    assert_eq!(doubled.get(), 2);

    doubled.dispose();
    assert_eq!(doubled.try_get(), None);
    assert_eq!(doubled.try_with(|n| *n), None);

    runtime.dispose();
}

#[test]
fn disposing_a_signal_detaches_its_subscribers() {
    let runtime = create_runtime();

    let (a, _set_a) = create_signal(0);
    let (b, set_b) = create_signal(0);
    let runs = Rc::new(Cell::new(0));

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            (a.try_get(), b.get());
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    a.dispose();

    // the other dependency keeps working
    set_b.set(1);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn disposing_an_effect_removes_its_subscriptions() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let runs = Rc::new(Cell::new(0));

    let effect = create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            runs.set(runs.get() + 1);
        }
    });

    effect.dispose();

    set_a.set(1);
    set_a.set(2);
    assert_eq!(runs.get(), 1);

    runtime.dispose();
}

#[test]
fn runtime_dispose_invalidates_all_nodes() {
    let runtime = create_runtime();
    let (a, set_a) = create_signal(0);
    runtime.dispose();

    assert_eq!(a.try_get(), None);
    assert_eq!(set_a.try_set(1), Some(1));
}

#[test]
fn separate_runtimes_are_independent() {
    let first = create_runtime();
    let (a, _) = create_signal(0);

    let second = create_runtime();
    let (b, set_b) = create_signal(10);

    set_b.set(11);
    assert_eq!(b.get(), 11);

    second.dispose();

    // the first runtime's nodes are untouched
    assert_eq!(a.try_get(), Some(0));
    assert_eq!(b.try_get(), None);

    first.dispose();
}
