use rd_reactive::{create_effect, create_runtime, signal_prelude::*, untrack};
use std::{cell::Cell, rc::Rc};

#[test]
fn untracked_set_does_not_notify() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let runs = Rc::new(Cell::new(0));

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    set_a.set_untracked(1);
    assert_eq!(runs.get(), 1);
    assert_eq!(a.get_untracked(), 1);

    runtime.dispose();
}

#[test]
fn untracked_get_does_not_subscribe() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let (b, set_b) = create_signal(0);
    let sums = Rc::new(Cell::new(0));

    create_effect({
        let sums = Rc::clone(&sums);
        move |_| {
            sums.set(a.get() + b.get_untracked());
        }
    });
    assert_eq!(sums.get(), 0);

    // the untracked read did not subscribe the effect to `b`
    set_b.set(10);
    assert_eq!(sums.get(), 0);

    // but it still sees b's current value once `a` wakes it
    set_a.set(1);
    assert_eq!(sums.get(), 11);

    runtime.dispose();
}

#[test]
fn untrack_suppresses_subscription_for_a_block() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let (b, set_b) = create_signal(0);
    let sums = Rc::new(Cell::new(0));

    create_effect({
        let sums = Rc::clone(&sums);
        move |_| {
            let sum = a.get() + untrack(move || b.get());
            sums.set(sum);
        }
    });
    assert_eq!(sums.get(), 0);

    set_b.set(5);
    assert_eq!(sums.get(), 0);

    set_a.set(1);
    assert_eq!(sums.get(), 6);

    runtime.dispose();
}

#[test]
fn untrack_restores_tracking_afterward() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let (b, _set_b) = create_signal(0);
    let runs = Rc::new(Cell::new(0));

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            untrack(move || b.get());
            // reads after the untracked block subscribe as usual
            a.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    set_a.set(1);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn untracked_update_does_not_notify() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(vec![1, 2]);
    let lens = Rc::new(Cell::new(0));

    create_effect({
        let lens = Rc::clone(&lens);
        move |_| {
            lens.set(a.with(Vec::len));
        }
    });
    assert_eq!(lens.get(), 2);

    set_a.update_untracked(|v| v.push(3));
    assert_eq!(lens.get(), 2);
    assert_eq!(a.with_untracked(Vec::len), 3);

    runtime.dispose();
}
