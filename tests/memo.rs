use rd_reactive::{create_effect, create_memo_with_compare, create_runtime, signal_prelude::*};
use std::{cell::Cell, rc::Rc};

#[test]
fn basic_memo() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let b = create_memo(move |_| a.get() * 2);

    assert_eq!(b.get(), 0);
    set_a.set(5);
    assert_eq!(b.get(), 10);

    runtime.dispose();
}

#[test]
fn memo_is_lazy() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let (a, set_a) = create_signal(0);

    let b = create_memo({
        let runs = Rc::clone(&runs);
        move |_| {
            runs.set(runs.get() + 1);
            a.get() * 2
        }
    });

    // nothing runs until the first read
    assert_eq!(runs.get(), 0);
    set_a.set(1);
    assert_eq!(runs.get(), 0);

    assert_eq!(b.get(), 2);
    assert_eq!(runs.get(), 1);

    runtime.dispose();
}

#[test]
fn memo_caches_between_changes() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let (a, set_a) = create_signal(0);

    let b = create_memo({
        let runs = Rc::clone(&runs);
        move |_| {
            runs.set(runs.get() + 1);
            a.get() * 2
        }
    });

    assert_eq!(b.get(), 0);
    assert_eq!(b.get(), 0);
    assert_eq!(b.get(), 0);
    assert_eq!(runs.get(), 1);

    set_a.set(3);
    assert_eq!(b.get(), 6);
    assert_eq!(b.get(), 6);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn memo_chains_update() {
    let runtime = create_runtime();

    let (first_name, set_first_name) = create_signal("Greg".to_string());
    let (last_name, set_last_name) = create_signal("Johnston".to_string());
    let full_name = create_memo(move |_| {
        format!("{} {}", first_name.get(), last_name.get())
    });
    let shouting = create_memo(move |_| full_name.get().to_uppercase());

    assert_eq!(shouting.get(), "GREG JOHNSTON");

    set_first_name.set("Bob".to_string());
    assert_eq!(shouting.get(), "BOB JOHNSTON");

    set_last_name.set("Thompson".to_string());
    assert_eq!(shouting.get(), "BOB THOMPSON");

    runtime.dispose();
}

#[test]
fn memo_receives_previous_value() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(1);
    let total = create_memo(move |prev: Option<&i32>| {
        prev.copied().unwrap_or(0) + a.get()
    });

    assert_eq!(total.get(), 1);
    set_a.set(2);
    assert_eq!(total.get(), 3);
    set_a.set(3);
    assert_eq!(total.get(), 6);

    runtime.dispose();
}

#[test]
fn diamond_runs_each_node_once() {
    let runtime = create_runtime();

    let (x, _set_x) = create_signal(1);
    let (y, set_y) = create_signal(1);

    let left_runs = Rc::new(Cell::new(0));
    let right_runs = Rc::new(Cell::new(0));
    let effect_runs = Rc::new(Cell::new(0));

    let left = create_memo({
        let left_runs = Rc::clone(&left_runs);
        move |_| {
            left_runs.set(left_runs.get() + 1);
            x.get() + y.get()
        }
    });
    let right = create_memo({
        let right_runs = Rc::clone(&right_runs);
        move |_| {
            right_runs.set(right_runs.get() + 1);
            left.get() * y.get()
        }
    });

    create_effect({
        let effect_runs = Rc::clone(&effect_runs);
        move |_| {
            right.track();
            effect_runs.set(effect_runs.get() + 1);
        }
    });

    assert_eq!(left_runs.get(), 1);
    assert_eq!(right_runs.get(), 1);
    assert_eq!(effect_runs.get(), 1);

    // both paths of the diamond converge; each node still recomputes once
    set_y.set(2);
    assert_eq!(left_runs.get(), 2);
    assert_eq!(right_runs.get(), 2);
    assert_eq!(effect_runs.get(), 2);

    runtime.dispose();
}

#[test]
fn unchanged_memo_stops_propagation() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(1);
    let parity_runs = Rc::new(Cell::new(0));
    let effect_runs = Rc::new(Cell::new(0));

    let is_even = create_memo({
        let parity_runs = Rc::clone(&parity_runs);
        move |_| {
            parity_runs.set(parity_runs.get() + 1);
            a.get() % 2 == 0
        }
    });

    create_effect({
        let effect_runs = Rc::clone(&effect_runs);
        move |_| {
            is_even.track();
            effect_runs.set(effect_runs.get() + 1);
        }
    });

    assert_eq!(parity_runs.get(), 1);
    assert_eq!(effect_runs.get(), 1);

    // 1 -> 3: the memo recomputes but its value is unchanged, so the
    // effect never hears about it
    set_a.set(3);
    assert_eq!(parity_runs.get(), 2);
    assert_eq!(effect_runs.get(), 1);

    set_a.set(4);
    assert_eq!(parity_runs.get(), 3);
    assert_eq!(effect_runs.get(), 2);

    runtime.dispose();
}

#[test]
fn memo_with_custom_compare() {
    let runtime = create_runtime();

    let (price, set_price) = create_signal(1.05_f64);
    let effect_runs = Rc::new(Cell::new(0));

    // treat prices within a cent as equal
    let rounded = create_memo_with_compare(
        move |_| price.get(),
        |a, b| (a - b).abs() < 0.01,
    );

    create_effect({
        let effect_runs = Rc::clone(&effect_runs);
        move |_| {
            rounded.track();
            effect_runs.set(effect_runs.get() + 1);
        }
    });
    assert_eq!(effect_runs.get(), 1);

    set_price.set(1.051);
    assert_eq!(effect_runs.get(), 1);
    assert_eq!(rounded.get_untracked(), 1.05);

    set_price.set(2.0);
    assert_eq!(effect_runs.get(), 2);
    assert_eq!(rounded.get_untracked(), 2.0);

    runtime.dispose();
}
