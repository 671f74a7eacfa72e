use rd_reactive::{
    create_effect, create_runtime, create_signal_with_compare, signal_prelude::*, update, with,
};
use std::{cell::Cell, rc::Rc};

#[test]
fn basic_signal() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    assert_eq!(a.get(), 0);

    set_a.set(5);
    assert_eq!(a.get(), 5);

    set_a.update(|n| *n += 1);
    assert_eq!(a.get(), 6);

    runtime.dispose();
}

#[test]
fn signal_with_avoids_clone() {
    let runtime = create_runtime();

    let (name, set_name) = create_signal("Alice".to_string());
    assert_eq!(name.with(|name| name.len()), 5);

    set_name.set("Bo".to_string());
    assert_eq!(name.with(|name| name.len()), 2);

    runtime.dispose();
}

#[test]
fn write_is_synchronously_visible() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    set_a.set(42);
    // the stored value is visible immediately, not after a notification pass
    assert_eq!(a.get_untracked(), 42);

    runtime.dispose();
}

#[test]
fn equal_writes_are_no_ops() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let (a, set_a) = create_signal("a");

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    // writes [a, a, b] where the value already is "a": exactly one
    // notification pass fires
    set_a.set("a");
    set_a.set("a");
    assert_eq!(runs.get(), 1);
    set_a.set("b");
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn update_always_notifies() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let (a, set_a) = create_signal(1);

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    // an in-place update has no old value left to compare against
    set_a.update(|n| *n *= 1);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn custom_compare_gates_writes() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    // only the first letter matters
    let (word, set_word) = create_signal_with_compare("left", |a: &&str, b: &&str| {
        a.chars().next() == b.chars().next()
    });

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            word.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    set_word.set("lift");
    assert_eq!(runs.get(), 1);
    assert_eq!(word.get_untracked(), "left");

    set_word.set("right");
    assert_eq!(runs.get(), 2);
    assert_eq!(word.get_untracked(), "right");

    runtime.dispose();
}

#[test]
fn functional_update_is_equality_gated() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let (a, set_a) = create_signal(0);

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    // producing the value already held is a no-op, like set()
    set_a.set_with(|n| *n);
    assert_eq!(runs.get(), 1);

    set_a.set_with(|n| n + 1);
    assert_eq!(a.get_untracked(), 1);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn rw_signal_writes_are_equality_gated() {
    let runtime = create_runtime();

    let runs = Rc::new(Cell::new(0));
    let count = create_rw_signal(0);

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            count.track();
            runs.set(runs.get() + 1);
        }
    });
    assert_eq!(runs.get(), 1);

    count.set(0);
    count.set_with(|n| *n);
    assert_eq!(runs.get(), 1);

    count.set(1);
    assert_eq!(runs.get(), 2);

    runtime.dispose();
}

#[test]
fn rw_signal_halves_share_a_node() {
    let runtime = create_runtime();

    let count = create_rw_signal(0);
    let read = count.read_only();
    let write = count.write_only();

    write.set(3);
    assert_eq!(read.get(), 3);
    assert_eq!(count.get(), 3);

    runtime.dispose();
}

#[test]
fn with_macro_reads_many_signals() {
    let runtime = create_runtime();

    let (first, _) = create_signal("Bob".to_string());
    let (last, _) = create_signal("Smith".to_string());
    let name = with!(|first, last| format!("{first} {last}"));
    assert_eq!(name, "Bob Smith");

    runtime.dispose();
}

#[test]
fn update_macro_writes_many_signals() {
    let runtime = create_runtime();

    let a = create_rw_signal(1);
    let b = create_rw_signal(2);
    update!(|a, b| *a += *b);
    assert_eq!(a.get(), 3);

    runtime.dispose();
}
