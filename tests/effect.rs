use rd_reactive::{create_effect, create_runtime, signal_prelude::*};
use std::{cell::RefCell, rc::Rc};

#[test]
fn effect_runs_on_creation_and_on_change() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(-1);

    // simulate an arbitrary side effect
    let b = Rc::new(RefCell::new(String::new()));

    create_effect({
        let b = Rc::clone(&b);
        move |_| {
            let formatted = format!("Value is {}", a.get());
            *b.borrow_mut() = formatted;
        }
    });

    assert_eq!(b.borrow().as_str(), "Value is -1");

    set_a.set(1);

    assert_eq!(b.borrow().as_str(), "Value is 1");

    runtime.dispose();
}

#[test]
fn effect_tracks_memo() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(-1);
    let b = Rc::new(RefCell::new(String::new()));

    let a2 = create_memo(move |_| format!("Value is {}", a.get()));

    create_effect({
        let b = Rc::clone(&b);
        move |_| {
            let formatted = a2.get();
            *b.borrow_mut() = formatted;
        }
    });

    assert_eq!(b.borrow().as_str(), "Value is -1");

    set_a.set(1);

    assert_eq!(b.borrow().as_str(), "Value is 1");

    runtime.dispose();
}

#[test]
fn effect_receives_previous_value() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let prevs = Rc::new(RefCell::new(Vec::new()));

    create_effect({
        let prevs = Rc::clone(&prevs);
        move |prev: Option<i32>| {
            prevs.borrow_mut().push(prev);
            a.get()
        }
    });

    set_a.set(1);
    set_a.set(2);

    assert_eq!(*prevs.borrow(), vec![None, Some(0), Some(1)]);

    runtime.dispose();
}

#[test]
fn dynamic_dependencies_are_pruned() {
    let runtime = create_runtime();

    let (first, set_first) = create_signal("Greg");
    let (last, set_last) = create_signal("Johnston");
    let (use_last, set_use_last) = create_signal(true);

    let combined_count = Rc::new(RefCell::new(0));

    create_effect({
        let combined_count = Rc::clone(&combined_count);
        move |_| {
            *combined_count.borrow_mut() += 1;
            if use_last.get() {
                format!("{} {}", first.get(), last.get())
            } else {
                first.get().to_string()
            }
        }
    });

    assert_eq!(*combined_count.borrow(), 1);

    set_first.set("Bob");
    assert_eq!(*combined_count.borrow(), 2);

    set_last.set("Thompson");
    assert_eq!(*combined_count.borrow(), 3);

    set_use_last.set(false);
    assert_eq!(*combined_count.borrow(), 4);

    // the branch reading `last` is inactive, so writes to it are ignored
    set_last.set("Jones");
    assert_eq!(*combined_count.borrow(), 4);
    set_last.set("Smith");
    assert_eq!(*combined_count.borrow(), 4);
    set_last.set("Stevens");
    assert_eq!(*combined_count.borrow(), 4);

    set_use_last.set(true);
    assert_eq!(*combined_count.borrow(), 5);

    runtime.dispose();
}

#[test]
fn write_inside_effect_defers_notification() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let (b, set_b) = create_signal(0);

    let a_runs = Rc::new(RefCell::new(0));
    let b_values = Rc::new(RefCell::new(Vec::new()));

    create_effect({
        let a_runs = Rc::clone(&a_runs);
        move |_| {
            *a_runs.borrow_mut() += 1;
            // writing during an observer turn must not re-enter any
            // observer synchronously
            set_b.set(a.get() * 2);
        }
    });

    create_effect({
        let b_values = Rc::clone(&b_values);
        move |_| {
            b_values.borrow_mut().push(b.get());
        }
    });

    assert_eq!(*a_runs.borrow(), 1);

    set_a.set(2);

    assert_eq!(*a_runs.borrow(), 2);
    assert_eq!(*b_values.borrow(), vec![0, 4]);

    runtime.dispose();
}

#[test]
fn effect_writing_its_own_source_does_not_recurse() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let runs = Rc::new(RefCell::new(0));

    create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            *runs.borrow_mut() += 1;
            let current = a.get();
            set_a.set(current + 1);
        }
    });

    // the write lands, but the writer itself is never re-queued for it
    assert_eq!(a.get_untracked(), 1);
    assert_eq!(*runs.borrow(), 1);

    // an outside write still reaches the effect, once
    set_a.set(10);
    assert_eq!(a.get_untracked(), 11);
    assert_eq!(*runs.borrow(), 2);

    runtime.dispose();
}

#[test]
fn panic_in_effect_restores_the_tracking_slot() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let (b, _set_b) = create_signal(0);
    let runs = Rc::new(RefCell::new(0));

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe({
        let runs = Rc::clone(&runs);
        move || {
            create_effect(move |_: Option<()>| {
                *runs.borrow_mut() += 1;
                b.track();
                panic!("effect body failed");
            });
        }
    }));
    assert!(result.is_err());
    assert_eq!(*runs.borrow(), 1);

    // the observer slot was restored on unwind, so this top-level read
    // subscribes nothing
    assert_eq!(a.get(), 0);

    // and a later write finds no phantom subscriber to re-run
    set_a.set(1);
    assert_eq!(*runs.borrow(), 1);

    runtime.dispose();
}

#[test]
fn dispose_stops_reruns() {
    let runtime = create_runtime();

    let (a, set_a) = create_signal(0);
    let runs = Rc::new(RefCell::new(0));

    let effect = create_effect({
        let runs = Rc::clone(&runs);
        move |_| {
            a.track();
            *runs.borrow_mut() += 1;
        }
    });

    set_a.set(1);
    assert_eq!(*runs.borrow(), 2);

    effect.dispose();

    set_a.set(2);
    set_a.set(3);
    assert_eq!(*runs.borrow(), 2);

    runtime.dispose();
}
