use std::cell::RefCell;
use std::rc::Rc;

use debouncer::debounce;
use debouncer::DebounceOptions;
use debouncer::Debouncer;
use debouncer::Error;
use debouncer::ManualTimer;
use debouncer::Receiver;

use crate::common::call_later;
use crate::common::Spy;
use crate::enable_logger;

fn trailing(
    timer: &Rc<ManualTimer>,
    spy: &Spy,
) -> Debouncer<Vec<u32>, usize> {
    debounce(timer.clone(), spy.callable(), Some(100), None).unwrap()
}

#[test]
fn debounces_with_fast_timeout() {
    enable_logger();
    let timer = Rc::new(ManualTimer::new());
    let spy = Spy::new();
    let debounced = trailing(&timer, &spy);

    for at in [100, 150, 200, 250] {
        call_later(&timer, &debounced, at);
    }
    timer.tick(350);

    assert_eq!(spy.call_count(), 1);
}

#[test]
fn flushed_cycle_does_not_fire_again_but_next_cycle_does() {
    enable_logger();
    let timer = Rc::new(ManualTimer::new());
    let spy = Spy::new();
    let debounced = trailing(&timer, &spy);

    call_later(&timer, &debounced, 100);
    call_later(&timer, &debounced, 150);
    timer.tick(175);
    assert_eq!(spy.call_count(), 0);

    debounced.flush();
    assert_eq!(spy.call_count(), 1);

    timer.tick(225);
    assert_eq!(spy.call_count(), 1);

    call_later(&timer, &debounced, 250);
    timer.tick(400);
    assert_eq!(spy.call_count(), 2);
}

#[test]
fn call_trigger_call_yields_two_executions() {
    enable_logger();
    let timer = Rc::new(ManualTimer::new());
    let spy = Spy::new();
    let debounced = trailing(&timer, &spy);

    debounced.call(vec![1]);
    assert_eq!(debounced.trigger(), 1);
    debounced.call(vec![2]);
    timer.tick(100);

    assert_eq!(spy.args(), vec![vec![1], vec![2]]);
}

#[test]
fn recursive_chain_runs_with_each_reinvocations_args() {
    enable_logger();
    let timer = Rc::new(ManualTimer::new());
    let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let slot: Rc<RefCell<Option<Debouncer<u32, u32>>>> = Rc::new(RefCell::new(None));

    let (sink, me) = (Rc::clone(&seen), Rc::clone(&slot));
    let debounced = debounce(
        timer.clone(),
        move |_, n: u32| {
            sink.borrow_mut().push(n);
            let next = n - 1;
            if next > 0 {
                if let Some(d) = me.borrow().as_ref() {
                    d.call(next);
                }
            }
            next
        },
        Some(100),
        None,
    )
    .unwrap();
    *slot.borrow_mut() = Some(debounced.clone());

    debounced.call(3);
    timer.tick(125);
    timer.tick(250);
    timer.tick(375);

    assert_eq!(*seen.borrow(), vec![3, 2, 1]);
    assert_eq!(debounced.last_result(), Some(0));
    slot.borrow_mut().take();
}

#[test]
fn immediate_mode_double_click_runs_once() {
    enable_logger();
    let timer = Rc::new(ManualTimer::new());
    let spy = Spy::new();
    let debounced = debounce(
        timer.clone(),
        spy.callable(),
        Some(300),
        Some(DebounceOptions::immediate().into()),
    )
    .unwrap();

    assert_eq!(debounced.call(vec![1]), Some(1));
    timer.tick(40);
    assert_eq!(debounced.call(vec![2]), None);
    timer.tick(300);
    assert_eq!(debounced.call(vec![3]), Some(2));

    assert_eq!(spy.args(), vec![vec![1], vec![3]]);
}

#[test]
fn shared_method_rejects_second_instance_of_same_type() {
    enable_logger();
    struct MyClass;
    struct OtherClass;

    let timer = Rc::new(ManualTimer::new());
    let spy = Spy::new();
    let debounced = trailing(&timer, &spy);

    let instance1 = Receiver::new(Rc::new(MyClass));
    let instance2 = Receiver::new(Rc::new(MyClass));
    let other = Receiver::new(Rc::new(OtherClass));

    debounced.call_with(&instance1, vec![]).unwrap();
    debounced.call_with(&other, vec![]).unwrap();

    let err = debounced.call_with(&instance2, vec![]).unwrap_err();
    assert!(matches!(err, Error::ContextMismatch { .. }));
    assert!(err.to_string().starts_with("Debounced method called with different contexts"));
}
