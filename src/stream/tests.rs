use super::*;
use futures::StreamExt;
use futures::executor::block_on;
use std::cell::RefCell;
use std::rc::Rc;

fn record<T: Clone + 'static>(stream: &Stream<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let subscription = stream.subscribe(move |value| sink.borrow_mut().push(value.clone()));
    (seen, subscription)
}

#[test]
fn channel_multicasts_to_every_listener() {
    let (tx, rx) = channel::<u32>();
    let (first, _a) = record(&rx);
    let (second, _b) = record(&rx);
    tx.emit(1);
    tx.emit(2);
    assert_eq!(*first.borrow(), vec![1, 2]);
    assert_eq!(*second.borrow(), vec![1, 2]);
}

#[test]
fn memory_stream_replays_latest_value_to_late_listeners() {
    let (tx, rx) = memory_channel(Some(1));
    tx.emit(5);
    let (seen, _subscription) = record(&rx);
    assert_eq!(*seen.borrow(), vec![5]);
    assert_eq!(rx.value(), Some(5));
}

#[test]
fn operators_start_lazily_and_tear_down_with_last_listener() {
    let (tx, rx) = channel::<u32>();
    let doubled = rx.map(|value| value * 2);
    assert_eq!(rx.listener_count(), 0);

    let (seen, subscription) = record(&doubled);
    assert_eq!(rx.listener_count(), 1);
    tx.emit(3);
    drop(subscription);
    assert_eq!(rx.listener_count(), 0);
    tx.emit(4);
    assert_eq!(*seen.borrow(), vec![6]);
}

#[test]
fn take_detaches_after_budget_is_spent() {
    let (tx, rx) = channel::<u32>();
    let (seen, _subscription) = record(&rx.take(1));
    tx.emit(1);
    assert_eq!(rx.listener_count(), 0);
    tx.emit(2);
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn take_on_replaying_source_is_satisfied_during_subscribe() {
    let source = of(9);
    let (seen, _subscription) = record(&source.take(1));
    assert_eq!(*seen.borrow(), vec![9]);
    assert_eq!(source.listener_count(), 0);
}

#[test]
fn combine_waits_for_both_sides_then_tracks_latest() {
    let (left_tx, left) = channel::<u32>();
    let (right_tx, right) = channel::<&'static str>();
    let (seen, _subscription) = record(&left.combine(&right));

    left_tx.emit(1);
    assert!(seen.borrow().is_empty());
    right_tx.emit("a");
    left_tx.emit(2);
    assert_eq!(*seen.borrow(), vec![(1, "a"), (2, "a")]);
}

#[test]
fn combine_all_of_nothing_emits_empty_vector() {
    let (seen, _subscription) = record(&combine_all(Vec::<Stream<u8>>::new()));
    assert_eq!(*seen.borrow(), vec![Vec::<u8>::new()]);
}

#[test]
fn merge_preserves_emission_order_across_inputs() {
    let (a_tx, a) = channel::<u32>();
    let (b_tx, b) = channel::<u32>();
    let (seen, _subscription) = record(&merge([a, b]));
    a_tx.emit(1);
    b_tx.emit(2);
    a_tx.emit(3);
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
}

#[test]
fn fold_emits_seed_then_accumulates() {
    let (tx, rx) = channel::<u32>();
    let total = rx.fold(0, |sum, value| sum + value);
    let (seen, _subscription) = record(&total);
    tx.emit(2);
    tx.emit(3);
    assert_eq!(*seen.borrow(), vec![0, 2, 5]);
    assert_eq!(total.value(), Some(5));
}

#[test]
fn producer_memory_forgets_value_after_teardown() {
    let (tx, rx) = channel::<u32>();
    let remembered = rx.remember();
    let subscription = remembered.subscribe(|_| {});
    tx.emit(1);
    assert_eq!(remembered.value(), Some(1));
    drop(subscription);
    assert_eq!(remembered.value(), None);
}

#[test]
fn flatten_switches_to_latest_inner_stream() {
    let (outer_tx, outer) = channel::<Stream<u32>>();
    let (first_tx, first) = channel::<u32>();
    let (second_tx, second) = channel::<u32>();
    let (seen, _subscription) = record(&outer.flatten());

    outer_tx.emit(first.clone());
    first_tx.emit(1);
    outer_tx.emit(second);
    first_tx.emit(2);
    second_tx.emit(3);
    assert_eq!(*seen.borrow(), vec![1, 3]);
    assert_eq!(first.listener_count(), 0);
}

#[test]
fn drop_repeats_skips_consecutive_duplicates() {
    let (tx, rx) = channel::<u32>();
    let (seen, _subscription) = record(&rx.drop_repeats());
    for value in [1, 1, 2, 2, 1] {
        tx.emit(value);
    }
    assert_eq!(*seen.borrow(), vec![1, 2, 1]);
}

#[test]
fn listeners_may_unsubscribe_reentrantly() {
    let (tx, rx) = channel::<u32>();
    let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let hits = Rc::new(RefCell::new(0));
    let inner_slot = slot.clone();
    let inner_hits = hits.clone();
    let subscription = rx.subscribe(move |_| {
        *inner_hits.borrow_mut() += 1;
        let own = inner_slot.borrow_mut().take();
        drop(own);
    });
    *slot.borrow_mut() = Some(subscription);
    tx.emit(1);
    tx.emit(2);
    assert_eq!(*hits.borrow(), 1);
}

#[test]
fn async_bridge_yields_emitted_values() {
    let (tx, rx) = channel::<u32>();
    let values = rx.into_async();
    tx.emit(7);
    tx.emit(8);
    let collected = block_on(values.take(2).collect::<Vec<_>>());
    assert_eq!(collected, vec![7, 8]);
}

#[test]
fn settled_forwards_one_consistent_value_per_propagation() {
    let (tx, source) = memory_channel(Some(1_i32));
    let doubled = source.map(|value| value * 2);
    let negated = source.map(|value| -value);
    let pair = doubled.combine(&negated);

    let (settled, _settled) = record(&pair.settled());
    let (raw, _raw) = record(&pair);
    assert_eq!(*settled.borrow(), vec![(2, -1)]);

    tx.emit(5);
    assert_eq!(raw.borrow().last(), Some(&(10, -5)));
    assert!(raw.borrow().contains(&(10, -1)));
    assert_eq!(*settled.borrow(), vec![(2, -1), (10, -5)]);
}
