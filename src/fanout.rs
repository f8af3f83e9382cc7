//! Parallel fan-out and the join that restores order
//!
//! Both [all] and [map] start one thread per branch and wait for every
//! one of them. Results come back over a channel in completion order and
//! are put back in declaration order using each branch's order tag.
use std::thread;

use crossbeam_channel::bounded;

use crate::invoke::invoke_tagged;
use crate::{Callable, ChainError, Data, IntoCallable, Promise, Status, Value, Values};

/// Runs every step concurrently on the same values
///
/// The outputs are concatenated in the order the steps were given, no matter
/// which finishes first. If any step rejects the whole promise is rejected, but
/// the outputs of the steps that succeeded stay in their slots next to the error.
/// Every step always runs to completion.
/// ```
/// use pledge::*;
/// use std::{thread, time::Duration};
///
/// let p = promise(|| 3i64).all([
///     callable(|x: i64| {
///         thread::sleep(Duration::from_millis(50));
///         x + 3
///     }),
///     callable(|x: i64| x * x),
/// ]);
/// assert_eq!(p.values().extract::<i64>(), Some(vec![6, 9]));
/// ```
pub fn all(promise: Promise, steps: impl IntoIterator<Item = Callable>) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    let values = promise.into_values();
    let branches = steps
        .into_iter()
        .map(|step| (step, values.clone()))
        .collect();
    join(branches)
}

/// Runs `step` concurrently on every element of `collection`
///
/// Each element is passed as the only argument. The outputs are flattened
/// in element order, they are not collected back into a `Vec`.
/// ```
/// use pledge::*;
/// let fruits = vec!["apples", "bananas"];
/// let p = promise(|| ()).map(fruits, |s: &'static str| format!("{s} are not a fruit"));
/// assert_eq!(p.value::<String>(1), Some("bananas are not a fruit".to_string()));
/// ```
pub fn map<M>(promise: Promise, collection: impl Data, step: impl IntoCallable<M>) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    let collection = collection.into_value();
    let Some(items) = collection.items() else {
        let error = ChainError::NotSequence(collection.type_desc().to_string());
        return Promise::rejected(error, promise.order());
    };
    let step = step.into_callable();
    let branches = items
        .into_iter()
        .map(|item| (step.clone(), Values::from(vec![item])))
        .collect();
    join(branches)
}

/// [map] over the first value of the chain
pub fn then_map<M>(promise: Promise, step: impl IntoCallable<M>) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    let first = promise.values().first().cloned();
    match first {
        Some(collection) => map(promise, collection, step),
        None => {
            let error = ChainError::NotSequence("nothing".to_string());
            Promise::rejected(error, promise.order())
        }
    }
}

/// Runs each branch on its own thread and waits for all of them
fn join(branches: Vec<(Callable, Values)>) -> Promise {
    let total = branches.len();
    let span = tracing::debug_span!("join", branches = total);
    let _guard = span.enter();

    let (sender, receiver) = bounded::<Promise>(total);
    thread::scope(|scope| {
        for (order, (step, values)) in branches.into_iter().enumerate() {
            let branch = sender.clone();
            let spawned = thread::Builder::new()
                .name(format!("pledge-fanout-{order}"))
                .spawn_scoped(scope, move || {
                    let settled = invoke_tagged(&step, values, order);
                    // the buffer holds every branch, this never blocks
                    let _ = branch.send(settled);
                });
            if let Err(error) = spawned {
                tracing::warn!(order, %error, "could not spawn fan-out branch");
                let _ = sender.send(Promise::rejected(ChainError::Spawn(error.into()), order));
            }
        }
    });
    drop(sender);

    let mut status = Status::Fulfilled;
    let mut slots: Vec<Values> = (0..total).map(|_| Values::new()).collect();
    for settled in receiver.iter() {
        if settled.is_rejected() {
            status = Status::Rejected;
        }
        let order = settled.order();
        slots[order] = settled.into_values();
    }
    tracing::debug!(?status, "fan-out joined");

    let values = slots.into_iter().flatten().collect::<Vec<Value>>();
    Promise::joined(status, values.into())
}
