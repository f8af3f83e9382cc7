//! Sequential left fold over a collection
use crate::invoke::invoke_tagged;
use crate::{ChainError, Data, IntoCallable, Promise, Value, Values};

/// Folds `collection` from the left with `step`, on the caller's thread
///
/// `step` is called as `step(accumulator, element, index, length)` and its
/// first output becomes the next accumulator. Without `initial` the first
/// element seeds the fold and indices start at 1, with `initial` they start
/// at 0. The first rejection stops the fold and becomes the result.
/// ```
/// use pledge::*;
/// let fruits = vec!["apples", "bananas", "oranges"];
/// let joined = |a: String, b: String, _: usize, _: usize| a + " " + &b;
/// let fruits: Vec<String> = fruits.into_iter().map(String::from).collect();
///
/// let p = reduce(Promise::pending(), fruits.clone(), joined, None);
/// assert_eq!(p.value::<String>(0), Some("apples bananas oranges".to_string()));
///
/// let p = reduce(Promise::pending(), fruits, joined, Some("grapes".to_string().into_value()));
/// assert_eq!(p.value::<String>(0), Some("grapes apples bananas oranges".to_string()));
/// ```
pub fn reduce<M>(
    promise: Promise,
    collection: impl Data,
    step: impl IntoCallable<M>,
    initial: Option<Value>,
) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    let collection = collection.into_value();
    let (Some(items), Some(element)) = (collection.items(), collection.element_type()) else {
        let error = ChainError::NotSequence(collection.type_desc().to_string());
        return Promise::rejected(error, promise.order());
    };
    if let Some(initial) = &initial {
        let actual = initial.type_desc();
        if !element.accepts(&actual) {
            let error = ChainError::InitType {
                expected: element,
                actual,
            };
            return Promise::rejected(error, promise.order());
        }
    }

    let step = step.into_callable();
    let length = items.len();
    let mut items = items.into_iter();
    let (mut accumulator, start): (Value, usize) = match initial {
        Some(initial) => (initial, 0),
        None => match items.next() {
            Some(first) => (first, 1),
            None => return Promise::rejected(ChainError::EmptyReduce, promise.order()),
        },
    };

    for (index, item) in (start..).zip(items) {
        let args: Values = vec![accumulator, item, index.into_value(), length.into_value()].into();
        let settled = invoke_tagged(&step, args, promise.order());
        if settled.is_rejected() {
            tracing::debug!(index, "fold stopped by a rejection");
            return settled;
        }
        accumulator = match settled.into_values().into_iter().next() {
            Some(next) => next,
            None => return Promise::rejected(ChainError::MissingAccumulator, promise.order()),
        };
    }

    Promise::fulfilled(vec![accumulator].into(), promise.order())
}

/// [reduce] over the first value of the chain
pub fn then_reduce<M>(
    promise: Promise,
    step: impl IntoCallable<M>,
    initial: Option<Value>,
) -> Promise {
    if promise.is_rejected() {
        return promise;
    }
    let first = promise.values().first().cloned();
    match first {
        Some(collection) => reduce(promise, collection, step, initial),
        None => {
            let error = ChainError::NotSequence("nothing".to_string());
            Promise::rejected(error, promise.order())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promise;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn fruits() -> Vec<String> {
        ["apples", "bananas", "oranges", "cherries"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn concat(a: String, b: String, _: usize, _: usize) -> String {
        a + " " + &b
    }

    #[test]
    fn folds_without_a_seed_from_index_one() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let step = move |a: String, b: String, i: usize, n: usize| {
            if let Ok(mut seen) = record.lock() {
                seen.push((i, n));
            }
            a + " " + &b
        };
        let p = reduce(promise(|| ()), fruits(), step, None);
        assert_eq!(
            p.value::<String>(0),
            Some("apples bananas oranges cherries".to_string())
        );
        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![(1, 4), (2, 4), (3, 4)]);
    }

    #[test]
    fn folds_with_a_seed_from_index_zero() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = seen.clone();
        let step = move |a: String, b: String, i: usize, _: usize| {
            if let Ok(mut seen) = record.lock() {
                seen.push(i);
            }
            a + " " + &b
        };
        let seed = Some("grapes".to_string().into_value());
        let p = reduce(promise(|| ()), fruits(), step, seed);
        assert_eq!(
            p.value::<String>(0),
            Some("grapes apples bananas oranges cherries".to_string())
        );
        let seen = seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn then_reduce_matches_reduce() {
        let piped = then_reduce(promise(fruits), concat, None);
        let direct = reduce(promise(|| ()), fruits(), concat, None);
        assert_eq!(piped.value::<String>(0), direct.value::<String>(0));

        let seed = || Some("grapes".to_string().into_value());
        let piped = then_reduce(promise(fruits), concat, seed());
        assert_eq!(
            piped.value::<String>(0),
            Some("grapes apples bananas oranges cherries".to_string())
        );
    }

    #[test]
    fn seed_must_match_the_elements() {
        let p = reduce(promise(|| ()), fruits(), concat, Some(3i64.into_value()));
        assert_eq!(
            p.error().map(ToString::to_string),
            Some("Initializing argument should be String but got i64".to_string())
        );
    }

    #[test]
    fn only_sequences_fold() {
        let p = reduce(promise(|| ()), "apples".to_string(), concat, None);
        assert!(matches!(p.error(), Some(ChainError::NotSequence(_))));
    }

    #[test]
    fn rejection_aborts_the_fold() {
        let step = |a: u32, b: u32, i: usize, _: usize| -> Result<u32, ChainError> {
            if i == 2 {
                Err(ChainError::msg("stopped at two"))
            } else {
                Ok(a + b)
            }
        };
        let p = reduce(promise(|| ()), vec![1u32, 2, 3, 4], step, None);
        assert!(p.is_rejected());
        assert_eq!(p.values().len(), 1);
        assert_eq!(p.error().map(ToString::to_string), Some("stopped at two".into()));
    }

    #[test]
    fn short_collections() {
        let sum = |a: u32, b: u32, _: usize, _: usize| a + b;
        let single = reduce(promise(|| ()), vec![7u32], sum, None);
        assert_eq!(single.value::<u32>(0), Some(7));

        let seeded = reduce(promise(|| ()), Vec::<u32>::new(), sum, Some(5u32.into_value()));
        assert_eq!(seeded.value::<u32>(0), Some(5));

        let empty = reduce(promise(|| ()), Vec::<u32>::new(), sum, None);
        assert!(matches!(empty.error(), Some(ChainError::EmptyReduce)));
    }

    #[test]
    fn reducer_without_outputs_rejects() {
        let p = reduce(promise(|| ()), vec![1u8, 2], |_: u8, _: u8, _: usize, _: usize| (), None);
        assert!(matches!(p.error(), Some(ChainError::MissingAccumulator)));
    }

    #[test]
    fn rejected_chains_skip_the_fold() {
        let p = then_reduce(promise(|| ChainError::msg("early")), concat, None);
        assert_eq!(p.error().map(ToString::to_string), Some("early".into()));
    }
}
