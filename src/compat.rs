//! Method syntax and compatibility with do-notation
//!
//! Every combinator is a free function taking the promise first.
//! The methods here are sugar, so chains read top to bottom.
//!```
//! use pledge::*;
//! use ::do_notation::m;
//!
//! let p: Promise = m! {
//!     values <- promise(|| (3i64, 4i64));
//!     let sum = values.extract::<i64>().unwrap_or_default().iter().sum::<i64>();
//!     Promise::resolve(sum)
//! };
//! assert_eq!(p.value::<i64>(0), Some(7));
//!```
use crate::*;
use ::do_notation::Lift;

impl<T: IntoOutcome> Lift<T> for Promise {
    /// Creates a settled promise from a step's outputs
    ///
    /// see [resolve](Promise::resolve)
    fn lift(outputs: T) -> Self {
        Promise::resolve(outputs)
    }
}

impl Promise {
    /// see [then](function@then)
    pub fn then<M>(self, step: impl IntoCallable<M>) -> Promise {
        then(self, step)
    }

    /// see [catch](function@catch)
    pub fn catch<M>(self, step: impl IntoCallable<M>) -> Promise {
        catch(self, step)
    }

    /// see [all](function@all)
    pub fn all(self, steps: impl IntoIterator<Item = Callable>) -> Promise {
        all(self, steps)
    }

    /// see [map](function@map)
    pub fn map<M>(self, collection: impl Data, step: impl IntoCallable<M>) -> Promise {
        map(self, collection, step)
    }

    /// see [then_map](function@then_map)
    pub fn then_map<M>(self, step: impl IntoCallable<M>) -> Promise {
        then_map(self, step)
    }

    /// Folds without a seed
    ///
    /// see [reduce](function@reduce)
    pub fn reduce<M>(self, collection: impl Data, step: impl IntoCallable<M>) -> Promise {
        reduce(self, collection, step, None)
    }

    /// Folds starting from `initial`
    ///
    /// see [reduce](function@reduce)
    pub fn reduce_with<M>(
        self,
        collection: impl Data,
        step: impl IntoCallable<M>,
        initial: impl Data,
    ) -> Promise {
        reduce(self, collection, step, Some(initial.into_value()))
    }

    /// see [then_reduce](function@then_reduce)
    pub fn then_reduce<M>(self, step: impl IntoCallable<M>) -> Promise {
        then_reduce(self, step, None)
    }

    /// see [then_reduce](function@then_reduce)
    pub fn then_reduce_with<M>(self, step: impl IntoCallable<M>, initial: impl Data) -> Promise {
        then_reduce(self, step, Some(initial.into_value()))
    }

    /// see [then_value](function@then_value)
    pub fn then_value(self, step: Value) -> Promise {
        then_value(self, step)
    }

    /// Chains promises
    ///
    /// see [and_then](function@and_then)
    pub fn and_then<F>(self, f: F) -> Promise
    where
        F: FnOnce(Values) -> Promise,
    {
        and_then(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chains_read_top_to_bottom() {
        let p = promise(|| 3i64)
            .then(|x: i64| -> Result<i64, ChainError> { Ok(x * x) })
            .then(|x: i64| -> Result<i64, ChainError> { Ok(x * x) });
        assert_eq!(p.value::<i64>(0), Some(81));
    }

    #[test]
    fn rejection_flows_to_catch() {
        let p = promise(|| 3i64)
            .then(|x: i64| -> Result<i64, ChainError> {
                let _ = x * x;
                Err(ChainError::msg("should show up in catch"))
            })
            .then(|x: i64| x * x)
            .catch(|e: ChainError| e);
        assert!(p.is_rejected());
        assert_eq!(
            p.error().map(ToString::to_string),
            Some("should show up in catch".to_string())
        );
    }

    #[test]
    fn fruit_basket() {
        let fruits = vec!["apples", "bananas", "oranges", "cherries"];
        let p = promise(|| ())
            .map(fruits.clone(), |s: &'static str| format!("{s} are not a fruit"))
            .then(|_: String, b: String, _: String, d: String| b + " and " + &d);
        assert_eq!(
            p.value::<String>(0),
            Some("bananas are not a fruit and cherries are not a fruit".to_string())
        );

        let longest = |a: &'static str, b: &'static str, _: usize, _: usize| {
            if a.len() > b.len() {
                a
            } else {
                b
            }
        };
        let p = promise(move || fruits.clone()).then_reduce_with(longest, "kiwi");
        assert_eq!(p.value::<&str>(0), Some("cherries"));
    }

    #[test]
    fn reduce_methods_pick_their_seed() {
        let sum = |a: i32, b: i32, _: usize, _: usize| a + b;
        let unseeded = Promise::pending().reduce(vec![1i32, 2, 3], sum);
        let seeded = Promise::pending().reduce_with(vec![1i32, 2, 3], sum, 10i32);
        assert_eq!(unseeded.value::<i32>(0), Some(6));
        assert_eq!(seeded.value::<i32>(0), Some(16));
    }

    #[test]
    fn all_then_map_then_reduce() {
        let p = promise(|| 4usize)
            .all([callable(|n: usize| (0..n).collect::<Vec<usize>>())])
            .then_map(|x: usize| x * x)
            .then(|a: usize, b: usize, c: usize, d: usize| vec![a, b, c, d])
            .then_reduce(|acc: usize, x: usize, _: usize, _: usize| acc + x);
        assert_eq!(p.value::<usize>(0), Some(14));
    }

    #[test]
    fn lift_resolves() {
        let p = <Promise as Lift<(u8, u8)>>::lift((1, 2));
        assert_eq!(p.values().extract::<u8>(), Some(vec![1, 2]));
    }

    #[test]
    fn and_then_short_circuits() {
        let p = Promise::reject("gone").and_then(|_| Promise::resolve(1u8));
        assert!(p.is_rejected());
    }
}
