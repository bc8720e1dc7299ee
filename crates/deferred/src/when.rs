//! Fan-in over several inputs.

use std::cell::RefCell;
use std::rc::Rc;

use pledge_callbacks::Callback;

use crate::deferred::Deferred;
use crate::promise::Promise;
use crate::thenable::{Outcome, adopt};

struct FanIn<T> {
	results: Vec<T>,
	progress: Vec<T>,
	remaining: usize,
}

/// Joins `items` into one promise.
///
/// The joined promise resolves once every input resolved, with one argument
/// per input in input order: a plain value stands for itself and a thenable
/// contributes the first argument it resolved with. It rejects with the
/// arguments of the first input that rejects. Each progress notification from
/// an input is relayed as a snapshot of the last progress seen per input.
/// Slots not reported yet hold `T::default()`.
///
/// No inputs resolve immediately with no arguments. A single thenable is
/// returned as its own promise when it has one.
pub fn when<T, I>(items: I) -> Promise<T>
where
	T: Clone + Default + 'static,
	I: IntoIterator<Item = Outcome<T>>,
{
	let items: Vec<Outcome<T>> = items.into_iter().collect();
	if items.is_empty() {
		return Deferred::resolved([]).promise();
	}
	if let [Outcome::Adopt(thenable)] = items.as_slice() {
		if let Some(promise) = thenable.to_promise() {
			return promise;
		}
		let follower = Deferred::new();
		adopt(&follower, &**thenable);
		return follower.promise();
	}

	let len = items.len();
	let joined = Deferred::new();
	let fan_in = Rc::new(RefCell::new(FanIn {
		results: vec![T::default(); len],
		progress: vec![T::default(); len],
		remaining: len,
	}));

	for (index, item) in items.into_iter().enumerate() {
		let thenable = match item {
			Outcome::Value(value) => {
				let mut fan_in = fan_in.borrow_mut();
				fan_in.results[index] = value;
				fan_in.remaining -= 1;
				continue;
			}
			Outcome::Adopt(thenable) => thenable,
		};

		let (slots, target) = (Rc::clone(&fan_in), joined.clone());
		thenable.add_done(Callback::new(move |args: &[T]| {
			let complete = {
				let mut fan_in = slots.borrow_mut();
				fan_in.results[index] = args.first().cloned().unwrap_or_default();
				fan_in.remaining = fan_in.remaining.saturating_sub(1);
				(fan_in.remaining == 0).then(|| fan_in.results.clone())
			};
			if let Some(results) = complete {
				tracing::debug!(inputs = results.len(), "deferred.when.resolved");
				target.resolve(results);
			}
		}));

		let target = joined.clone();
		thenable.add_fail(Callback::new(move |args: &[T]| {
			tracing::debug!(input = index, "deferred.when.rejected");
			target.reject(args.iter().cloned());
		}));

		let (slots, target) = (Rc::clone(&fan_in), joined.clone());
		thenable.add_progress(Callback::new(move |args: &[T]| {
			let snapshot = {
				let mut fan_in = slots.borrow_mut();
				fan_in.progress[index] = args.first().cloned().unwrap_or_default();
				fan_in.progress.clone()
			};
			target.notify(snapshot);
		}));
	}

	let ready = {
		let fan_in = fan_in.borrow();
		(fan_in.remaining == 0).then(|| fan_in.results.clone())
	};
	if let Some(results) = ready {
		tracing::debug!(inputs = len, "deferred.when.resolved_immediately");
		joined.resolve(results);
	}
	joined.promise()
}
