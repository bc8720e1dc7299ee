//! Sequential transformation of settled values.

use std::fmt;

use pledge_callbacks::Callback;

use crate::deferred::Deferred;
use crate::promise::Promise;
use crate::thenable::{Outcome, Thenable, adopt};

type Filter<T> = Box<dyn Fn(&[T]) -> Outcome<T>>;

/// Optional filters applied per channel by [`Deferred::then_with`].
///
/// A channel without a filter forwards its arguments unchanged.
pub struct Filters<T> {
	done: Option<Filter<T>>,
	fail: Option<Filter<T>>,
	progress: Option<Filter<T>>,
}

impl<T> Default for Filters<T> {
	fn default() -> Self {
		Self {
			done: None,
			fail: None,
			progress: None,
		}
	}
}

impl<T> fmt::Debug for Filters<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Filters")
			.field("done", &self.done.is_some())
			.field("fail", &self.fail.is_some())
			.field("progress", &self.progress.is_some())
			.finish()
	}
}

impl<T> Filters<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Filter for the resolve channel.
	pub fn done<F>(mut self, filter: F) -> Self
	where
		F: Fn(&[T]) -> Outcome<T> + 'static,
	{
		self.done = Some(Box::new(filter));
		self
	}

	/// Filter for the reject channel.
	pub fn fail<F>(mut self, filter: F) -> Self
	where
		F: Fn(&[T]) -> Outcome<T> + 'static,
	{
		self.fail = Some(Box::new(filter));
		self
	}

	/// Filter for the progress channel.
	pub fn progress<F>(mut self, filter: F) -> Self
	where
		F: Fn(&[T]) -> Outcome<T> + 'static,
	{
		self.progress = Some(Box::new(filter));
		self
	}
}

#[derive(Debug, Clone, Copy)]
enum Channel {
	Done,
	Fail,
	Progress,
}

impl Channel {
	fn subscribe<T>(self, source: &dyn Thenable<T>, callback: Callback<T>) {
		match self {
			Self::Done => source.add_done(callback),
			Self::Fail => source.add_fail(callback),
			Self::Progress => source.add_progress(callback),
		}
	}

	fn forward<T: 'static, I: IntoIterator<Item = T>>(self, target: &Deferred<T>, args: I) {
		match self {
			Self::Done => target.resolve(args),
			Self::Fail => target.reject(args),
			Self::Progress => target.notify(args),
		};
	}
}

impl<T: Clone + 'static> Deferred<T> {
	/// Chains a filter over the resolved value.
	///
	/// Shorthand for [`Self::then_with`] with only a done filter.
	pub fn then<F>(&self, done: F) -> Promise<T>
	where
		F: Fn(&[T]) -> Outcome<T> + 'static,
	{
		self.then_with(Filters::new().done(done))
	}

	/// Returns the promise of a new deferred fed by this one.
	///
	/// For each channel, a filter's [`Outcome::Value`] is forwarded as the sole
	/// argument and an [`Outcome::Adopt`] is followed: its done, fail and
	/// progress settle the new deferred. Unfiltered channels forward their
	/// arguments as they are.
	pub fn then_with(&self, filters: Filters<T>) -> Promise<T> {
		let Filters { done, fail, progress } = filters;
		let next = Deferred::new();
		for (channel, filter) in [(Channel::Done, done), (Channel::Fail, fail), (Channel::Progress, progress)] {
			let target = next.clone();
			let forward = Callback::new(move |args: &[T]| match &filter {
				Some(filter) => match filter(args) {
					Outcome::Value(value) => channel.forward(&target, [value]),
					Outcome::Adopt(thenable) => adopt(&target, &*thenable),
				},
				None => channel.forward(&target, args.iter().cloned()),
			});
			channel.subscribe(self, forward);
		}
		next.promise()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use pretty_assertions::assert_eq;

	use super::*;

	fn recorder() -> (Rc<RefCell<Vec<Vec<i32>>>>, impl Fn(&[i32]) + 'static) {
		let seen = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&seen);
		(seen, move |args: &[i32]| sink.borrow_mut().push(args.to_vec()))
	}

	fn product(args: &[i32]) -> Outcome<i32> {
		Outcome::Value(args.iter().product())
	}

	#[test]
	fn done_filter_result_becomes_sole_argument() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred.then(product).done(record);
		deferred.resolve([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
	}

	#[test]
	fn unfiltered_channel_forwards_arguments_unchanged() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred.then_with(Filters::new().fail(product)).done(record);
		deferred.resolve([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![2, 3]]);
	}

	#[test]
	fn fail_filter_feeds_the_fail_channel() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred.then_with(Filters::new().fail(product)).fail(record);
		deferred.reject([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
	}

	#[test]
	fn progress_filter_feeds_the_progress_channel() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred.then_with(Filters::new().progress(product)).progress(record);
		deferred.notify([2, 3]).notify([4, 5]);
		assert_eq!(*seen.borrow(), vec![vec![6], vec![20]]);
	}

	#[test]
	fn done_filter_is_not_called_on_reject() {
		let deferred: Deferred<i32> = Deferred::new();
		let called = Rc::new(RefCell::new(false));
		let flag = Rc::clone(&called);
		deferred.reject([]).then(move |_| {
			flag.replace(true);
			Outcome::Value(0)
		});
		assert!(!*called.borrow());
	}

	#[test]
	fn adopted_rejection_rejects_the_chain() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred
			.then(|args| Outcome::from(Deferred::rejected([args[0] * args[1]])))
			.fail(record);
		deferred.resolve([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
	}

	#[test]
	fn adopted_resolution_from_fail_filter_resolves_the_chain() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred
			.then_with(Filters::new().fail(|args| Outcome::from(Deferred::resolved([args[0] * args[1]]))))
			.done(record);
		deferred.reject([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
	}

	#[test]
	fn adopted_value_from_progress_filter_resolves_the_chain() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		let chained = deferred.then_with(Filters::new().progress(|args| Outcome::from(Deferred::resolved([args[0] * args[1]]))));
		chained.done(record);
		deferred.notify([2, 3]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
		assert!(chained.is_resolved());
		assert!(deferred.is_pending());
	}

	#[test]
	fn adoption_follows_a_later_settlement() {
		let source = Deferred::new();
		let inner = Deferred::new();
		let (seen, record) = recorder();
		let handle = inner.clone();
		let chained = source.then(move |_| Outcome::from(handle.promise()));
		chained.fail(record);

		source.resolve([1]);
		assert!(chained.is_pending());
		inner.notify([5]);
		inner.reject([6]);
		assert_eq!(*seen.borrow(), vec![vec![6]]);
		assert!(chained.is_rejected());
	}

	#[test]
	fn adoption_flattens_exactly_one_level() {
		let source = Deferred::new();
		let (seen, record) = recorder();
		source
			.then(|args| Outcome::from(Deferred::resolved([args[0] + 1]).promise()))
			.then(|args| Outcome::Value(args[0] * 10))
			.done(record);
		source.resolve([1]);
		assert_eq!(*seen.borrow(), vec![vec![20]]);
	}

	#[test]
	fn chaining_from_a_promise_matches_the_deferred() {
		let deferred = Deferred::new();
		let (seen, record) = recorder();
		deferred.promise().then(product).done(record);
		deferred.resolve([4, 5]);
		assert_eq!(*seen.borrow(), vec![vec![20]]);
	}
}
