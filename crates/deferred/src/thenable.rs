//! The promise capability shared by chaining and fan-in.

use std::fmt;
use std::rc::Rc;

use pledge_callbacks::Callback;

use crate::deferred::Deferred;
use crate::promise::Promise;

/// Anything observers can subscribe to as a subordinate deferred.
///
/// [`Deferred`] and [`Promise`] implement it; foreign types can too, and are
/// then adopted by [`Deferred::then_with`] filters and [`when`](crate::when).
pub trait Thenable<T> {
	fn add_done(&self, callback: Callback<T>);

	fn add_fail(&self, callback: Callback<T>);

	fn add_progress(&self, callback: Callback<T>);

	/// Returns the promise facade of this value, if it has one.
	fn to_promise(&self) -> Option<Promise<T>> {
		None
	}
}

/// Result of a `then` filter, or one input of [`when`](crate::when).
pub enum Outcome<T> {
	/// A plain value, treated as already resolved.
	Value(T),
	/// A thenable whose outcome is followed instead.
	Adopt(Rc<dyn Thenable<T>>),
}

impl<T> Outcome<T> {
	pub fn value(value: T) -> Self {
		Self::Value(value)
	}

	pub fn adopt(thenable: impl Thenable<T> + 'static) -> Self {
		Self::Adopt(Rc::new(thenable))
	}
}

impl<T: 'static> From<Promise<T>> for Outcome<T> {
	fn from(promise: Promise<T>) -> Self {
		Self::adopt(promise)
	}
}

impl<T: 'static> From<Deferred<T>> for Outcome<T> {
	fn from(deferred: Deferred<T>) -> Self {
		Self::adopt(deferred)
	}
}

impl<T: fmt::Debug> fmt::Debug for Outcome<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
			Self::Adopt(_) => f.write_str("Adopt(..)"),
		}
	}
}

/// Makes `target` follow `source`: done resolves, fail rejects, progress notifies.
pub(crate) fn adopt<T: Clone + 'static>(target: &Deferred<T>, source: &dyn Thenable<T>) {
	tracing::trace!("deferred.adopt");
	let resolve = target.clone();
	source.add_done(Callback::new(move |args: &[T]| {
		resolve.resolve(args.iter().cloned());
	}));
	let reject = target.clone();
	source.add_fail(Callback::new(move |args: &[T]| {
		reject.reject(args.iter().cloned());
	}));
	let notify = target.clone();
	source.add_progress(Callback::new(move |args: &[T]| {
		notify.notify(args.iter().cloned());
	}));
}
