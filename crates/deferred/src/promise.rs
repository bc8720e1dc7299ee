use std::fmt;

use pledge_callbacks::{Callback, IntoFlow};

use crate::deferred::Deferred;
use crate::state::State;
use crate::then::Filters;
use crate::thenable::{Outcome, Thenable};

/// Read-only view of a [`Deferred`].
///
/// Observers can be registered and chains built, but the value cannot be
/// resolved, rejected or notified through it.
pub struct Promise<T> {
	deferred: Deferred<T>,
}

impl<T> Clone for Promise<T> {
	fn clone(&self) -> Self {
		Self {
			deferred: self.deferred.clone(),
		}
	}
}

/// Two promises are equal when they observe the same deferred.
impl<T> PartialEq for Promise<T> {
	fn eq(&self, other: &Self) -> bool {
		self.deferred == other.deferred
	}
}

impl<T> Eq for Promise<T> {}

impl<T> fmt::Debug for Promise<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Promise").field(&self.deferred).finish()
	}
}

impl<T: 'static> Promise<T> {
	pub(crate) fn new(deferred: Deferred<T>) -> Self {
		Self { deferred }
	}

	/// Returns an equal handle.
	pub fn promise(&self) -> Self {
		self.clone()
	}

	pub fn state(&self) -> State {
		self.deferred.state()
	}

	pub fn is_pending(&self) -> bool {
		self.deferred.is_pending()
	}

	pub fn is_resolved(&self) -> bool {
		self.deferred.is_resolved()
	}

	pub fn is_rejected(&self) -> bool {
		self.deferred.is_rejected()
	}

	pub fn done<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.deferred.done(f);
		self
	}

	pub fn fail<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.deferred.fail(f);
		self
	}

	pub fn progress<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.deferred.progress(f);
		self
	}

	pub fn always<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.deferred.always(f);
		self
	}
}

impl<T: Clone + 'static> Promise<T> {
	/// See [`Deferred::then`].
	pub fn then<F>(&self, done: F) -> Promise<T>
	where
		F: Fn(&[T]) -> Outcome<T> + 'static,
	{
		self.deferred.then(done)
	}

	/// See [`Deferred::then_with`].
	pub fn then_with(&self, filters: Filters<T>) -> Promise<T> {
		self.deferred.then_with(filters)
	}
}

impl<T: 'static> Thenable<T> for Promise<T> {
	fn add_done(&self, callback: Callback<T>) {
		self.deferred.add_done(callback);
	}

	fn add_fail(&self, callback: Callback<T>) {
		self.deferred.add_fail(callback);
	}

	fn add_progress(&self, callback: Callback<T>) {
		self.deferred.add_progress(callback);
	}

	fn to_promise(&self) -> Option<Promise<T>> {
		Some(self.clone())
	}
}
