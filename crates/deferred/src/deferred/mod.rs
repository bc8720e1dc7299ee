//! The settle-once state machine.
//!
//! A [`Deferred`] owns three callback queues:
//!
//! | queue | options | fired by |
//! |---|---|---|
//! | resolved | once + memory | [`Deferred::resolve`] |
//! | rejected | once + memory | [`Deferred::reject`] |
//! | progress | memory | [`Deferred::notify`] |
//!
//! Settling is one transition performed before any observer runs: the state is
//! set, the losing queue is disabled and the progress queue locked. Observers
//! therefore always see the final state, and progress can never fire after
//! settlement. Observers registered after settlement get the memorized
//! arguments replayed immediately.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use pledge_callbacks::{Callback, CallbackOptions, CallbackQueue, IntoFlow};

use crate::promise::Promise;
use crate::state::State;
use crate::thenable::Thenable;


struct Core<T> {
	state: Cell<State>,
	resolved: CallbackQueue<T>,
	rejected: CallbackQueue<T>,
	progress: CallbackQueue<T>,
}

/// Producer handle of a settle-once value.
///
/// Clones share the same state. Hand out [`Deferred::promise`] to consumers
/// that must not settle it.
pub struct Deferred<T> {
	core: Rc<Core<T>>,
}

impl<T> Clone for Deferred<T> {
	fn clone(&self) -> Self {
		Self {
			core: Rc::clone(&self.core),
		}
	}
}

impl<T> PartialEq for Deferred<T> {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.core, &other.core)
	}
}

impl<T> Eq for Deferred<T> {}

impl<T> fmt::Debug for Deferred<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Deferred").field("state", &self.core.state.get()).finish_non_exhaustive()
	}
}

impl<T: 'static> Default for Deferred<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> Deferred<T> {
	/// Creates a pending deferred.
	pub fn new() -> Self {
		Self {
			core: Rc::new(Core {
				state: Cell::new(State::Pending),
				resolved: CallbackQueue::new(CallbackOptions::settle()),
				rejected: CallbackQueue::new(CallbackOptions::settle()),
				progress: CallbackQueue::new(CallbackOptions::progress()),
			}),
		}
	}

	/// Creates a deferred and runs `init` on it before returning.
	pub fn with(init: impl FnOnce(&Self)) -> Self {
		let deferred = Self::new();
		init(&deferred);
		deferred
	}

	/// Creates an already resolved deferred.
	pub fn resolved<I: IntoIterator<Item = T>>(args: I) -> Self {
		Self::with(|d| {
			d.resolve(args);
		})
	}

	/// Creates an already rejected deferred.
	pub fn rejected<I: IntoIterator<Item = T>>(args: I) -> Self {
		Self::with(|d| {
			d.reject(args);
		})
	}

	/// Returns the read-only facade.
	pub fn promise(&self) -> Promise<T> {
		Promise::new(self.clone())
	}

	pub fn state(&self) -> State {
		self.core.state.get()
	}

	pub fn is_pending(&self) -> bool {
		self.state() == State::Pending
	}

	pub fn is_resolved(&self) -> bool {
		self.state() == State::Resolved
	}

	pub fn is_rejected(&self) -> bool {
		self.state() == State::Rejected
	}

	/// Resolves and calls the done observers with `args`. No-op once settled.
	pub fn resolve<I: IntoIterator<Item = T>>(&self, args: I) -> &Self {
		self.settle(State::Resolved, args.into_iter().collect())
	}

	/// Rejects and calls the fail observers with `args`. No-op once settled.
	pub fn reject<I: IntoIterator<Item = T>>(&self, args: I) -> &Self {
		self.settle(State::Rejected, args.into_iter().collect())
	}

	/// Calls the progress observers with `args`. No-op once settled.
	pub fn notify<I: IntoIterator<Item = T>>(&self, args: I) -> &Self {
		self.core.progress.fire(args);
		self
	}

	/// Registers an observer of resolution.
	pub fn done<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.core.resolved.add(Callback::new(f));
		self
	}

	/// Registers an observer of rejection.
	pub fn fail<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.core.rejected.add(Callback::new(f));
		self
	}

	/// Registers an observer of progress notifications.
	pub fn progress<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		self.core.progress.add(Callback::new(f));
		self
	}

	/// Registers one observer for whichever of resolve or reject happens.
	pub fn always<F, R>(&self, f: F) -> &Self
	where
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		let callback = Callback::new(f);
		self.core.resolved.add(callback.clone());
		self.core.rejected.add(callback);
		self
	}

	/// The settle transition.
	///
	/// State, losing queue and progress queue are updated before the winning
	/// queue fires, so every observer of the pass sees the settled state.
	fn settle(&self, to: State, args: Rc<[T]>) -> &Self {
		let core = &*self.core;
		let (winner, loser) = match to {
			State::Resolved => (&core.resolved, &core.rejected),
			State::Rejected => (&core.rejected, &core.resolved),
			State::Pending => return self,
		};
		let current = core.state.get();
		if current.is_settled() {
			tracing::trace!(state = %current, attempted = %to, "deferred.settle_ignored");
			return self;
		}

		core.state.set(to);
		loser.disable();
		core.progress.lock();
		tracing::debug!(state = %to, args = args.len(), "deferred.settled");
		winner.fire_shared(args);
		self
	}
}

impl<T: 'static> Thenable<T> for Deferred<T> {
	fn add_done(&self, callback: Callback<T>) {
		self.core.resolved.add(callback);
	}

	fn add_fail(&self, callback: Callback<T>) {
		self.core.rejected.add(callback);
	}

	fn add_progress(&self, callback: Callback<T>) {
		self.core.progress.add(callback);
	}

	fn to_promise(&self) -> Option<Promise<T>> {
		Some(self.promise())
	}
}
