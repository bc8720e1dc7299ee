//! Ordered callback list with reentrancy-safe firing.
//!
//! A [`CallbackQueue`] is a shared handle; callbacks receive no borrow of the
//! queue while they run, so they may add, remove, fire, empty, lock or disable
//! the very queue that is invoking them:
//!
//! - `add` during a pass extends the pass, the new callback runs in it.
//! - `remove` during a pass moves the cursor so nothing is skipped or revisited.
//! - `fire` during a pass is queued and drained FIFO once the pass ends.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::callback::{Callback, Flow};
use crate::options::CallbackOptions;


/// Arguments remembered for replay to late callbacks.
#[derive(Debug)]
enum Memory<T> {
	Unset,
	Args(Rc<[T]>),
	/// Set by a halting callback; never replayed.
	Poisoned,
}

impl<T> Memory<T> {
	fn replayable(&self) -> Option<Rc<[T]>> {
		match self {
			Self::Args(args) => Some(Rc::clone(args)),
			Self::Unset | Self::Poisoned => None,
		}
	}

	fn is_replayable(&self) -> bool {
		matches!(self, Self::Args(_))
	}
}

/// Bounds of the pass being executed.
///
/// `next` is the index of the next entry to invoke, `length` the exclusive end.
/// Both are re-read after every invocation.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
	start: usize,
	next: usize,
	length: usize,
}

struct QueueState<T> {
	options: CallbackOptions,
	entries: Vec<Callback<T>>,
	memory: Memory<T>,
	/// Fire requests made while firing. `None` once single-shot or locked.
	pending: Option<VecDeque<Rc<[T]>>>,
	cursor: Cursor,
	fired: bool,
	firing: bool,
	locked: bool,
	disabled: bool,
}

impl<T> QueueState<T> {
	fn contains(&self, callback: &Callback<T>) -> bool {
		self.entries.iter().any(|cb| cb.same(callback))
	}

	/// Drops all state. Returns the entries so they are released outside the borrow.
	#[must_use]
	fn disable(&mut self) -> Vec<Callback<T>> {
		self.disabled = true;
		self.locked = true;
		self.pending = None;
		self.memory = Memory::Unset;
		self.cursor.length = 0;
		std::mem::take(&mut self.entries)
	}
}

/// Resets the firing flag when a callback unwinds out of a pass.
///
/// The panic keeps propagating; queued reentrant fires of the aborted pass are
/// discarded so the queue stays usable afterwards.
struct PassGuard<'a, T> {
	state: &'a RefCell<QueueState<T>>,
}

impl<T> Drop for PassGuard<'_, T> {
	fn drop(&mut self) {
		if !std::thread::panicking() {
			return;
		}
		if let Ok(mut state) = self.state.try_borrow_mut() {
			state.firing = false;
			if let Some(pending) = state.pending.as_mut() {
				pending.clear();
			}
			tracing::trace!("callbacks.queue.pass_aborted");
		}
	}
}

/// Ordered, mutation-safe, replay-capable callback list.
pub struct CallbackQueue<T> {
	state: Rc<RefCell<QueueState<T>>>,
}

impl<T> Clone for CallbackQueue<T> {
	fn clone(&self) -> Self {
		Self {
			state: Rc::clone(&self.state),
		}
	}
}

impl<T> Default for CallbackQueue<T> {
	fn default() -> Self {
		Self::new(CallbackOptions::default())
	}
}

impl<T> fmt::Debug for CallbackQueue<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Ok(state) = self.state.try_borrow() else {
			return f.debug_struct("CallbackQueue").finish_non_exhaustive();
		};
		f.debug_struct("CallbackQueue")
			.field("options", &state.options)
			.field("entries", &state.entries.len())
			.field("fired", &state.fired)
			.field("firing", &state.firing)
			.field("locked", &state.locked)
			.field("disabled", &state.disabled)
			.finish()
	}
}

impl<T> CallbackQueue<T> {
	/// Creates an empty queue with the given policy.
	pub fn new(options: CallbackOptions) -> Self {
		Self {
			state: Rc::new(RefCell::new(QueueState {
				options,
				entries: Vec::new(),
				memory: Memory::Unset,
				pending: (!options.single_shot).then(VecDeque::new),
				cursor: Cursor::default(),
				fired: false,
				firing: false,
				locked: false,
				disabled: false,
			})),
		}
	}

	/// Returns the policy the queue was built with.
	pub fn options(&self) -> CallbackOptions {
		self.state.borrow().options
	}

	/// Appends one callback. See [`Self::extend`].
	pub fn add(&self, callback: Callback<T>) -> &Self {
		self.extend([callback])
	}

	/// Appends callbacks in order.
	///
	/// During a pass the new callbacks join it. Otherwise, when arguments are
	/// memorized, only the new callbacks are invoked with them before this
	/// returns.
	pub fn extend<I>(&self, callbacks: I) -> &Self
	where
		I: IntoIterator<Item = Callback<T>>,
	{
		let callbacks: Vec<_> = callbacks.into_iter().collect();
		let replay = {
			let mut state = self.state.borrow_mut();
			if state.disabled {
				return self;
			}
			let start = state.entries.len();
			for callback in callbacks {
				if state.options.deduplicate && state.contains(&callback) {
					continue;
				}
				state.entries.push(callback);
			}
			if state.firing {
				state.cursor.length = state.entries.len();
				None
			} else {
				let replay = state.memory.replayable();
				if replay.is_some() {
					state.cursor.start = start;
				}
				replay
			}
		};
		if let Some(args) = replay {
			tracing::trace!(args = args.len(), "callbacks.queue.replay");
			self.run(args);
		}
		self
	}

	/// Removes every registration of `callback`.
	pub fn remove(&self, callback: &Callback<T>) -> &Self {
		let mut removed = Vec::new();
		{
			let mut state = self.state.borrow_mut();
			while let Some(index) = state.entries.iter().position(|cb| cb.same(callback)) {
				removed.push(state.entries.remove(index));
				if state.firing {
					if index < state.cursor.length {
						state.cursor.length -= 1;
					}
					if index < state.cursor.next {
						state.cursor.next -= 1;
					}
				}
			}
		}
		drop(removed);
		self
	}

	/// Removes every registration of each given callback.
	pub fn remove_all<'a, I>(&self, callbacks: I) -> &Self
	where
		I: IntoIterator<Item = &'a Callback<T>>,
		T: 'a,
	{
		for callback in callbacks {
			self.remove(callback);
		}
		self
	}

	/// Invokes the callbacks with `args`.
	///
	/// Ignored when disabled, or when already fired and no further pass can be
	/// queued (single-shot or locked). While a pass runs the request is queued.
	pub fn fire<I>(&self, args: I) -> &Self
	where
		I: IntoIterator<Item = T>,
	{
		self.fire_shared(args.into_iter().collect())
	}

	/// [`Self::fire`] with an already collected argument list.
	pub fn fire_shared(&self, args: Rc<[T]>) -> &Self {
		{
			let state = self.state.borrow();
			if state.disabled || (state.fired && state.pending.is_none()) {
				tracing::trace!(disabled = state.disabled, "callbacks.queue.fire_ignored");
				return self;
			}
		}
		self.run(args);
		self
	}

	/// Returns true when enabled and at least one callback is registered.
	pub fn has_callbacks(&self) -> bool {
		let state = self.state.borrow();
		!state.disabled && !state.entries.is_empty()
	}

	/// Returns true when enabled and `callback` is registered.
	pub fn contains(&self, callback: &Callback<T>) -> bool {
		let state = self.state.borrow();
		!state.disabled && state.contains(callback)
	}

	/// Returns the number of registered callbacks.
	pub fn len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Returns true when no entries are stored. A disabled queue stores none.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Removes all callbacks. Later fires still run.
	pub fn empty(&self) -> &Self {
		let cleared = {
			let mut state = self.state.borrow_mut();
			if state.disabled {
				return self;
			}
			state.cursor.length = 0;
			std::mem::take(&mut state.entries)
		};
		drop(cleared);
		self
	}

	/// Irrevocably turns the queue into a no-op.
	pub fn disable(&self) -> &Self {
		let released = self.state.borrow_mut().disable();
		tracing::trace!(dropped = released.len(), "callbacks.queue.disabled");
		drop(released);
		self
	}

	pub fn is_disabled(&self) -> bool {
		self.state.borrow().disabled
	}

	/// Refuses every future fire.
	///
	/// Without memorized arguments nothing could ever run again, so this
	/// disables the queue. Otherwise late callbacks keep receiving the replay.
	pub fn lock(&self) -> &Self {
		let released = {
			let mut state = self.state.borrow_mut();
			state.locked = true;
			state.pending = None;
			if state.memory.is_replayable() {
				Vec::new()
			} else {
				state.disable()
			}
		};
		tracing::trace!(disabled = self.is_disabled(), "callbacks.queue.locked");
		drop(released);
		self
	}

	/// Returns true when no further fire pass can run.
	pub fn is_locked(&self) -> bool {
		let state = self.state.borrow();
		state.locked || (state.options.single_shot && state.fired)
	}

	/// Returns true once a pass has started.
	pub fn is_fired(&self) -> bool {
		self.state.borrow().fired
	}

	/// Returns true while a pass is executing.
	pub fn is_firing(&self) -> bool {
		self.state.borrow().firing
	}

	/// Runs a pass with `args`, then drains queued fires in FIFO order.
	fn run(&self, mut args: Rc<[T]>) {
		{
			let mut state = self.state.borrow_mut();
			if state.firing {
				if let Some(pending) = state.pending.as_mut() {
					pending.push_back(args);
					tracing::trace!(queued = pending.len(), "callbacks.queue.fire_queued");
				}
				return;
			}
		}

		let _guard = PassGuard { state: &self.state };
		loop {
			{
				let mut state = self.state.borrow_mut();
				state.memory = if state.options.replay_last {
					Memory::Args(Rc::clone(&args))
				} else {
					Memory::Unset
				};
				state.fired = true;
				state.cursor.next = std::mem::take(&mut state.cursor.start);
				state.cursor.length = state.entries.len();
				state.firing = true;
				tracing::trace!(
					args = args.len(),
					from = state.cursor.next,
					to = state.cursor.length,
					"callbacks.queue.pass_started"
				);
			}

			self.invoke_pass(&args);

			match self.finish_pass() {
				Some(next) => args = next,
				None => break,
			}
		}
	}

	fn invoke_pass(&self, args: &[T]) {
		loop {
			let callback = {
				let mut state = self.state.borrow_mut();
				if state.disabled || state.cursor.next >= state.cursor.length {
					return;
				}
				let Some(callback) = state.entries.get(state.cursor.next).cloned() else {
					return;
				};
				state.cursor.next += 1;
				callback
			};

			if callback.call(args) == Flow::Halt {
				let mut state = self.state.borrow_mut();
				if state.options.halt_on_false {
					state.memory = Memory::Poisoned;
					tracing::trace!(at = state.cursor.next - 1, "callbacks.queue.pass_halted");
					return;
				}
			}
		}
	}

	/// Ends the current pass. Returns the next queued arguments, if any.
	fn finish_pass(&self) -> Option<Rc<[T]>> {
		let released = {
			let mut state = self.state.borrow_mut();
			state.firing = false;
			if state.disabled {
				return None;
			}
			if let Some(pending) = state.pending.as_mut() {
				return pending.pop_front();
			}
			if state.memory.is_replayable() {
				std::mem::take(&mut state.entries)
			} else {
				state.disable()
			}
		};
		drop(released);
		None
	}
}
