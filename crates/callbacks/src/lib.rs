//! Callback lists with firing policies.
//!
//! [`CallbackQueue`] is the building block of the `pledge-deferred` settle-once
//! state machine, but is usable on its own as an event list:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use pledge_callbacks::{Callback, CallbackOptions, CallbackQueue};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let queue = CallbackQueue::new(CallbackOptions::new().replay_last());
//! queue.fire([1, 2]);
//!
//! let sink = Rc::clone(&seen);
//! queue.add(Callback::new(move |args: &[u32]| sink.borrow_mut().extend_from_slice(args)));
//! assert_eq!(*seen.borrow(), [1, 2]);
//! ```
//!
//! Everything here is single-threaded: handles are `Rc`-shared and callbacks
//! run synchronously inside `fire`/`add`.

/// Callback handles and their return signal.
pub mod callback;
/// Error types for option parsing.
pub mod error;
/// Queue policy flags.
pub mod options;
/// The callback queue itself.
pub mod queue;

pub use callback::{Arity, Callback, Flow, IntoFlow};
pub use error::{OptionsError, Result};
pub use options::CallbackOptions;
pub use queue::CallbackQueue;
