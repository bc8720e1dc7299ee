//! Settle-once deferred values.
//!
//! A [`Deferred`] starts pending and settles exactly once, resolved or
//! rejected. Observers registered before settlement run when it happens;
//! observers registered after run immediately with the same arguments.
//! Progress notifications may flow while pending.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use pledge_deferred::{Deferred, Outcome, when};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let (a, b) = (Deferred::new(), Deferred::new());
//!
//! let sink = Rc::clone(&seen);
//! when([Outcome::from(a.clone()), Outcome::from(b.promise())])
//! 	.then(|args: &[u32]| Outcome::Value(args.iter().sum()))
//! 	.done(move |args: &[u32]| sink.borrow_mut().extend_from_slice(args));
//!
//! b.resolve([2]);
//! a.resolve([40]);
//! assert_eq!(*seen.borrow(), [42]);
//! ```
//!
//! Everything is single-threaded and synchronous: no observer ever runs later
//! than the call that triggered it.

mod deferred;
mod promise;
mod state;
mod then;
mod thenable;
mod when;

pub use deferred::Deferred;
pub use pledge_callbacks::{Callback, Flow, IntoFlow};
pub use promise::Promise;
pub use state::State;
pub use then::Filters;
pub use thenable::{Outcome, Thenable};
pub use when::when;
