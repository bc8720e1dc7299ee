use std::fmt;
use std::rc::Rc;

/// Signal returned by a callback to its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
	/// Keep invoking the remaining callbacks of the pass.
	#[default]
	Continue,
	/// Stop the pass. Only honoured by queues with `halt_on_false`.
	Halt,
}

/// Conversion from a callback's return value into a [`Flow`].
///
/// `()` always continues; `false` halts, mirroring a callback that returns a
/// literal false.
pub trait IntoFlow {
	fn into_flow(self) -> Flow;
}

impl IntoFlow for () {
	fn into_flow(self) -> Flow {
		Flow::Continue
	}
}

impl IntoFlow for bool {
	fn into_flow(self) -> Flow {
		if self { Flow::Continue } else { Flow::Halt }
	}
}

impl IntoFlow for Flow {
	fn into_flow(self) -> Flow {
		self
	}
}

/// Number of leading arguments a callback wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Arity {
	/// Receives the full argument list.
	#[default]
	Variadic,
	/// Receives at most this many leading arguments.
	Fixed(usize),
}

impl Arity {
	/// Slices `args` down to what this arity accepts.
	pub fn apply<T>(self, args: &[T]) -> &[T] {
		match self {
			Self::Variadic => args,
			Self::Fixed(n) => &args[..n.min(args.len())],
		}
	}
}

type CallbackFn<T> = dyn Fn(&[T]) -> Flow;

/// Shared handle to a registered callback.
///
/// Identity is the handle: clones compare equal and can be used to remove the
/// callback again, two separately constructed callbacks never do.
pub struct Callback<T> {
	func: Rc<CallbackFn<T>>,
	arity: Arity,
}

impl<T> Callback<T> {
	/// Wraps a closure receiving the full argument list.
	pub fn new<F, R>(f: F) -> Self
	where
		T: 'static,
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		Self {
			func: Rc::new(move |args: &[T]| f(args).into_flow()),
			arity: Arity::Variadic,
		}
	}

	/// Wraps a closure that only sees the first `arity` arguments.
	pub fn with_arity<F, R>(arity: usize, f: F) -> Self
	where
		T: 'static,
		F: Fn(&[T]) -> R + 'static,
		R: IntoFlow,
	{
		Self {
			arity: Arity::Fixed(arity),
			..Self::new(f)
		}
	}

	/// Returns the declared arity.
	pub const fn arity(&self) -> Arity {
		self.arity
	}

	/// Invokes the callback with `args` cut to its arity.
	pub fn call(&self, args: &[T]) -> Flow {
		(self.func)(self.arity.apply(args))
	}

	/// Returns true when both handles refer to the same callback.
	pub fn same(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.func, &other.func)
	}
}

impl<T> Clone for Callback<T> {
	fn clone(&self) -> Self {
		Self {
			func: Rc::clone(&self.func),
			arity: self.arity,
		}
	}
}

impl<T> PartialEq for Callback<T> {
	fn eq(&self, other: &Self) -> bool {
		self.same(other)
	}
}

impl<T> Eq for Callback<T> {}

impl<T> fmt::Debug for Callback<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback")
			.field("ptr", &Rc::as_ptr(&self.func).cast::<()>())
			.field("arity", &self.arity)
			.finish()
	}
}
