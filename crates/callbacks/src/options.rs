//! Firing policy for a [`CallbackQueue`](crate::CallbackQueue).
//!
//! Options can be built in code, parsed from a flag string, or deserialized
//! from a config document:
//!
//! ```
//! use pledge_callbacks::CallbackOptions;
//!
//! let parsed: CallbackOptions = "once memory".parse().unwrap();
//! assert_eq!(parsed, CallbackOptions::new().single_shot().replay_last());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{OptionsError, Result};

/// Immutable policy flags of a callback queue.
///
/// The default is a plain event list: fire any number of times, no memory,
/// duplicates allowed, return values ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallbackOptions {
	/// At most one fire pass ever runs.
	#[serde(alias = "once")]
	pub single_shot: bool,
	/// Remember the last fire arguments and replay them to late callbacks.
	#[serde(alias = "memory")]
	pub replay_last: bool,
	/// A callback can only be registered once.
	#[serde(alias = "unique")]
	pub deduplicate: bool,
	/// A callback returning `false` stops the pass and poisons replay.
	#[serde(alias = "stop_on_false", alias = "stopOnFalse")]
	pub halt_on_false: bool,
}

impl CallbackOptions {
	/// Plain event list options.
	pub const fn new() -> Self {
		Self {
			single_shot: false,
			replay_last: false,
			deduplicate: false,
			halt_on_false: false,
		}
	}

	/// Options of a deferred's resolve and reject queues.
	pub const fn settle() -> Self {
		Self::new().single_shot().replay_last()
	}

	/// Options of a deferred's progress queue.
	pub const fn progress() -> Self {
		Self::new().replay_last()
	}

	pub const fn single_shot(mut self) -> Self {
		self.single_shot = true;
		self
	}

	pub const fn replay_last(mut self) -> Self {
		self.replay_last = true;
		self
	}

	pub const fn deduplicate(mut self) -> Self {
		self.deduplicate = true;
		self
	}

	pub const fn halt_on_false(mut self) -> Self {
		self.halt_on_false = true;
		self
	}

	/// Parses a whitespace or comma separated flag list.
	pub fn parse_flags(flags: &str) -> Result<Self> {
		flags
			.split(|c: char| c.is_whitespace() || c == ',')
			.filter(|word| !word.is_empty())
			.try_fold(Self::new(), |opts, word| match word {
				"once" | "single_shot" => Ok(opts.single_shot()),
				"memory" | "replay_last" => Ok(opts.replay_last()),
				"unique" | "deduplicate" => Ok(opts.deduplicate()),
				"stop_on_false" | "stopOnFalse" | "halt_on_false" => Ok(opts.halt_on_false()),
				other => Err(OptionsError::UnknownFlag(other.to_string())),
			})
	}
}

impl FromStr for CallbackOptions {
	type Err = OptionsError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse_flags(s)
	}
}

impl fmt::Display for CallbackOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let flags = [
			(self.single_shot, "once"),
			(self.replay_last, "memory"),
			(self.deduplicate, "unique"),
			(self.halt_on_false, "stop_on_false"),
		];
		let mut first = true;
		for (_, name) in flags.iter().filter(|(set, _)| *set) {
			if !first {
				f.write_str(" ")?;
			}
			f.write_str(name)?;
			first = false;
		}
		Ok(())
	}
}
