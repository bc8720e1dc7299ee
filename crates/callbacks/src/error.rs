//! Error types for callback queue configuration.

use thiserror::Error;

/// Errors produced while building [`CallbackOptions`](crate::CallbackOptions).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
	/// A flag string contained a word that names no policy.
	#[error("unknown callback flag: {0:?} (expected once, memory, unique or stop_on_false)")]
	UnknownFlag(String),
}

/// Result type for option parsing.
pub type Result<T> = std::result::Result<T, OptionsError>;
