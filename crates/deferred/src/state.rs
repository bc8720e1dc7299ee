use std::fmt;

/// Settlement state of a deferred. Transitions only leave `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
	/// Not settled yet; progress notifications are still delivered.
	#[default]
	Pending,
	/// Settled through `resolve`.
	Resolved,
	/// Settled through `reject`.
	Rejected,
}

impl State {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Resolved => "resolved",
			Self::Rejected => "rejected",
		}
	}

	/// Returns true for the two terminal states.
	pub const fn is_settled(self) -> bool {
		!matches!(self, Self::Pending)
	}
}

impl fmt::Display for State {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
