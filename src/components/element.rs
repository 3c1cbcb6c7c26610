//! Identity of retained visual elements shared by the graph and pie views.

/// Identity of a drawn element. Stable for as long as its data key survives
/// re-renders; never reused within one view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

/// Hands out fresh [`ElementId`]s.
#[derive(Clone, Debug, Default)]
pub struct ElementIds {
	next: u64,
}

impl ElementIds {
	/// Next unused id.
	pub fn fresh(&mut self) -> ElementId {
		self.next += 1;
		ElementId(self.next)
	}
}

/// Outcome of matching new data against existing elements by key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
	/// Elements created for new keys.
	pub entered: usize,
	/// Elements kept for keys present before and after.
	pub updated: usize,
	/// Elements removed because their key vanished.
	pub exited: usize,
}
