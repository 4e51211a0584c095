//! Branch selection at a single parent.

use crate::conversation::Message;

/// Outcome of deciding which child continues the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    /// Follow exactly one child. `annotate` is set when there were real
    /// alternatives to disambiguate.
    Follow { index: usize, annotate: bool },
    /// Parent role does not branch; every child is an independent,
    /// sequential continuation.
    FanOut,
    /// The active index points one past the last child: a branch being
    /// created but not yet materialized. The parent is shown, traversal
    /// does not descend.
    Halt,
}

/// Decide which of `children` to follow under `parent`.
///
/// `children` must be the parent's children in creation order and
/// non-empty; callers skip resolution entirely for childless parents.
pub fn resolve(parent: &Message, children: &[&Message]) -> BranchOutcome {
    if !parent.role().is_branchable() {
        return BranchOutcome::FanOut;
    }

    let candidate = parent.metadata.active_branch_index.unwrap_or(0);
    if candidate == children.len() {
        return BranchOutcome::Halt;
    }

    // Anything past the placeholder sentinel is stale metadata: clamp it.
    let index = candidate.min(children.len().saturating_sub(1));
    BranchOutcome::Follow {
        index,
        annotate: children.len() > 1,
    }
}
