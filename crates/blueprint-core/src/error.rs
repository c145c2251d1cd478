//! Error types for diagram construction.

use thiserror::Error;

use crate::identifier::{NodeId, ScopeHandle};

/// Errors raised while building a diagram.
///
/// Every variant is fatal for the construction session that raised it; the
/// scope stack is left exactly as it was before the failing call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A node, edge or cluster was created, or a scope closed, while no scope
    /// was open.
    #[error("no active scope: the diagram has already been closed")]
    NoActiveScope,

    /// `close` was called with a handle that is not the innermost open scope.
    #[error("scope mismatch: tried to close {expected} but the innermost open scope is {found}")]
    ScopeMismatch {
        expected: ScopeHandle,
        found: ScopeHandle,
    },

    /// Two node collections of different lengths were connected pairwise.
    #[error(
        "arity mismatch: cannot pair {source_len} source node(s) with {target_len} target node(s)"
    )]
    ArityMismatch { source_len: usize, target_len: usize },

    /// An edge endpoint is not a live node of this session.
    #[error("unknown node {0}: it belongs to another diagram or to a discarded cluster")]
    UnknownNode(NodeId),
}
