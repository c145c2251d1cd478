//! Session-scoped identifiers for diagram elements.
//!
//! Every [`Diagram`](crate::Diagram) session draws a unique [`SessionId`] and
//! numbers the nodes and clusters it creates. Identity is therefore independent
//! of label text: two nodes labeled `"Worker"` are still distinct, and a handle
//! from one session is never mistaken for an element of another.

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

static NEXT_SESSION: AtomicU32 = AtomicU32::new(0);

/// Identifier of one construction session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

impl SessionId {
    /// Draws a fresh session identifier.
    pub(crate) fn next() -> Self {
        Self(NEXT_SESSION.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle of a node created by [`Diagram::node`](crate::Diagram::node).
///
/// # Examples
///
/// ```
/// use blueprint_core::{Diagram, DiagramOptions};
///
/// let mut diagram = Diagram::new(DiagramOptions::new("Workers"));
/// let a = diagram.node("aws.compute.ec2", "Worker").unwrap();
/// let b = diagram.node("aws.compute.ec2", "Worker").unwrap();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    session: SessionId,
    index: u32,
}

impl NodeId {
    pub(crate) fn new(session: SessionId, index: u32) -> Self {
        Self { session, index }
    }

    /// Returns the session that created this node.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns the creation index of this node within its session.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.index)
    }
}

/// Handle of a cluster (grouping) scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId {
    session: SessionId,
    index: u32,
}

impl ClusterId {
    pub(crate) fn new(session: SessionId, index: u32) -> Self {
        Self { session, index }
    }

    /// Returns the session that opened this cluster.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Returns the opening index of this cluster within its session.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}", self.index)
    }
}

/// Handle of an open scope: the root context or a nested cluster.
///
/// Handles are returned by [`Diagram::open_cluster`](crate::Diagram::open_cluster)
/// and [`Diagram::current`](crate::Diagram::current), and are recorded as the
/// immutable parent of every node and cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeHandle {
    /// The root context of a session.
    Root(SessionId),
    /// A nested cluster.
    Cluster(ClusterId),
}

impl ScopeHandle {
    /// Returns the cluster id, or `None` for the root context.
    pub fn cluster(&self) -> Option<ClusterId> {
        match self {
            ScopeHandle::Root(_) => None,
            ScopeHandle::Cluster(id) => Some(*id),
        }
    }

    /// Returns `true` if this handle names the root context.
    pub fn is_root(&self) -> bool {
        matches!(self, ScopeHandle::Root(_))
    }
}

impl fmt::Display for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeHandle::Root(_) => f.write_str("root"),
            ScopeHandle::Cluster(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sessions_are_unique() {
        let first = SessionId::next();
        let second = SessionId::next();
        assert_ne!(first, second);
    }

    #[test]
    fn test_node_id_identity() {
        let session = SessionId::next();
        let other = SessionId::next();

        assert_eq!(NodeId::new(session, 0), NodeId::new(session, 0));
        assert_ne!(NodeId::new(session, 0), NodeId::new(session, 1));
        assert_ne!(NodeId::new(session, 0), NodeId::new(other, 0));
    }

    #[test]
    fn test_display() {
        let session = SessionId::next();
        assert_eq!(NodeId::new(session, 7).to_string(), "n7");
        assert_eq!(ClusterId::new(session, 3).to_string(), "cluster_3");
        assert_eq!(ScopeHandle::Root(session).to_string(), "root");
        assert_eq!(
            ScopeHandle::Cluster(ClusterId::new(session, 2)).to_string(),
            "cluster_2"
        );
    }

    #[test]
    fn test_scope_handle_accessors() {
        let session = SessionId::next();
        let cluster = ClusterId::new(session, 1);

        assert!(ScopeHandle::Root(session).is_root());
        assert_eq!(ScopeHandle::Root(session).cluster(), None);
        assert!(!ScopeHandle::Cluster(cluster).is_root());
        assert_eq!(ScopeHandle::Cluster(cluster).cluster(), Some(cluster));
    }
}
