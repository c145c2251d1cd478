//! The scope stack.
//!
//! A construction session keeps one [`ScopeStack`]: the root context at the
//! bottom and every currently open cluster above it, innermost on top. The top
//! of the stack is the implicit parent of anything created.
//!
//! Each open scope is a frame that owns its partial content. Closing a cluster
//! turns its frame into a [`Cluster`] and appends it to the enclosing frame;
//! aborting a cluster drops the frame and everything in it. Both operations
//! first check that the handle names the innermost open scope, so a failed
//! call never alters the stack.

use log::{debug, trace};

use crate::{
    attributes::Attributes,
    error::BuildError,
    identifier::{ClusterId, NodeId, ScopeHandle, SessionId},
    model::{Cluster, Node},
    options::Direction,
};

/// An open scope and the content created inside it so far.
#[derive(Debug)]
struct Frame {
    handle: ScopeHandle,
    label: String,
    parent: Option<ScopeHandle>,
    direction: Option<Direction>,
    attrs: Attributes,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
}

impl Frame {
    fn new(
        handle: ScopeHandle,
        label: String,
        parent: Option<ScopeHandle>,
        direction: Option<Direction>,
        attrs: Attributes,
    ) -> Self {
        Self {
            handle,
            label,
            parent,
            direction,
            attrs,
            nodes: Vec::new(),
            clusters: Vec::new(),
        }
    }

    /// Ids of every node owned by this frame, including nested clusters.
    fn node_ids(&self) -> Vec<NodeId> {
        fn walk(cluster: &Cluster, out: &mut Vec<NodeId>) {
            out.extend(cluster.nodes().iter().map(Node::id));
            for nested in cluster.clusters() {
                walk(nested, out);
            }
        }

        let mut ids: Vec<NodeId> = self.nodes.iter().map(Node::id).collect();
        for cluster in &self.clusters {
            walk(cluster, &mut ids);
        }
        ids
    }
}

/// What closing a scope produced.
#[derive(Debug)]
pub enum Closed {
    /// A cluster was attached to its parent scope.
    Cluster(ClusterId),
    /// The root context was closed; the stack is now empty.
    Root {
        nodes: Vec<Node>,
        clusters: Vec<Cluster>,
    },
}

/// Stack of open scopes for one construction session.
#[derive(Debug)]
pub struct ScopeStack {
    session: SessionId,
    frames: Vec<Frame>,
    next_cluster: u32,
}

impl ScopeStack {
    /// Creates a stack holding only the root context of `session`.
    pub fn new(session: SessionId, title: impl Into<String>) -> Self {
        let root = Frame::new(
            ScopeHandle::Root(session),
            title.into(),
            None,
            None,
            Attributes::new(),
        );
        Self {
            session,
            frames: vec![root],
            next_cluster: 0,
        }
    }

    /// Returns the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] when the root has been closed.
    pub fn current(&self) -> Result<ScopeHandle, BuildError> {
        self.frames
            .last()
            .map(|frame| frame.handle)
            .ok_or(BuildError::NoActiveScope)
    }

    /// Number of open scopes, root included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` once the root context has been closed.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns `true` if `handle` is currently open.
    pub fn is_open(&self, handle: ScopeHandle) -> bool {
        self.frames.iter().any(|frame| frame.handle == handle)
    }

    /// Opens a cluster inside the current scope and makes it current.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] when the root has been closed.
    pub fn open(
        &mut self,
        label: impl Into<String>,
        direction: Option<Direction>,
        attrs: Attributes,
    ) -> Result<ScopeHandle, BuildError> {
        let parent = self.current()?;
        let id = ClusterId::new(self.session, self.next_cluster);
        self.next_cluster += 1;

        let handle = ScopeHandle::Cluster(id);
        let label = label.into();
        debug!(cluster = id.to_string(), parent = parent.to_string(), label = label.as_str(); "Opening cluster");

        self.frames
            .push(Frame::new(handle, label, Some(parent), direction, attrs));
        Ok(handle)
    }

    /// Closes `handle`, which must be the innermost open scope.
    ///
    /// A closed cluster is appended to the child list of the scope below it.
    /// Closing the root empties the stack and hands back the root content.
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoActiveScope`] if the stack is empty.
    /// - [`BuildError::ScopeMismatch`] if `handle` is not on top; the stack is
    ///   left unchanged.
    pub fn close(&mut self, handle: ScopeHandle) -> Result<Closed, BuildError> {
        let frame = self.pop_checked(handle)?;

        let ScopeHandle::Cluster(id) = frame.handle else {
            debug!(nodes = frame.nodes.len(), clusters = frame.clusters.len(); "Closing root context");
            return Ok(Closed::Root {
                nodes: frame.nodes,
                clusters: frame.clusters,
            });
        };

        let depth = self.frames.len();
        let parent = frame.parent.unwrap_or(ScopeHandle::Root(self.session));
        let cluster = Cluster::new(
            id,
            frame.label,
            parent,
            depth,
            frame.direction,
            frame.attrs,
            frame.nodes,
            frame.clusters,
        );
        debug!(cluster = id.to_string(), depth = depth; "Closing cluster");

        // The root frame is never popped by a cluster close, so a parent exists.
        let Some(parent_frame) = self.frames.last_mut() else {
            return Err(BuildError::NoActiveScope);
        };
        parent_frame.clusters.push(cluster);
        Ok(Closed::Cluster(id))
    }

    /// Pops `handle` and discards everything created inside it.
    ///
    /// Returns the ids of the discarded nodes so that dangling edges can be
    /// pruned.
    ///
    /// # Errors
    ///
    /// Same as [`ScopeStack::close`].
    pub fn abort(&mut self, handle: ScopeHandle) -> Result<Vec<NodeId>, BuildError> {
        let frame = self.pop_checked(handle)?;
        let discarded = frame.node_ids();
        debug!(scope = handle.to_string(), discarded = discarded.len(); "Discarding scope");
        Ok(discarded)
    }

    /// Adds `node` to the current scope.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] when the root has been closed.
    pub fn push_node(&mut self, node: Node) -> Result<(), BuildError> {
        let frame = self.frames.last_mut().ok_or(BuildError::NoActiveScope)?;
        trace!(node = node.id().to_string(), scope = frame.handle.to_string(); "Adding node");
        frame.nodes.push(node);
        Ok(())
    }

    fn pop_checked(&mut self, handle: ScopeHandle) -> Result<Frame, BuildError> {
        let top = self.current()?;
        if top != handle {
            return Err(BuildError::ScopeMismatch {
                expected: handle,
                found: top,
            });
        }
        self.frames.pop().ok_or(BuildError::NoActiveScope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn node(session: SessionId, index: u32, parent: ScopeHandle) -> Node {
        Node::new(
            NodeId::new(session, index),
            Category::new("svc"),
            format!("node {index}"),
            parent,
            Attributes::new(),
        )
    }

    #[test]
    fn test_new_stack_has_root() {
        let session = SessionId::next();
        let stack = ScopeStack::new(session, "Test");

        assert_eq!(stack.current(), Ok(ScopeHandle::Root(session)));
        assert_eq!(stack.depth(), 1);
        assert!(!stack.is_empty());
    }

    #[test]
    fn test_open_and_close_attaches_to_parent() {
        let session = SessionId::next();
        let mut stack = ScopeStack::new(session, "Test");
        let root = stack.current().unwrap();

        let outer = stack.open("Outer", None, Attributes::new()).unwrap();
        let inner = stack.open("Inner", None, Attributes::new()).unwrap();
        assert_eq!(stack.current(), Ok(inner));
        assert_eq!(stack.depth(), 3);

        stack.close(inner).unwrap();
        assert_eq!(stack.current(), Ok(outer));
        stack.close(outer).unwrap();

        let Closed::Root { nodes, clusters } = stack.close(root).unwrap() else {
            panic!("Expected root content");
        };
        assert!(nodes.is_empty());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].label(), "Outer");
        assert_eq!(clusters[0].parent(), root);
        assert_eq!(clusters[0].depth(), 1);
        assert_eq!(clusters[0].clusters()[0].label(), "Inner");
        assert_eq!(clusters[0].clusters()[0].parent(), outer);
        assert_eq!(clusters[0].clusters()[0].depth(), 2);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_close_wrong_handle_leaves_stack_intact() {
        let session = SessionId::next();
        let mut stack = ScopeStack::new(session, "Test");
        let outer = stack.open("Outer", None, Attributes::new()).unwrap();
        let inner = stack.open("Inner", None, Attributes::new()).unwrap();

        let err = stack.close(outer).unwrap_err();
        assert_eq!(
            err,
            BuildError::ScopeMismatch {
                expected: outer,
                found: inner
            }
        );
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.current(), Ok(inner));
    }

    #[test]
    fn test_close_on_empty_stack() {
        let session = SessionId::next();
        let mut stack = ScopeStack::new(session, "Test");
        let root = stack.current().unwrap();
        stack.close(root).unwrap();

        assert_eq!(stack.close(root).unwrap_err(), BuildError::NoActiveScope);
        assert_eq!(stack.current(), Err(BuildError::NoActiveScope));
        assert_eq!(
            stack.open("Late", None, Attributes::new()).unwrap_err(),
            BuildError::NoActiveScope
        );
        assert_eq!(
            stack.push_node(node(session, 0, root)).unwrap_err(),
            BuildError::NoActiveScope
        );
    }

    #[test]
    fn test_abort_discards_content() {
        let session = SessionId::next();
        let mut stack = ScopeStack::new(session, "Test");
        let root = stack.current().unwrap();

        let outer = stack.open("Outer", None, Attributes::new()).unwrap();
        stack.push_node(node(session, 0, outer)).unwrap();
        let inner = stack.open("Inner", None, Attributes::new()).unwrap();
        stack.push_node(node(session, 1, inner)).unwrap();
        stack.close(inner).unwrap();

        let discarded = stack.abort(outer).unwrap();
        assert_eq!(
            discarded,
            [NodeId::new(session, 0), NodeId::new(session, 1)]
        );
        assert_eq!(stack.current(), Ok(root));

        let Closed::Root { clusters, .. } = stack.close(root).unwrap() else {
            panic!("Expected root content");
        };
        assert!(clusters.is_empty());
    }

    #[test]
    fn test_cluster_ids_are_unique() {
        let session = SessionId::next();
        let mut stack = ScopeStack::new(session, "Test");

        let first = stack.open("Same", None, Attributes::new()).unwrap();
        stack.close(first).unwrap();
        let second = stack.open("Same", None, Attributes::new()).unwrap();

        assert_ne!(first, second);
        assert!(stack.is_open(second));
        assert!(!stack.is_open(first));
    }
}
