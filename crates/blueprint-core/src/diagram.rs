//! The diagram construction session.
//!
//! A [`Diagram`] owns one scope stack, one node counter and one edge list.
//! Nothing is global: independent diagrams can be built side by side, even on
//! different threads, and each keeps its own nesting state.

use std::{
    collections::HashSet,
    ops::{Deref, DerefMut},
};

use log::{debug, info, trace, warn};

use crate::{
    attributes::Attributes,
    edge::{self, ConnectDirection, Endpoints, Link},
    error::BuildError,
    identifier::{NodeId, ScopeHandle, SessionId},
    model::{Category, Cluster, Edge, Graph, Node},
    options::{ClusterOptions, DiagramOptions},
    scope::{Closed, ScopeStack},
};

/// A diagram under construction.
///
/// The root context is open from [`Diagram::new`] until [`Diagram::finish`]
/// (or an explicit [`Diagram::close`] of the root handle). Clusters are opened
/// with [`Diagram::cluster`], which runs a closure with the cluster as the
/// current scope and closes it afterwards on every exit path.
///
/// # Examples
///
/// ```
/// use blueprint_core::{Diagram, DiagramOptions, Direction, Link};
///
/// let mut diagram = Diagram::new(DiagramOptions::new("Test").with_direction(Direction::LeftRight));
/// let (n1, n2) = diagram.cluster("C", |d| {
///     Ok((d.node("svc", "n1")?, d.node("db", "n2")?))
/// })?;
/// diagram.forward(n1, n2, Link::labeled("call"))?;
///
/// let graph = diagram.finish()?;
/// assert_eq!(graph.clusters()[0].nodes().len(), 2);
/// assert_eq!(graph.edges()[0].label(), Some("call"));
/// # Ok::<(), blueprint_core::BuildError>(())
/// ```
#[derive(Debug)]
pub struct Diagram {
    options: DiagramOptions,
    session: SessionId,
    scopes: ScopeStack,
    edges: Vec<Edge>,
    live: HashSet<NodeId>,
    next_node: u32,
    closed_root: Option<(Vec<Node>, Vec<Cluster>)>,
}

impl Diagram {
    /// Starts a construction session and opens its root context.
    pub fn new(options: DiagramOptions) -> Self {
        let session = SessionId::next();
        info!(title = options.title(), direction = options.direction().as_rankdir(); "Starting diagram");

        Self {
            scopes: ScopeStack::new(session, options.title()),
            options,
            session,
            edges: Vec::new(),
            live: HashSet::new(),
            next_node: 0,
            closed_root: None,
        }
    }

    /// Runs a whole construction session and returns the finished graph.
    ///
    /// If `build` fails, every open scope is discarded and the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by `build` or by closing the
    /// root context.
    pub fn build<F>(options: DiagramOptions, build: F) -> Result<Graph, BuildError>
    where
        F: FnOnce(&mut Diagram) -> Result<(), BuildError>,
    {
        let mut diagram = Diagram::new(options);
        if let Err(err) = build(&mut diagram) {
            warn!(err:% = err; "Diagram construction failed, discarding partial content");
            diagram.unwind(ScopeHandle::Root(diagram.session));
            return Err(err);
        }
        diagram.finish()
    }

    /// Borrow the root context options.
    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    /// Returns the handle of the root context.
    pub fn root(&self) -> ScopeHandle {
        ScopeHandle::Root(self.session)
    }

    /// Returns the innermost open scope: the implicit parent of the next node
    /// or cluster.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] once the root has been closed.
    pub fn current(&self) -> Result<ScopeHandle, BuildError> {
        self.scopes.current()
    }

    /// Number of open scopes, root included.
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Creates a node in the current scope.
    ///
    /// The category is resolved to a glyph only at render time; labels may
    /// repeat freely.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] once the root has been closed.
    pub fn node(
        &mut self,
        category: impl Into<Category>,
        label: impl Into<String>,
    ) -> Result<NodeId, BuildError> {
        self.node_with(category, label, Attributes::new())
    }

    /// Creates a node with its own style attributes in the current scope.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] once the root has been closed.
    pub fn node_with(
        &mut self,
        category: impl Into<Category>,
        label: impl Into<String>,
        attrs: Attributes,
    ) -> Result<NodeId, BuildError> {
        let parent = self.scopes.current()?;
        let id = NodeId::new(self.session, self.next_node);

        self.scopes
            .push_node(Node::new(id, category.into(), label.into(), parent, attrs))?;
        self.next_node += 1;
        self.live.insert(id);
        Ok(id)
    }

    /// Opens a cluster, runs `build` with it as the current scope, then closes
    /// it.
    ///
    /// If `build` returns an error or panics, the cluster and everything
    /// created inside it are discarded before the error propagates, and the
    /// enclosing scope is current again.
    ///
    /// # Errors
    ///
    /// Returns the error of `build`, or a [`BuildError`] from opening or
    /// closing the cluster.
    pub fn cluster<T, F>(
        &mut self,
        options: impl Into<ClusterOptions>,
        build: F,
    ) -> Result<T, BuildError>
    where
        F: FnOnce(&mut Diagram) -> Result<T, BuildError>,
    {
        self.try_cluster(options, build)
    }

    /// Like [`Diagram::cluster`], for closures with their own error type.
    ///
    /// # Errors
    ///
    /// Returns the error of `build`, or a [`BuildError`] converted into `E`.
    pub fn try_cluster<T, E, F>(
        &mut self,
        options: impl Into<ClusterOptions>,
        build: F,
    ) -> Result<T, E>
    where
        E: From<BuildError>,
        F: FnOnce(&mut Diagram) -> Result<T, E>,
    {
        let handle = self.open_cluster(options)?;
        let mut guard = ScopeGuard::new(self, handle);

        match build(&mut *guard) {
            Ok(value) => {
                guard.close()?;
                Ok(value)
            }
            Err(err) => {
                guard.abort();
                Err(err)
            }
        }
    }

    /// Opens a cluster and makes it current.
    ///
    /// Prefer [`Diagram::cluster`]; a handle returned here must be passed to
    /// [`Diagram::close`] or [`Diagram::abort`] by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::NoActiveScope`] once the root has been closed.
    pub fn open_cluster(
        &mut self,
        options: impl Into<ClusterOptions>,
    ) -> Result<ScopeHandle, BuildError> {
        let (label, direction, attrs) = options.into().into_parts();
        self.scopes.open(label, direction, attrs)
    }

    /// Closes `handle`, which must be the innermost open scope.
    ///
    /// Closing the root handle ends construction; [`Diagram::finish`] then
    /// returns the graph.
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoActiveScope`] if nothing is open.
    /// - [`BuildError::ScopeMismatch`] if `handle` is not innermost.
    pub fn close(&mut self, handle: ScopeHandle) -> Result<(), BuildError> {
        if let Closed::Root { nodes, clusters } = self.scopes.close(handle)? {
            self.closed_root = Some((nodes, clusters));
        }
        Ok(())
    }

    /// Closes `handle` and discards everything created inside it, including
    /// edges that touch the discarded nodes.
    ///
    /// # Errors
    ///
    /// Same as [`Diagram::close`].
    pub fn abort(&mut self, handle: ScopeHandle) -> Result<(), BuildError> {
        let discarded = self.scopes.abort(handle)?;
        self.forget(&discarded);
        Ok(())
    }

    /// Discards open scopes from the innermost outwards until `handle` is no
    /// longer open.
    fn unwind(&mut self, handle: ScopeHandle) {
        while self.scopes.is_open(handle) {
            let Ok(top) = self.scopes.current() else {
                break;
            };
            if self.abort(top).is_err() {
                break;
            }
        }
    }

    fn forget(&mut self, discarded: &[NodeId]) {
        if discarded.is_empty() {
            return;
        }
        let discarded: HashSet<NodeId> = discarded.iter().copied().collect();
        let before = self.edges.len();
        self.edges.retain(|edge| {
            !discarded.contains(&edge.source()) && !discarded.contains(&edge.target())
        });
        self.live.retain(|node| !discarded.contains(node));
        debug!(nodes = discarded.len(), edges = before - self.edges.len(); "Dropped discarded elements");
    }

    /// Connects `source` to `target` in the given notation.
    ///
    /// Either side may be a single node or an ordered collection: a collection
    /// against a single node broadcasts, two collections pair up element by
    /// element. Every created edge shares `link`.
    ///
    /// Returns the `target` side so that the result can be the source of the
    /// next hop.
    ///
    /// # Errors
    ///
    /// - [`BuildError::NoActiveScope`] once the root has been closed.
    /// - [`BuildError::UnknownNode`] if an endpoint is not a live node of this
    ///   diagram.
    /// - [`BuildError::ArityMismatch`] for collections of different lengths.
    pub fn connect(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        link: impl Into<Link>,
        direction: ConnectDirection,
    ) -> Result<Endpoints, BuildError> {
        self.scopes.current()?;

        let source = source.into();
        let target = target.into();
        let link = link.into();

        if let Some(unknown) = source
            .iter()
            .chain(target.iter())
            .find(|node| !self.live.contains(node))
        {
            return Err(BuildError::UnknownNode(unknown));
        }

        let pairs = edge::pair(&source, &target)?;
        trace!(edges = pairs.len(), direction:% = direction; "Connecting");

        self.edges.extend(pairs.into_iter().map(|(left, right)| {
            let (from, to) = direction.canonical(left, right);
            Edge::new(
                from,
                to,
                link.label().map(str::to_string),
                direction.style(),
                link.color(),
                link.line(),
                link.attrs().clone(),
            )
        }));

        Ok(target)
    }

    /// Connects `source -> target`.
    ///
    /// # Errors
    ///
    /// See [`Diagram::connect`].
    pub fn forward(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        link: impl Into<Link>,
    ) -> Result<Endpoints, BuildError> {
        self.connect(source, target, link, ConnectDirection::Forward)
    }

    /// Connects `source <- target`, stored as `target -> source`.
    ///
    /// # Errors
    ///
    /// See [`Diagram::connect`].
    pub fn backward(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        link: impl Into<Link>,
    ) -> Result<Endpoints, BuildError> {
        self.connect(source, target, link, ConnectDirection::Backward)
    }

    /// Connects `source - target` without arrowheads.
    ///
    /// # Errors
    ///
    /// See [`Diagram::connect`].
    pub fn plain(
        &mut self,
        source: impl Into<Endpoints>,
        target: impl Into<Endpoints>,
        link: impl Into<Link>,
    ) -> Result<Endpoints, BuildError> {
        self.connect(source, target, link, ConnectDirection::Plain)
    }

    /// Edges created so far.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Closes the root context, if still open, and returns the finished graph.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ScopeMismatch`] if a cluster opened with
    /// [`Diagram::open_cluster`] was never closed.
    pub fn finish(mut self) -> Result<Graph, BuildError> {
        if !self.scopes.is_empty() {
            self.close(self.root())?;
        }

        let (nodes, clusters) = self.closed_root.take().unwrap_or_default();
        let graph = Graph::new(self.options, nodes, clusters, self.edges);
        info!(
            nodes = graph.all_nodes().len(),
            clusters = graph.all_clusters().len(),
            edges = graph.edges().len();
            "Diagram finished"
        );
        Ok(graph)
    }
}

/// Keeps a cluster scope balanced while its body runs.
///
/// Dropping an armed guard (on panic) discards the cluster.
struct ScopeGuard<'a> {
    diagram: &'a mut Diagram,
    handle: ScopeHandle,
    armed: bool,
}

impl<'a> ScopeGuard<'a> {
    fn new(diagram: &'a mut Diagram, handle: ScopeHandle) -> Self {
        Self {
            diagram,
            handle,
            armed: true,
        }
    }

    fn close(mut self) -> Result<(), BuildError> {
        self.armed = false;
        let result = self.diagram.close(self.handle);
        if result.is_err() {
            self.diagram.unwind(self.handle);
        }
        result
    }

    fn abort(mut self) {
        self.armed = false;
        self.diagram.unwind(self.handle);
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Diagram;

    fn deref(&self) -> &Diagram {
        self.diagram
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Diagram {
        self.diagram
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.diagram.unwind(self.handle);
        }
    }
}
