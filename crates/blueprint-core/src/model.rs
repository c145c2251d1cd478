//! The finished diagram model.
//!
//! A [`Graph`] is what a construction session produces once its root scope is
//! closed: a tree of [`Cluster`]s and [`Node`]s owned by the root context, plus
//! a flat list of [`Edge`]s that reference nodes by identity and may cross
//! cluster boundaries freely.
//!
//! # Pipeline Position
//!
//! ```text
//! Diagram session (scopes, node factory, edge builder)
//!     ↓ finish
//! Graph (these types)
//!     ↓ serialize
//! Graphviz DOT
//!     ↓ layout engine
//! Image
//! ```

use std::fmt;

use crate::{
    attributes::Attributes,
    color::Color,
    edge::{EdgeStyle, LineStyle},
    identifier::{ClusterId, NodeId, ScopeHandle},
    options::{DiagramOptions, Direction},
};

/// Free-form category key of a node, resolved to a glyph by an icon catalog.
///
/// Categories are dotted paths such as `aws.compute.ec2`; the last segment is
/// the class name used for automatic labels.
///
/// # Examples
///
/// ```
/// use blueprint_core::Category;
///
/// let category = Category::new("aws.database.elasticache");
/// assert_eq!(category.class_name(), "elasticache");
/// assert_eq!(category.segments().count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// Creates a category from its key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the full key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the dot-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|segment| !segment.is_empty())
    }

    /// Returns the last segment of the key.
    pub fn class_name(&self) -> &str {
        self.segments().last().unwrap_or(&self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Category {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A typed vertex of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    category: Category,
    label: String,
    parent: ScopeHandle,
    attrs: Attributes,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        category: Category,
        label: String,
        parent: ScopeHandle,
        attrs: Attributes,
    ) -> Self {
        Self {
            id,
            category,
            label,
            parent,
            attrs,
        }
    }

    /// Get the node identifier.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node category.
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Get the display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the scope that was active when the node was created.
    pub fn parent(&self) -> ScopeHandle {
        self.parent
    }

    /// Borrow the node's own style attributes.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}

/// A closed grouping scope with its content.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    label: String,
    parent: ScopeHandle,
    depth: usize,
    direction: Option<Direction>,
    attrs: Attributes,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
}

impl Cluster {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ClusterId,
        label: String,
        parent: ScopeHandle,
        depth: usize,
        direction: Option<Direction>,
        attrs: Attributes,
        nodes: Vec<Node>,
        clusters: Vec<Cluster>,
    ) -> Self {
        Self {
            id,
            label,
            parent,
            depth,
            direction,
            attrs,
            nodes,
            clusters,
        }
    }

    /// Get the cluster identifier.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Get the cluster label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the scope that was active when the cluster was opened.
    pub fn parent(&self) -> ScopeHandle {
        self.parent
    }

    /// Nesting depth; clusters directly under the root have depth 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Layout direction override for this cluster, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Borrow the cluster's style attributes.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Nodes created directly inside this cluster, in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Clusters nested directly inside this cluster, in closing order.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
}

/// A stored relation between two nodes, always in canonical source → target
/// direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    source: NodeId,
    target: NodeId,
    label: Option<String>,
    style: EdgeStyle,
    color: Option<Color>,
    line: Option<LineStyle>,
    attrs: Attributes,
}

impl Edge {
    pub(crate) fn new(
        source: NodeId,
        target: NodeId,
        label: Option<String>,
        style: EdgeStyle,
        color: Option<Color>,
        line: Option<LineStyle>,
        attrs: Attributes,
    ) -> Self {
        Self {
            source,
            target,
            label,
            style,
            color,
            line,
            attrs,
        }
    }

    /// Get the source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// Get the target node.
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Get the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the edge style.
    pub fn style(&self) -> EdgeStyle {
        self.style
    }

    /// Get the line color, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Get the line style, if any.
    pub fn line(&self) -> Option<LineStyle> {
        self.line
    }

    /// Borrow the edge's free-form attributes.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}

/// A finished diagram: the root context with its content tree and edge set.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    options: DiagramOptions,
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    edges: Vec<Edge>,
}

impl Graph {
    pub(crate) fn new(
        options: DiagramOptions,
        nodes: Vec<Node>,
        clusters: Vec<Cluster>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            options,
            nodes,
            clusters,
            edges,
        }
    }

    /// Borrow the root context options.
    pub fn options(&self) -> &DiagramOptions {
        &self.options
    }

    /// Nodes created directly in the root context.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Clusters nested directly in the root context.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// All edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Every node of the tree, root nodes first, then each cluster depth-first.
    pub fn all_nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        for cluster in self.all_clusters() {
            nodes.extend(cluster.nodes());
        }
        nodes
    }

    /// Every cluster of the tree in depth-first pre-order.
    pub fn all_clusters(&self) -> Vec<&Cluster> {
        fn walk<'a>(clusters: &'a [Cluster], out: &mut Vec<&'a Cluster>) {
            for cluster in clusters {
                out.push(cluster);
                walk(cluster.clusters(), out);
            }
        }

        let mut out = Vec::new();
        walk(&self.clusters, &mut out);
        out
    }

    /// Looks up a node anywhere in the tree.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.all_nodes().into_iter().find(|node| node.id() == id)
    }

    /// Looks up a cluster anywhere in the tree.
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.all_clusters()
            .into_iter()
            .find(|cluster| cluster.id() == id)
    }

    /// Edges leaving `node`.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.source() == node)
    }

    /// Edges entering `node`.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |edge| edge.target() == node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_class_name() {
        assert_eq!(Category::new("aws.compute.ec2").class_name(), "ec2");
        assert_eq!(Category::new("svc").class_name(), "svc");
        assert_eq!(Category::new("onprem.client.").class_name(), "client");
        assert_eq!(Category::new("").class_name(), "");
    }

    #[test]
    fn test_category_display() {
        let category: Category = "programming.language.cpp".into();
        assert_eq!(category.to_string(), "programming.language.cpp");
        assert_eq!(category.as_str(), "programming.language.cpp");
    }
}
