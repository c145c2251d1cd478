//! Edge construction: endpoint pairing and direction normalization.
//!
//! A connection joins two [`Endpoints`], each a single node or an ordered
//! collection of nodes:
//!
//! | source | target | result |
//! |---|---|---|
//! | one | one | one edge |
//! | many | one | one edge per source element (broadcast) |
//! | one | many | one edge per target element (broadcast) |
//! | many | many | element *i* to element *i*; lengths must match |
//!
//! The [`ConnectDirection`] only decides which side of each pair becomes the
//! stored source. A backward connection is sugar for swapping endpoints, so the
//! stored [`Edge`](crate::Edge) never records which notation produced it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{attributes::Attributes, color::Color, error::BuildError, identifier::NodeId};

/// The notation a connection was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectDirection {
    /// `source -> target`
    Forward,
    /// `source <- target`, stored as `target -> source`
    Backward,
    /// `source - target`, stored as `source -> target` without arrowheads
    Plain,
}

impl ConnectDirection {
    /// Orders a `(left, right)` pair into the canonical `(source, target)`.
    pub fn canonical(self, left: NodeId, right: NodeId) -> (NodeId, NodeId) {
        match self {
            Self::Forward | Self::Plain => (left, right),
            Self::Backward => (right, left),
        }
    }

    /// Returns the stored style for this notation.
    pub fn style(self) -> EdgeStyle {
        match self {
            Self::Forward | Self::Backward => EdgeStyle::Directed,
            Self::Plain => EdgeStyle::Plain,
        }
    }
}

impl FromStr for ConnectDirection {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">>" | "->" => Ok(Self::Forward),
            "<<" | "<-" => Ok(Self::Backward),
            "-" => Ok(Self::Plain),
            _ => Err("Invalid connect direction"),
        }
    }
}

impl fmt::Display for ConnectDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "->",
            Self::Backward => "<-",
            Self::Plain => "-",
        })
    }
}

/// Stored style of an edge.
///
/// A plain edge is still stored source → target; the style only tells the
/// renderer to omit arrowheads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeStyle {
    /// Arrowhead at the target
    #[default]
    Directed,
    /// No arrowheads
    Plain,
}

/// Line style of an edge, mapped to the Graphviz `style` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    Bold,
}

impl LineStyle {
    /// Returns the Graphviz `style` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
            Self::Bold => "bold",
        }
    }
}

impl FromStr for LineStyle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            "bold" => Ok(Self::Bold),
            _ => Err("Invalid line style"),
        }
    }
}

/// Label and styling shared by every edge a connection creates.
///
/// # Examples
///
/// ```
/// use blueprint_core::{Link, LineStyle, color::Color};
///
/// let link = Link::labeled("Publish Fills")
///     .with_color(Color::new("firebrick").unwrap())
///     .with_line(LineStyle::Dashed);
///
/// assert_eq!(link.label(), Some("Publish Fills"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    label: Option<String>,
    color: Option<Color>,
    line: Option<LineStyle>,
    attrs: Attributes,
}

impl Link {
    /// Creates an unlabeled link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a link with a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Sets the line color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Sets the line style.
    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = Some(line);
        self
    }

    /// Sets free-form edge attributes.
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Get the label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the line color, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Get the line style, if any.
    pub fn line(&self) -> Option<LineStyle> {
        self.line
    }

    /// Borrow the free-form attributes.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }
}

impl From<&str> for Link {
    fn from(label: &str) -> Self {
        Self::labeled(label)
    }
}

/// One side of a connection: a single node or an ordered collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoints {
    One(NodeId),
    Many(Vec<NodeId>),
}

impl Endpoints {
    /// Iterates over the nodes of this side in order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.as_slice().iter().copied()
    }

    /// Borrow the nodes of this side as a slice.
    pub fn as_slice(&self) -> &[NodeId] {
        match self {
            Endpoints::One(node) => std::slice::from_ref(node),
            Endpoints::Many(nodes) => nodes,
        }
    }

    /// Returns the number of nodes on this side.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` for an empty collection.
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Returns the single node, or `None` for a collection.
    pub fn single(&self) -> Option<NodeId> {
        match self {
            Endpoints::One(node) => Some(*node),
            Endpoints::Many(_) => None,
        }
    }
}

impl From<NodeId> for Endpoints {
    fn from(node: NodeId) -> Self {
        Endpoints::One(node)
    }
}

impl From<Vec<NodeId>> for Endpoints {
    fn from(nodes: Vec<NodeId>) -> Self {
        Endpoints::Many(nodes)
    }
}

impl From<&[NodeId]> for Endpoints {
    fn from(nodes: &[NodeId]) -> Self {
        Endpoints::Many(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeId; N]> for Endpoints {
    fn from(nodes: [NodeId; N]) -> Self {
        Endpoints::Many(nodes.to_vec())
    }
}

impl From<&Endpoints> for Endpoints {
    fn from(endpoints: &Endpoints) -> Self {
        endpoints.clone()
    }
}

/// Pairs up the left and right sides of a connection, before direction is
/// applied.
///
/// # Errors
///
/// Returns [`BuildError::ArityMismatch`] when both sides are collections of
/// different lengths.
pub fn pair(left: &Endpoints, right: &Endpoints) -> Result<Vec<(NodeId, NodeId)>, BuildError> {
    match (left, right) {
        (Endpoints::One(l), Endpoints::One(r)) => Ok(vec![(*l, *r)]),
        (Endpoints::Many(ls), Endpoints::One(r)) => Ok(ls.iter().map(|l| (*l, *r)).collect()),
        (Endpoints::One(l), Endpoints::Many(rs)) => Ok(rs.iter().map(|r| (*l, *r)).collect()),
        (Endpoints::Many(ls), Endpoints::Many(rs)) => {
            if ls.len() != rs.len() {
                return Err(BuildError::ArityMismatch {
                    source_len: ls.len(),
                    target_len: rs.len(),
                });
            }
            Ok(ls.iter().copied().zip(rs.iter().copied()).collect())
        }
    }
}
