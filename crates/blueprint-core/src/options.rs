//! Root context options of a diagram session.
//!
//! [`DiagramOptions`] carries everything the root scope knows about the diagram
//! as a whole: its title, where the rendered artifact goes, the layout
//! direction, whether to open the result in a viewer, and the global style
//! attribute maps.

use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// Direction in which ranks of the diagram are laid out.
///
/// The names match the Graphviz `rankdir` values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Direction {
    /// Top to bottom
    #[serde(rename = "TB")]
    TopBottom,
    /// Bottom to top
    #[serde(rename = "BT")]
    BottomTop,
    /// Left to right (default)
    #[default]
    #[serde(rename = "LR")]
    LeftRight,
    /// Right to left
    #[serde(rename = "RL")]
    RightLeft,
}

impl Direction {
    /// Returns the Graphviz `rankdir` value.
    pub fn as_rankdir(self) -> &'static str {
        match self {
            Self::TopBottom => "TB",
            Self::BottomTop => "BT",
            Self::LeftRight => "LR",
            Self::RightLeft => "RL",
        }
    }
}

impl FromStr for Direction {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(Self::TopBottom),
            "BT" => Ok(Self::BottomTop),
            "LR" => Ok(Self::LeftRight),
            "RL" => Ok(Self::RightLeft),
            _ => Err("Invalid direction, expected one of TB, BT, LR, RL"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_rankdir())
    }
}

/// Shape of edge curves, mapped to the Graphviz `splines` attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveStyle {
    /// Axis-aligned segments (default)
    #[default]
    Ortho,
    /// Curved arcs
    Curved,
    /// Smooth splines
    Spline,
    /// Straight polyline segments
    Polyline,
}

impl CurveStyle {
    /// Returns the Graphviz `splines` value.
    pub fn as_splines(self) -> &'static str {
        match self {
            Self::Ortho => "ortho",
            Self::Curved => "curved",
            Self::Spline => "spline",
            Self::Polyline => "polyline",
        }
    }
}

impl FromStr for CurveStyle {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ortho" => Ok(Self::Ortho),
            "curved" => Ok(Self::Curved),
            "spline" => Ok(Self::Spline),
            "polyline" => Ok(Self::Polyline),
            _ => Err("Invalid curve style"),
        }
    }
}

impl fmt::Display for CurveStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_splines())
    }
}

/// Attributes of the root context.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use blueprint_core::{Attributes, DiagramOptions, Direction};
///
/// let options = DiagramOptions::new("Liquibook AWS Architecture")
///     .with_direction(Direction::LeftRight)
///     .with_graph_attrs(Attributes::from([("fontsize", "20"), ("bgcolor", "white")]));
///
/// assert_eq!(options.output(), Path::new("liquibook_aws_architecture"));
/// assert!(!options.show());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramOptions {
    title: String,
    output: Option<PathBuf>,
    direction: Direction,
    curve_style: CurveStyle,
    show: bool,
    strict: bool,
    autolabel: bool,
    graph_attrs: Attributes,
    node_attrs: Attributes,
    edge_attrs: Attributes,
}

impl DiagramOptions {
    /// Creates options for a diagram titled `title`, with every other setting
    /// at its default.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: None,
            direction: Direction::default(),
            curve_style: CurveStyle::default(),
            show: false,
            strict: false,
            autolabel: false,
            graph_attrs: Attributes::new(),
            node_attrs: Attributes::new(),
            edge_attrs: Attributes::new(),
        }
    }

    /// Sets the output path. The renderer replaces its extension with the
    /// extension of each requested format.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Sets the layout direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the edge curve style.
    pub fn with_curve_style(mut self, curve_style: CurveStyle) -> Self {
        self.curve_style = curve_style;
        self
    }

    /// Opens the rendered image in a viewer after a successful render.
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Asks the layout engine to merge duplicate edges.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Prefixes node labels with the class name of their category.
    pub fn with_autolabel(mut self, autolabel: bool) -> Self {
        self.autolabel = autolabel;
        self
    }

    /// Sets global graph style attributes.
    pub fn with_graph_attrs(mut self, attrs: Attributes) -> Self {
        self.graph_attrs = attrs;
        self
    }

    /// Sets default attributes applied to every node.
    pub fn with_node_attrs(mut self, attrs: Attributes) -> Self {
        self.node_attrs = attrs;
        self
    }

    /// Sets default attributes applied to every edge.
    pub fn with_edge_attrs(mut self, attrs: Attributes) -> Self {
        self.edge_attrs = attrs;
        self
    }

    /// Returns the diagram title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the output path.
    ///
    /// Without an explicit path, it is derived from the title: lowercased with
    /// spaces replaced by underscores.
    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.title.to_lowercase().replace(' ', "_")))
    }

    /// Returns the layout direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the edge curve style.
    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    /// Returns whether the result is opened in a viewer.
    pub fn show(&self) -> bool {
        self.show
    }

    /// Returns whether duplicate edges are merged.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Returns whether node labels are prefixed with their class name.
    pub fn autolabel(&self) -> bool {
        self.autolabel
    }

    /// Borrow the global graph attributes.
    pub fn graph_attrs(&self) -> &Attributes {
        &self.graph_attrs
    }

    /// Borrow the default node attributes.
    pub fn node_attrs(&self) -> &Attributes {
        &self.node_attrs
    }

    /// Borrow the default edge attributes.
    pub fn edge_attrs(&self) -> &Attributes {
        &self.edge_attrs
    }
}

/// Attributes of a nested cluster scope.
///
/// # Examples
///
/// ```
/// use blueprint_core::{Direction, options::ClusterOptions};
///
/// let options = ClusterOptions::new("Serverless Layer").with_direction(Direction::TopBottom);
/// assert_eq!(options.label(), "Serverless Layer");
///
/// let from_label: ClusterOptions = "Data Streaming".into();
/// assert_eq!(from_label.direction(), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterOptions {
    label: String,
    direction: Option<Direction>,
    attrs: Attributes,
}

impl ClusterOptions {
    /// Creates options for a cluster labeled `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            direction: None,
            attrs: Attributes::new(),
        }
    }

    /// Overrides the layout direction inside the cluster.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Sets cluster style attributes.
    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    /// Returns the cluster label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the direction override, if any.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    /// Borrow the cluster style attributes.
    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub(crate) fn into_parts(self) -> (String, Option<Direction>, Attributes) {
        (self.label, self.direction, self.attrs)
    }
}

impl From<&str> for ClusterOptions {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for ClusterOptions {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}
