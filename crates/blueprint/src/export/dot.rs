//! Graphviz DOT serialization of a finished [`Graph`].
//!
//! The tree of clusters becomes nested `cluster_<n>` subgraphs, nodes keep
//! their session identifiers as DOT ids, and every edge is emitted after the
//! tree so that it can cross cluster boundaries. Style defaults are layered
//! as: renderer defaults, then [`StyleConfig`], then the diagram's own
//! attribute maps, then per-element attributes.

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph as DotGraph, GraphAttributes, Id, Node as DotNode,
    NodeId as DotNodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::{debug, trace};

use blueprint_core::{Attributes, Cluster, DiagramOptions, Edge, EdgeStyle, Graph, Node, NodeId};

use crate::{
    config::StyleConfig,
    error::RenderError,
    icon::{Glyph, Glyphs, IconCatalog},
    warning::Warning,
};

const FONT_NAME: &str = "Sans-Serif";
const FONT_COLOR: &str = "#2D3436";
const EDGE_COLOR: &str = "#7B8894";
const CLUSTER_PEN_COLOR: &str = "#AEB6BE";
const CLUSTER_BG_COLORS: [&str; 4] = ["#E5F5FD", "#EBF3E7", "#ECE8F6", "#FDF7E3"];

const NODE_HEIGHT: f32 = 1.9;
const NODE_LINE_HEIGHT: f32 = 0.4;

/// Builds the DOT model of a graph, resolving node glyphs on the way.
pub struct DotBuilder<'a> {
    style: &'a StyleConfig,
    glyphs: Glyphs<'a>,
}

impl<'a> DotBuilder<'a> {
    pub fn new(catalog: &'a dyn IconCatalog, style: &'a StyleConfig) -> Self {
        Self {
            style,
            glyphs: Glyphs::new(catalog),
        }
    }

    /// Converts `graph` into a DOT digraph.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Style`] if a configured style color is invalid.
    pub fn build(&mut self, graph: &Graph) -> Result<DotGraph, RenderError> {
        let options = graph.options();
        let mut stmts = vec![
            Stmt::GAttribute(GraphAttributes::Graph(attributes(
                &self.graph_defaults(options)?,
            ))),
            Stmt::GAttribute(GraphAttributes::Node(attributes(
                &self.node_defaults(options),
            ))),
            Stmt::GAttribute(GraphAttributes::Edge(attributes(
                &self.edge_defaults(options)?,
            ))),
        ];

        for node in graph.nodes() {
            stmts.push(Stmt::Node(self.node(node, options.autolabel())));
        }
        for cluster in graph.clusters() {
            stmts.push(Stmt::Subgraph(self.cluster(cluster, options.autolabel())));
        }
        stmts.extend(graph.edges().iter().map(|edge| Stmt::Edge(edge_stmt(edge))));

        debug!(statements = stmts.len(), strict = options.strict(); "DOT graph built");

        Ok(DotGraph::DiGraph {
            id: quoted(options.title()),
            strict: options.strict(),
            stmts,
        })
    }

    /// Warnings collected while resolving glyphs.
    pub fn warnings(&self) -> Vec<Warning> {
        self.glyphs.warnings()
    }

    fn graph_defaults(&self, options: &DiagramOptions) -> Result<Attributes, RenderError> {
        let mut attrs = Attributes::from([
            ("pad", "2.0"),
            ("splines", options.curve_style().as_splines()),
            ("nodesep", "0.60"),
            ("ranksep", "0.75"),
            ("fontname", self.font_name()),
            ("fontsize", "15"),
            ("fontcolor", FONT_COLOR),
        ]);
        attrs.set("label", options.title());
        attrs.set("rankdir", options.direction().as_rankdir());

        if let Some(color) = self.style.background_color().map_err(RenderError::Style)? {
            attrs.set("bgcolor", color.to_hex());
        }

        attrs.merge(options.graph_attrs());
        Ok(attrs)
    }

    fn node_defaults(&self, options: &DiagramOptions) -> Attributes {
        Attributes::from([
            ("shape", "none"),
            ("height", "1.9"),
            ("width", "1.4"),
            ("labelloc", "b"),
            ("imagescale", "true"),
            ("fixedsize", "true"),
            ("fontname", self.font_name()),
            ("fontsize", "13"),
            ("fontcolor", FONT_COLOR),
        ])
        .merged(options.node_attrs())
    }

    fn edge_defaults(&self, options: &DiagramOptions) -> Result<Attributes, RenderError> {
        let color = match self.style.edge_color().map_err(RenderError::Style)? {
            Some(color) => color.to_hex(),
            None => EDGE_COLOR.to_string(),
        };

        let mut attrs = Attributes::from([("fontname", self.font_name()), ("fontsize", "13")]);
        attrs.set("color", color);
        attrs.merge(options.edge_attrs());
        Ok(attrs)
    }

    fn font_name(&self) -> &'a str {
        self.style.font_name().unwrap_or(FONT_NAME)
    }

    fn node(&mut self, node: &Node, autolabel: bool) -> DotNode {
        let label = if autolabel {
            format!("{}\n{}", node.category().class_name(), node.label())
        } else {
            node.label().to_string()
        };

        let mut attrs = Attributes::new();
        let extra_lines = label.lines().count().saturating_sub(1);
        if extra_lines > 0 {
            let height = NODE_HEIGHT + NODE_LINE_HEIGHT * extra_lines as f32;
            attrs.set("height", format!("{height:.1}"));
        }
        attrs.set("label", label);

        match self.glyphs.resolve(node.category()) {
            Glyph::Image(path) => attrs.set("image", path.to_string_lossy()),
            Glyph::Fallback => {
                attrs.set("shape", "box");
                attrs.set("style", "rounded");
                attrs.set("fixedsize", "false");
                attrs.set("labelloc", "c");
            }
        }
        attrs.merge(node.attrs());

        trace!(node:% = node.id(), category:% = node.category(); "Node emitted");
        DotNode {
            id: node_id(node.id()),
            attributes: attributes(&attrs),
        }
    }

    fn cluster(&mut self, cluster: &Cluster, autolabel: bool) -> Subgraph {
        let level = cluster.depth().saturating_sub(1) % CLUSTER_BG_COLORS.len();
        let bgcolor = CLUSTER_BG_COLORS[level];
        let mut attrs = Attributes::from([
            ("label", cluster.label()),
            ("style", "rounded"),
            ("labeljust", "l"),
            ("pencolor", CLUSTER_PEN_COLOR),
            ("fontname", self.font_name()),
            ("fontsize", "12"),
            ("bgcolor", bgcolor),
        ]);
        if let Some(direction) = cluster.direction() {
            attrs.set("rankdir", direction.as_rankdir());
        }
        attrs.merge(cluster.attrs());

        let mut stmts: Vec<Stmt> = attributes(&attrs).into_iter().map(Stmt::Attribute).collect();
        for node in cluster.nodes() {
            stmts.push(Stmt::Node(self.node(node, autolabel)));
        }
        for child in cluster.clusters() {
            stmts.push(Stmt::Subgraph(self.cluster(child, autolabel)));
        }

        Subgraph {
            id: Id::Plain(cluster.id().to_string()),
            stmts,
        }
    }
}

/// Prints a DOT model as text.
pub fn print(graph: &DotGraph) -> String {
    graph.print(&mut PrinterContext::default())
}

fn edge_stmt(edge: &Edge) -> DotEdge {
    let mut attrs = Attributes::new();
    if let Some(label) = edge.label() {
        attrs.set("label", label);
    }
    if edge.style() == EdgeStyle::Plain {
        attrs.set("dir", "none");
    }
    if let Some(color) = edge.color() {
        attrs.set("color", color.to_hex());
    }
    if let Some(line) = edge.line() {
        attrs.set("style", line.as_str());
    }
    attrs.merge(edge.attrs());

    DotEdge {
        ty: EdgeTy::Pair(
            Vertex::N(node_id(edge.source())),
            Vertex::N(node_id(edge.target())),
        ),
        attributes: attributes(&attrs),
    }
}

fn node_id(id: NodeId) -> DotNodeId {
    DotNodeId(quoted(&id.to_string()), None)
}

fn attributes(attrs: &Attributes) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|(key, value)| Attribute(key_id(key), quoted(value)))
        .collect()
}

fn key_id(key: &str) -> Id {
    let plain = !key.is_empty()
        && !key.starts_with(|c: char| c.is_ascii_digit())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Id::Plain(key.to_string())
    } else {
        quoted(key)
    }
}

fn quoted(value: &str) -> Id {
    Id::Escaped(format!("\"{}\"", escape(value)))
}

/// Escapes a value for a double-quoted DOT string.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use blueprint_core::{
        ClusterOptions, Diagram, DiagramOptions, Direction, LineStyle, Link, color::Color,
    };

    use super::*;
    use crate::icon::StaticCatalog;

    fn sample() -> Graph {
        Diagram::build(
            DiagramOptions::new("Test").with_direction(Direction::LeftRight),
            |d| {
                let (n1, n2) =
                    d.cluster("C", |d| Ok((d.node("svc", "n1")?, d.node("db", "n2")?)))?;
                d.forward(n1, n2, Link::labeled("call"))?;
                Ok(())
            },
        )
        .unwrap()
    }

    fn statements(graph: &DotGraph) -> &[Stmt] {
        match graph {
            DotGraph::DiGraph { stmts, .. } | DotGraph::Graph { stmts, .. } => stmts,
        }
    }

    fn attr<'a>(attrs: &'a [Attribute], key: &str) -> Option<&'a Id> {
        attrs
            .iter()
            .find(|Attribute(k, _)| *k == key_id(key))
            .map(|Attribute(_, v)| v)
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("API Gateway\n(WebSocket/REST)"),
            "API Gateway\\n(WebSocket/REST)"
        );
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape(r"C:\icons"), r"C:\\icons");
    }

    #[test]
    fn test_structure() {
        let catalog = StaticCatalog::new().with("svc", "/icons/svc.png");
        let style = StyleConfig::default();
        let mut builder = DotBuilder::new(&catalog, &style);

        let dot = builder.build(&sample()).unwrap();
        let stmts = statements(&dot);

        let subgraphs: Vec<&Subgraph> = stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Subgraph(subgraph) => Some(subgraph),
                _ => None,
            })
            .collect();
        assert_eq!(subgraphs.len(), 1);
        assert_eq!(subgraphs[0].id, Id::Plain("cluster_0".to_string()));

        let nodes: Vec<&DotNode> = subgraphs[0]
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Node(node) => Some(node),
                _ => None,
            })
            .collect();
        assert_eq!(nodes.len(), 2);
        assert_eq!(
            attr(&nodes[0].attributes, "image"),
            Some(&quoted("/icons/svc.png"))
        );
        assert_eq!(attr(&nodes[1].attributes, "shape"), Some(&quoted("box")));

        let edges = stmts.iter().filter(|stmt| matches!(stmt, Stmt::Edge(_))).count();
        assert_eq!(edges, 1);
        assert_eq!(
            builder.warnings(),
            vec![Warning::IconNotFound {
                category: "db".into()
            }]
        );
    }

    #[test]
    fn test_printed_source() {
        let catalog = StaticCatalog::new();
        let style = StyleConfig::default();
        let mut builder = DotBuilder::new(&catalog, &style);

        let source = print(&builder.build(&sample()).unwrap());

        assert!(source.starts_with("digraph"));
        assert!(source.contains(r#"rankdir="LR""#));
        assert!(source.contains(r#"label="Test""#));
        assert!(source.contains("subgraph cluster_0"));
        assert!(source.contains(r#"label="C""#));
        assert!(source.contains(r##"bgcolor="#E5F5FD""##));
        assert!(source.contains(r#"label="call""#));
        assert!(source.contains(r#""n0""#));
        assert!(source.contains(r#""n1""#));
    }

    #[test]
    fn test_edge_styles() {
        let graph = Diagram::build(DiagramOptions::new("Edges"), |d| {
            let a = d.node("svc", "a")?;
            let b = d.node("svc", "b")?;
            d.plain(
                a,
                b,
                Link::labeled("sync")
                    .with_color(Color::new("red").unwrap())
                    .with_line(LineStyle::Dashed),
            )?;
            Ok(())
        })
        .unwrap();

        let edge = edge_stmt(&graph.edges()[0]);

        assert_eq!(attr(&edge.attributes, "dir"), Some(&quoted("none")));
        assert_eq!(attr(&edge.attributes, "color"), Some(&quoted("#ff0000")));
        assert_eq!(attr(&edge.attributes, "style"), Some(&quoted("dashed")));
        assert_eq!(attr(&edge.attributes, "label"), Some(&quoted("sync")));
    }

    #[test]
    fn test_user_attributes_override_defaults() {
        let options = DiagramOptions::new("Overrides")
            .with_graph_attrs(Attributes::from([("pad", "0.5"), ("bgcolor", "white")]))
            .with_autolabel(true);
        let graph = Diagram::build(options, |d| {
            d.cluster(
                ClusterOptions::new("Deep").with_attrs(Attributes::from([("bgcolor", "#FFFFFF")])),
                |d| d.node_with("aws.compute.ec2", "Engine", Attributes::from([("width", "2")])),
            )?;
            Ok(())
        })
        .unwrap();

        let catalog = StaticCatalog::new();
        let style = StyleConfig::default();
        let mut builder = DotBuilder::new(&catalog, &style);
        let source = print(&builder.build(&graph).unwrap());

        assert!(source.contains(r#"pad="0.5""#));
        assert!(!source.contains(r#"pad="2.0""#));
        assert!(source.contains(r##"bgcolor="#FFFFFF""##));
        assert!(source.contains(r#"width="2""#));
        assert!(source.contains(r#"label="ec2\nEngine""#));
        assert!(source.contains(r#"height="2.3""#));
    }

    #[test]
    fn test_cluster_colors_cycle_by_depth() {
        let graph = Diagram::build(DiagramOptions::new("Depth"), |d| {
            d.cluster("1", |d| {
                d.cluster("2", |d| {
                    d.cluster("3", |d| d.cluster("4", |d| d.cluster("5", |_| Ok(()))))
                })
            })
        })
        .unwrap();

        let catalog = StaticCatalog::new();
        let style = StyleConfig::default();
        let source = print(&DotBuilder::new(&catalog, &style).build(&graph).unwrap());

        for color in CLUSTER_BG_COLORS {
            assert!(source.contains(&format!("bgcolor=\"{color}\"")));
        }
        assert_eq!(source.matches(r##"bgcolor="#E5F5FD""##).count(), 2);
    }
}
