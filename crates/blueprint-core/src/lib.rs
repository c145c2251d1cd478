//! Blueprint Core Types and Graph Construction
//!
//! This crate provides the in-memory model of a Blueprint architecture diagram
//! and the scoped builder that produces it. It includes:
//!
//! - **Identifiers**: Session-scoped handles for nodes, clusters and scopes ([`identifier`] module)
//! - **Attributes**: Ordered style attribute maps ([`attributes::Attributes`])
//! - **Colors**: CSS color parsing with Graphviz-friendly output ([`color::Color`])
//! - **Model**: The finished tree of clusters, nodes and edges ([`model`] module)
//! - **Scopes**: The nesting discipline for clusters ([`scope`] module)
//! - **Edges**: Endpoint broadcasting and direction normalization ([`edge`] module)
//! - **Diagram**: The construction session tying it all together ([`Diagram`])
//!
//! # Example
//!
//! ```
//! use blueprint_core::{Diagram, DiagramOptions, Direction, Link};
//!
//! let mut diagram = Diagram::new(DiagramOptions::new("Shop").with_direction(Direction::LeftRight));
//! let user = diagram.node("onprem.client.user", "Customer")?;
//!
//! let (api, db) = diagram.cluster("Backend", |d| {
//!     let api = d.node("aws.network.api-gateway", "API")?;
//!     let db = d.node("aws.database.rds", "Orders DB")?;
//!     Ok((api, db))
//! })?;
//!
//! let next = diagram.forward(user, api, Link::labeled("HTTPS"))?;
//! diagram.forward(next, db, Link::new())?;
//!
//! let graph = diagram.finish()?;
//! assert_eq!(graph.clusters().len(), 1);
//! assert_eq!(graph.edges().len(), 2);
//! # Ok::<(), blueprint_core::BuildError>(())
//! ```

pub mod attributes;
pub mod color;
pub mod edge;
pub mod identifier;
pub mod model;
pub mod options;
pub mod scope;

mod diagram;
mod error;

pub use attributes::Attributes;
pub use diagram::Diagram;
pub use edge::{ConnectDirection, EdgeStyle, Endpoints, LineStyle, Link};
pub use error::BuildError;
pub use identifier::{ClusterId, NodeId, ScopeHandle};
pub use model::{Category, Cluster, Edge, Graph, Node};
pub use options::{ClusterOptions, CurveStyle, DiagramOptions, Direction};
