//! Blueprint - declarative architecture diagrams rendered through Graphviz.
//!
//! Diagrams are built with the scoped construction API of [`blueprint_core`]
//! (re-exported here) and rendered by a [`Renderer`], which serializes the
//! finished graph to Graphviz DOT, runs the layout engine and writes one
//! artifact per requested format.

pub mod config;
pub mod engine;
pub mod export;
pub mod icon;
pub mod viewer;

mod error;
mod warning;

pub use blueprint_core::{
    Attributes, BuildError, Category, Cluster, ClusterId, ClusterOptions, ConnectDirection,
    CurveStyle, Diagram, DiagramOptions, Direction, Edge, EdgeStyle, Endpoints, Graph, LineStyle,
    Link, Node, NodeId, ScopeHandle, color,
};

pub use error::{BlueprintError, RenderError};
pub use export::OutputFormat;
pub use warning::Warning;

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use config::AppConfig;
use engine::{Graphviz, LayoutEngine};
use export::dot::{self, DotBuilder};
use icon::{DirectoryCatalog, IconCatalog, StaticCatalog};
use viewer::{Launcher, Viewer};

/// A file produced by a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    format: OutputFormat,
    path: PathBuf,
    size: usize,
}

impl Artifact {
    /// Format of the file.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Where the file was written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Outcome of a successful render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    artifacts: Vec<Artifact>,
    warnings: Vec<Warning>,
}

impl RenderReport {
    /// Files written, in the order formats were requested.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Non-fatal problems met along the way.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Renders finished diagrams to image files.
///
/// # Examples
///
/// ```rust,no_run
/// use blueprint::{Diagram, DiagramOptions, Link, Renderer, config::AppConfig};
///
/// let mut diagram = Diagram::new(DiagramOptions::new("Web Service"));
/// let lb = diagram.node("aws.network.elb", "lb")?;
/// let web = diagram.node("aws.compute.ec2", "web")?;
/// diagram.forward(lb, web, Link::new())?;
///
/// let report = Renderer::new(AppConfig::default()).finalize(diagram)?;
/// println!("{}", report.artifacts()[0].path().display());
/// # Ok::<(), blueprint::BlueprintError>(())
/// ```
pub struct Renderer {
    config: AppConfig,
    engine: Box<dyn LayoutEngine>,
    catalog: Box<dyn IconCatalog>,
    viewer: Box<dyn Viewer>,
}

impl Renderer {
    /// Creates a renderer from configuration.
    ///
    /// The engine is [`Graphviz`] as configured in the `[engine]` section and
    /// icons are looked up in the `[icons]` directory, if any. Artifacts are
    /// shown with the platform's default [`Launcher`].
    pub fn new(config: AppConfig) -> Self {
        let engine = Box::new(Graphviz::from_config(config.engine()));
        let catalog: Box<dyn IconCatalog> = match config.icons().directory() {
            Some(directory) => Box::new(DirectoryCatalog::new(directory)),
            None => Box::new(StaticCatalog::new()),
        };

        Self {
            config,
            engine,
            catalog,
            viewer: Box::new(Launcher::default()),
        }
    }

    /// Replaces the layout engine.
    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Replaces the icon catalog.
    pub fn with_catalog(mut self, catalog: impl IconCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    /// Replaces the viewer used for diagrams that ask to be shown.
    pub fn with_viewer(mut self, viewer: impl Viewer + 'static) -> Self {
        self.viewer = Box::new(viewer);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Serializes `graph` to Graphviz DOT without running the engine.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Style`] if a configured style color is invalid.
    pub fn dot_source(&self, graph: &Graph) -> Result<String, RenderError> {
        let (source, _) = self.serialize(graph)?;
        Ok(source)
    }

    /// Closes the diagram session and renders the result.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Build`] if the session cannot be finished,
    /// otherwise the errors of [`Renderer::render`].
    pub fn finalize(&self, diagram: Diagram) -> Result<RenderReport, BlueprintError> {
        let graph = diagram.finish()?;
        self.render(&graph)
    }

    /// Renders `graph` to every configured format.
    ///
    /// Artifacts are written next to the diagram's output path, one extension
    /// per format. All engine runs complete before anything is written, and
    /// every artifact is staged in a temporary file before any of them is
    /// moved into place, so a failure leaves no partial output behind. If the
    /// diagram asks to be shown, the first artifact is opened in the viewer;
    /// viewer problems only produce a warning.
    ///
    /// # Errors
    ///
    /// Returns [`BlueprintError::Render`] if the engine fails and
    /// [`BlueprintError::Io`] if an artifact cannot be written.
    pub fn render(&self, graph: &Graph) -> Result<RenderReport, BlueprintError> {
        let options = graph.options();
        let base = options.output();
        let formats = self.formats();
        info!(
            title = options.title(),
            engine = self.engine.name(),
            formats = formats.len();
            "Rendering diagram"
        );

        let (source, mut warnings) = self.serialize(graph)?;

        let mut rendered = Vec::with_capacity(formats.len());
        for format in formats {
            let bytes = if format.needs_engine() {
                self.engine.layout(&source, format)?
            } else {
                source.clone().into_bytes()
            };
            rendered.push((format, bytes));
        }

        let mut staged = Vec::with_capacity(rendered.len());
        let mut artifacts = Vec::with_capacity(rendered.len());
        for (format, bytes) in rendered {
            let path = export::artifact_path(&base, format);
            staged.push(export::stage(&path, &bytes)?);
            artifacts.push(Artifact {
                format,
                path,
                size: bytes.len(),
            });
        }
        export::commit(staged)?;

        for artifact in &artifacts {
            info!(path:? = artifact.path, format:% = artifact.format; "Artifact written");
        }

        if options.show() {
            let shown = artifacts.first().and_then(|artifact| self.show(artifact.path()));
            if let Some(warning) = shown {
                warnings.push(warning);
            }
        }

        Ok(RenderReport {
            artifacts,
            warnings,
        })
    }

    /// Requested formats without duplicates, in request order.
    fn formats(&self) -> Vec<OutputFormat> {
        let mut formats = Vec::new();
        for format in self.config.output().formats() {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    fn show(&self, path: &Path) -> Option<Warning> {
        let err = self.viewer.open(path).err()?;
        warn!(path:? = path, err:% = err; "Could not open viewer");
        Some(Warning::ViewerFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    fn serialize(&self, graph: &Graph) -> Result<(String, Vec<Warning>), RenderError> {
        let mut builder = DotBuilder::new(self.catalog.as_ref(), self.config.style());
        let source = dot::print(&builder.build(graph)?);
        debug!(bytes = source.len(); "DOT source generated");
        Ok((source, builder.warnings()))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
