//! Integration tests for the Renderer
//!
//! In-process layout engines stand in for Graphviz so these tests do not
//! depend on it being installed.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use blueprint::{
    BlueprintError, Diagram, DiagramOptions, Direction, Link, OutputFormat, RenderError, Renderer,
    Warning,
    config::{AppConfig, EngineConfig, IconConfig, OutputConfig, StyleConfig},
    engine::LayoutEngine,
    icon::StaticCatalog,
    viewer::{Launcher, Viewer},
};

/// Returns a fixed image header followed by the requested format.
struct FakeEngine;

impl LayoutEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn layout(&self, source: &str, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        assert!(source.starts_with("digraph"));
        Ok(format!("IMAGE:{format}").into_bytes())
    }
}

/// Fails every format except the first one it is asked for.
#[derive(Default)]
struct FlakyEngine {
    calls: AtomicUsize,
}

impl LayoutEngine for FlakyEngine {
    fn name(&self) -> &str {
        "flaky"
    }

    fn layout(&self, _source: &str, _format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(b"IMAGE".to_vec());
        }
        Err(RenderError::EngineMissing {
            program: "flaky".to_string(),
        })
    }
}

/// Refuses to run at all.
struct BrokenEngine;

impl LayoutEngine for BrokenEngine {
    fn name(&self) -> &str {
        "broken"
    }

    fn layout(&self, _source: &str, _format: OutputFormat) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::EngineMissing {
            program: "broken".to_string(),
        })
    }
}

/// Records every path it is asked to open.
#[derive(Clone, Default)]
struct RecordingViewer {
    opened: Arc<Mutex<Vec<PathBuf>>>,
}

impl Viewer for RecordingViewer {
    fn open(&self, path: &Path) -> io::Result<()> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

fn config_with_program(program: &str) -> AppConfig {
    AppConfig::new(
        EngineConfig::new(program, Duration::from_secs(5)),
        OutputConfig::default(),
        StyleConfig::default(),
        IconConfig::default(),
    )
}

fn diagram(output: &Path) -> Diagram {
    diagram_with(DiagramOptions::new("Test").with_output(output))
}

fn diagram_with(options: DiagramOptions) -> Diagram {
    let mut diagram = Diagram::new(options.with_direction(Direction::LeftRight));
    let (n1, n2) = diagram
        .cluster("C", |d| Ok((d.node("svc", "n1")?, d.node("db", "n2")?)))
        .unwrap();
    diagram.forward(n1, n2, Link::labeled("call")).unwrap();
    diagram
}

#[test]
fn test_render_writes_one_artifact_per_format() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("test");

    let config = AppConfig::default().with_formats(vec![
        OutputFormat::Png,
        OutputFormat::Svg,
        OutputFormat::Png,
    ]);
    let renderer = Renderer::new(config).with_engine(FakeEngine);

    let report = renderer.finalize(diagram(&output)).unwrap();

    let paths: Vec<_> = report.artifacts().iter().map(|a| a.path().to_path_buf()).collect();
    assert_eq!(
        paths,
        vec![dir.path().join("test.png"), dir.path().join("test.svg")]
    );
    assert_eq!(fs::read(dir.path().join("test.png")).unwrap(), b"IMAGE:png");
    assert_eq!(fs::read(dir.path().join("test.svg")).unwrap(), b"IMAGE:svg");
    assert_eq!(report.artifacts()[0].size(), 9);
}

#[test]
fn test_dot_format_skips_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("source");

    let renderer = Renderer::new(AppConfig::default().with_formats(vec![OutputFormat::Dot]))
        .with_engine(BrokenEngine);

    let report = renderer.finalize(diagram(&output)).unwrap();

    assert_eq!(report.artifacts().len(), 1);
    assert_eq!(report.artifacts()[0].format(), OutputFormat::Dot);
    let source = fs::read_to_string(dir.path().join("source.dot")).unwrap();
    assert!(source.contains("subgraph cluster_0"));
    assert!(source.contains(r#"label="call""#));
}

#[test]
fn test_failing_engine_leaves_output_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("arch.png");
    fs::write(&output, b"previous").unwrap();

    let renderer = Renderer::new(
        AppConfig::default().with_formats(vec![OutputFormat::Png, OutputFormat::Pdf]),
    )
    .with_engine(FlakyEngine::default());

    let err = renderer.finalize(diagram(&output)).unwrap_err();

    assert!(matches!(
        err,
        BlueprintError::Render(RenderError::EngineMissing { .. })
    ));
    assert_eq!(fs::read(&output).unwrap(), b"previous");
    assert!(!dir.path().join("arch.pdf").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_engine_program() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("missing");

    let config = config_with_program("blueprint-no-such-layout-engine");
    let err = Renderer::new(config).finalize(diagram(&output)).unwrap_err();

    assert!(matches!(
        err,
        BlueprintError::Render(RenderError::EngineMissing { .. })
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_unknown_icons_are_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("icons");

    let mut diagram = diagram(&output);
    diagram.node("db", "replica").unwrap();

    let renderer = Renderer::default()
        .with_engine(FakeEngine)
        .with_catalog(StaticCatalog::new().with("svc", "/icons/svc.png"));
    let report = renderer.finalize(diagram).unwrap();

    assert_eq!(
        report.warnings(),
        [Warning::IconNotFound {
            category: "db".into()
        }]
    );
}

#[test]
fn test_unclosed_cluster_fails_finalize() {
    let dir = tempfile::tempdir().unwrap();
    let mut diagram = diagram(&dir.path().join("open"));
    diagram.open_cluster("Dangling").unwrap();

    let err = Renderer::default()
        .with_engine(FakeEngine)
        .finalize(diagram)
        .unwrap_err();

    assert!(matches!(err, BlueprintError::Build(_)));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_write_failure_leaves_no_partial_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("arch");
    fs::create_dir(dir.path().join("arch.svg")).unwrap();

    let renderer = Renderer::new(
        AppConfig::default().with_formats(vec![OutputFormat::Png, OutputFormat::Svg]),
    )
    .with_engine(FakeEngine);

    let err = renderer.finalize(diagram(&output)).unwrap_err();

    assert!(matches!(err, BlueprintError::Io(_)));
    assert!(!dir.path().join("arch.png").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_first_artifact_is_shown() {
    let dir = tempfile::tempdir().unwrap();
    let options = DiagramOptions::new("Test")
        .with_output(dir.path().join("shown"))
        .with_show(true);

    let viewer = RecordingViewer::default();
    let renderer = Renderer::new(
        AppConfig::default().with_formats(vec![OutputFormat::Svg, OutputFormat::Png]),
    )
    .with_engine(FakeEngine)
    .with_viewer(viewer.clone());

    let report = renderer.finalize(diagram_with(options)).unwrap();

    assert!(report.warnings().is_empty());
    assert_eq!(
        *viewer.opened.lock().unwrap(),
        vec![dir.path().join("shown.svg")]
    );
}

#[test]
fn test_viewer_failure_is_only_a_warning() {
    let dir = tempfile::tempdir().unwrap();
    let options = DiagramOptions::new("Test")
        .with_output(dir.path().join("shown"))
        .with_show(true);

    let renderer = Renderer::default()
        .with_engine(FakeEngine)
        .with_viewer(Launcher::new("blueprint-no-such-viewer"));

    let report = renderer.finalize(diagram_with(options)).unwrap();

    assert_eq!(report.artifacts().len(), 1);
    assert!(dir.path().join("shown.png").exists());
    match report.warnings() {
        [Warning::ViewerFailed { path, .. }] => assert_eq!(path, &dir.path().join("shown.png")),
        other => panic!("unexpected warnings: {other:?}"),
    }
}

#[test]
fn test_viewer_is_not_used_unless_asked() {
    let dir = tempfile::tempdir().unwrap();
    let viewer = RecordingViewer::default();

    Renderer::default()
        .with_engine(FakeEngine)
        .with_viewer(viewer.clone())
        .finalize(diagram(&dir.path().join("quiet")))
        .unwrap();

    assert!(viewer.opened.lock().unwrap().is_empty());
}
