//! Integration tests for the construction API
//!
//! These tests build small diagrams end to end and check the finished model.

use blueprint_core::{
    BuildError, ConnectDirection, Diagram, DiagramOptions, Direction, EdgeStyle, Endpoints,
    LineStyle, Link, color::Color,
};

#[test]
fn test_end_to_end_model() {
    let mut diagram =
        Diagram::new(DiagramOptions::new("Test").with_direction(Direction::LeftRight));
    let root = diagram.root();

    let cluster = diagram.open_cluster("C").unwrap();
    let n1 = diagram.node("svc", "n1").unwrap();
    let n2 = diagram.node("db", "n2").unwrap();
    diagram.forward(n1, n2, Link::labeled("call")).unwrap();
    diagram.close(cluster).unwrap();
    diagram.close(root).unwrap();

    let graph = diagram.finish().unwrap();

    assert_eq!(graph.options().title(), "Test");
    assert_eq!(graph.options().direction(), Direction::LeftRight);
    assert!(graph.nodes().is_empty());
    assert_eq!(graph.clusters().len(), 1);

    let c = &graph.clusters()[0];
    assert_eq!(c.label(), "C");
    assert_eq!(c.parent(), root);
    assert_eq!(c.nodes().len(), 2);
    assert!(c.nodes().iter().all(|node| node.parent() == cluster));
    assert_eq!(c.nodes()[0].category().as_str(), "svc");
    assert_eq!(c.nodes()[1].category().as_str(), "db");

    assert_eq!(graph.edges().len(), 1);
    let edge = &graph.edges()[0];
    assert_eq!(edge.source(), n1);
    assert_eq!(edge.target(), n2);
    assert_eq!(edge.label(), Some("call"));
    assert_eq!(edge.style(), EdgeStyle::Directed);
}

#[test]
fn test_forward_and_backward_notations_are_equivalent() {
    let build = |direction: ConnectDirection| {
        let mut diagram = Diagram::new(DiagramOptions::new("Notation"));
        let a = diagram.node("svc", "A").unwrap();
        let b = diagram.node("svc", "B").unwrap();
        match direction {
            ConnectDirection::Forward => diagram.forward(a, b, "uses").unwrap(),
            _ => diagram.backward(b, a, "uses").unwrap(),
        };
        let graph = diagram.finish().unwrap();
        let edge = &graph.edges()[0];
        (
            graph.node(edge.source()).unwrap().label().to_string(),
            graph.node(edge.target()).unwrap().label().to_string(),
            edge.label().map(str::to_string),
            edge.style(),
        )
    };

    assert_eq!(
        build(ConnectDirection::Forward),
        build(ConnectDirection::Backward)
    );
}

#[test]
fn test_broadcast_and_pairwise() {
    let mut diagram = Diagram::new(DiagramOptions::new("Fan"));
    let a = diagram.node("svc", "a").unwrap();
    let b = diagram.node("svc", "b").unwrap();
    let c = diagram.node("svc", "c").unwrap();
    let x = diagram.node("svc", "x").unwrap();
    let y = diagram.node("svc", "y").unwrap();
    let z = diagram.node("svc", "z").unwrap();

    diagram.forward([a, b], c, Link::new()).unwrap();
    diagram.forward([a, b], [x, y], Link::new()).unwrap();
    let err = diagram.forward([a, b], [x, y, z], Link::new()).unwrap_err();

    assert_eq!(
        err,
        BuildError::ArityMismatch {
            source_len: 2,
            target_len: 3
        }
    );
    let pairs: Vec<_> = diagram
        .edges()
        .iter()
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    assert_eq!(pairs, [(a, c), (b, c), (a, x), (b, y)]);
}

#[test]
fn test_edges_cross_cluster_boundaries() {
    let graph = Diagram::build(DiagramOptions::new("Cross"), |d| {
        let client = d.node("onprem.client.user", "Client")?;
        let api = d.cluster("Cloud", |d| {
            d.cluster("Edge", |d| d.node("aws.network.api-gateway", "API"))
        })?;
        let db = d.cluster("Data", |d| d.node("aws.database.rds", "DB"))?;

        let hop = d.forward(client, api, Link::labeled("HTTPS"))?;
        d.forward(hop, db, Link::labeled("SQL"))?;
        Ok(())
    })
    .unwrap();

    assert_eq!(graph.clusters().len(), 2);
    assert_eq!(graph.clusters()[0].clusters()[0].depth(), 2);
    assert_eq!(graph.edges().len(), 2);
    assert_eq!(graph.edges()[0].target(), graph.edges()[1].source());
}

#[test]
fn test_link_styles_are_stored() {
    let mut diagram = Diagram::new(DiagramOptions::new("Styles"));
    let a = diagram.node("svc", "A").unwrap();
    let b = diagram.node("svc", "B").unwrap();

    let link = Link::labeled("replicate")
        .with_color(Color::new("firebrick").unwrap())
        .with_line(LineStyle::Dashed);
    let result = diagram.plain(a, b, link).unwrap();

    assert_eq!(result, Endpoints::One(b));
    let edge = &diagram.edges()[0];
    assert_eq!(edge.style(), EdgeStyle::Plain);
    assert_eq!(edge.line(), Some(LineStyle::Dashed));
    assert_eq!(edge.color().unwrap().to_hex(), "#b22222");
}

#[test]
fn test_concurrent_sessions_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                Diagram::build(DiagramOptions::new(format!("Thread {i}")), |d| {
                    for depth in 0..=i {
                        d.open_cluster(format!("level {depth}"))?;
                        d.node("svc", "worker")?;
                    }
                    while d.depth() > 1 {
                        let current = d.current()?;
                        d.close(current)?;
                    }
                    Ok(())
                })
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let graph = handle.join().unwrap().unwrap();
        assert_eq!(graph.all_clusters().len(), i + 1);
        assert_eq!(graph.all_nodes().len(), i + 1);
    }
}
