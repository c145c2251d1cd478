//! The Liquibook AWS architecture diagram.
//!
//! A matching engine deployment: clients reach an API gateway, orders are
//! routed through Lambda functions into Kafka, consumed by the engine wrapper
//! on EC2, and fills flow back out through a stream handler.

use blueprint::{Attributes, BuildError, Diagram, DiagramOptions, Direction, Link};

/// Diagram title; also the base of the default output file name.
pub const TITLE: &str = "Liquibook AWS Architecture";

/// Default output path, without extension.
pub const DEFAULT_OUTPUT: &str = "liquibook_aws_architecture";

/// Root context options for the diagram.
pub fn options() -> DiagramOptions {
    DiagramOptions::new(TITLE)
        .with_output(DEFAULT_OUTPUT)
        .with_direction(Direction::LeftRight)
        .with_graph_attrs(Attributes::from([("fontsize", "20"), ("bgcolor", "white")]))
}

/// Builds the diagram content into `d`.
///
/// # Errors
///
/// Returns a [`BuildError`] if construction fails.
pub fn build(d: &mut Diagram) -> Result<(), BuildError> {
    let client = d.node("onprem.client.user", "Client App")?;

    d.cluster("AWS Cloud (Seoul Region)", |d| {
        let api_gw = d.node("aws.integration.api-gateway", "API Gateway\n(WebSocket/REST)")?;

        let (order_router, stream_handler) = d.cluster("Serverless Layer", |d| {
            Ok((
                d.node("aws.compute.lambda", "Order Router\n(Go/Rust)")?,
                d.node("aws.compute.lambda", "Stream Handler\n(Node.js)")?,
            ))
        })?;

        let msk = d.cluster("Data Streaming", |d| {
            d.node("aws.integration.msk", "Amazon MSK\n(Kafka)")
        })?;

        let (engine, wrapper) = d.cluster("Matching Engine Layer (EC2)", |d| {
            Ok((
                d.node("aws.compute.ec2", "Liquibook Engine\n(C++)")?,
                d.node("programming.language.cpp", "AWS Wrapper")?,
            ))
        })?;

        let (redis, s3, db) = d.cluster("Persistence & State", |d| {
            Ok((
                d.node("aws.database.elasticache", "Redis Cache")?,
                d.node("aws.storage.s3", "Snapshot S3")?,
                d.node("aws.database.rds", "User DB")?,
            ))
        })?;

        d.forward(client, api_gw, Link::labeled("Orders/WS"))?;

        d.forward(api_gw, order_router, Link::labeled("Route"))?;
        d.backward(api_gw, stream_handler, Link::labeled("Push"))?;

        d.forward(order_router, msk, Link::labeled("Publish Order"))?;
        d.forward(order_router, db, Link::labeled("Check Balance"))?;

        d.forward(msk, wrapper, Link::labeled("Consume Orders"))?;
        d.plain(wrapper, engine, Link::labeled("Engine Core"))?;
        d.forward(wrapper, msk, Link::labeled("Publish Fills"))?;

        d.forward(msk, stream_handler, Link::labeled("Consume Fills"))?;

        d.forward(wrapper, s3, Link::labeled("Snapshot"))?;
        d.forward(wrapper, redis, Link::labeled("State Cache"))?;
        Ok(())
    })
}
