use anyhow::{bail, Context, Result};
use sensor_node::command::handlers::HandlerContext;
use sensor_node::command::CommandDispatcher;
use sensor_node::config::NodeConfig;
use sensor_node::connection::{ConnectionEvent, ConnectionManager};
use sensor_node::gateway::{EnvelopeGateway, PublishGateway};
use sensor_node::peripherals::{LogDisplay, LogLed};
use sensor_node::property::{PropertyDef, PropertyStore, PropertySync};
use sensor_node::router::InboundRouter;
use sensor_node::scheduler::{CadenceScheduler, CadenceSettings, WakeSignal};
use sensor_node::sensor::SimulatedSensors;
use sensor_node::telemetry::TelemetryGroup;
use sensor_node::transport::TcpConnector;
use sensor_node_shared::twin;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Envelopes that may wait for the connection task
const OUTBOUND_QUEUE_DEPTH: usize = 32;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = NodeConfig::load(&NodeConfig::default_path())?;
    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            error!("Config: {}", problem);
        }
        bail!("Invalid configuration ({} problems)", problems.len());
    }

    info!("Sensor node starting: {}", config.device_id);
    info!("  Endpoint: {}", config.endpoint.address);
    info!(
        "  Telemetry: every {}s, groups [{}]",
        config.telemetry.interval_secs,
        config.telemetry.groups.join(", ")
    );

    let groups = TelemetryGroup::ordered(&config.telemetry.groups)?;
    let store = PropertyStore::new(PropertyDef::catalogue(config.telemetry.interval_secs));
    let wake = WakeSignal::new();

    let mut conn = ConnectionManager::start(
        TcpConnector::from_config(&config.endpoint),
        OUTBOUND_QUEUE_DEPTH,
    );
    let gateway: Arc<dyn PublishGateway> =
        Arc::new(EnvelopeGateway::new(&config.device_id, conn.get_sender()));

    let properties = PropertySync::new(store.clone(), wake.clone(), gateway.clone());
    let dispatcher = Arc::new(CommandDispatcher::with_builtin_commands(HandlerContext {
        properties: properties.clone(),
        actuator: Arc::new(LogLed),
        display: Arc::new(LogDisplay),
        display_width: config.display.max_chars,
    }));
    info!("Commands: {}", dispatcher.commands().join(", "));
    let router = InboundRouter::new(dispatcher, properties.clone(), gateway.clone());

    let scheduler = CadenceScheduler::new(
        groups,
        Arc::new(SimulatedSensors::new()),
        store,
        wake,
        gateway,
        CadenceSettings::from_config(&config.telemetry),
    )
    .await?;

    // Nothing is published before the endpoint is reachable
    match conn.recv().await {
        Some(ConnectionEvent::Connected { endpoint }) => info!("Connected to {}", endpoint),
        Some(ConnectionEvent::ConnectionFailed { reason }) => bail!("Connection failed: {}", reason),
        Some(other) => bail!("Unexpected connection event: {:?}", other),
        None => bail!("Connection manager closed"),
    }

    properties
        .report_all()
        .await
        .context("Failed to report properties")?;
    properties
        .report_component(twin::DEVICE_INFO_COMPONENT, &config.device_info.properties())
        .await
        .context("Failed to report device information")?;

    let mut scheduler_task = tokio::spawn(scheduler.run());

    loop {
        tokio::select! {
            event = conn.recv() => match event {
                Some(ConnectionEvent::Received(envelope)) => {
                    router.handle(envelope).await.context("Publish gateway closed")?;
                }
                Some(ConnectionEvent::Disconnected { reason }) => bail!("Disconnected: {}", reason),
                Some(ConnectionEvent::ConnectionFailed { reason }) => {
                    bail!("Connection failed: {}", reason)
                }
                Some(ConnectionEvent::Connected { endpoint }) => info!("Connected to {}", endpoint),
                None => bail!("Connection manager closed"),
            },

            result = &mut scheduler_task => {
                result.context("Scheduler task panicked")??;
                bail!("Scheduler stopped");
            }
        }
    }
}
