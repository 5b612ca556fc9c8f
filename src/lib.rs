//! Telemetry cadence and command loop for a connected sensor node.
//!
//! A [`scheduler::CadenceScheduler`] samples sensor groups round-robin and
//! publishes them through a [`gateway::PublishGateway`]. Inbound commands and
//! desired-property updates run concurrently and reach the scheduler only
//! through the [`property::PropertyStore`] and a [`scheduler::WakeSignal`].

pub mod command;
pub mod config;
pub mod connection;
pub mod gateway;
pub mod peripherals;
pub mod property;
pub mod router;
pub mod scheduler;
pub mod sensor;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod testing;
