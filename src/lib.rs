//! lobcast: Real-time distribution pipeline for order book predictions
//!
//! This library provides the core components for:
//! - Periodic order-book snapshot ingestion from the exchange depth endpoint
//! - A FIFO work queue decoupling ingestion from the prediction worker
//! - A WebSocket broadcaster draining prediction results to viewers
//! - A resilient subscriber client with reconnection and bounded history
//! - Structured logging and Prometheus metrics
//!
//! The prediction computation itself is an external collaborator reachable
//! only through the queue's message contract.

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod market;
pub mod poller;
pub mod prediction;
pub mod queue;
pub mod subscriber;
pub mod telemetry;
