//! Event-driven rating processor for marathon matches.
//!
//! Consumes contest-lifecycle events from Kafka, decides which of them close
//! a ratable round, runs the Qubits rating update over the round's attendees
//! and persists the new rating tuples in one logical commit per engine pass.

pub mod api;
pub mod config;
pub mod database;
pub mod health;
pub mod messaging;
pub mod model;
pub mod processor;
pub mod utils;
