//! mytune-core — shared library for the mytune collector.
//!
//! Provides:
//! - `collector` — connection abstraction, MySQL adapter, knob/metric
//!   collector and permission check
//! - `model` — snapshot and observation data models
//! - `observation` — assembles one collection round
//!
//! With `mysql` feature (default):
//! - `collector::MysqlConnection` — blocking connection via the `mysql` driver
//! - `collector::connect_collector` — connect and build a ready collector

pub mod collector;
pub mod model;
pub mod observation;
