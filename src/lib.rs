//! Barrage - load-generation harness for HTTP inference endpoints
//!
//! This library provides the core pieces of the harness: a pool of ticking
//! bots firing JSON inference payloads at a target URL, shared metrics and
//! journal aggregation, and a terminal dashboard over their snapshots.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod journal;
pub mod metrics;
pub mod recorder;
pub mod samples;
pub mod swarm;
pub mod ui;
