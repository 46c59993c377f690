//! # triage-rs
//!
//! Review queue over stage directories. Items are files named by numeric ID
//! under `review/`, `accept/` or `reject/`; a concurrency-safe stage index
//! tracks which stage holds each ID, and a single serialized move processor
//! applies accept/reject decisions to the index and the filesystem.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod http;
pub mod index;
pub mod model;
pub mod storage;
pub mod telemetry;
