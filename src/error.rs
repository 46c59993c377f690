//! Error types for triage-rs.

use thiserror::Error;

use crate::model::{ItemId, Stage};

#[derive(Debug, Error)]
pub enum Error {
    #[error("item {id} not found in stage {stage}")]
    NotFound { id: ItemId, stage: Stage },

    #[error("invalid stage transition: {from} -> {to}")]
    InvalidTransition { from: Stage, to: Stage },

    #[error("invalid item id: {0:?}")]
    InvalidId(String),

    #[error("unknown stage: {0:?}")]
    UnknownStage(String),

    #[error("move queue is full")]
    QueueFull,

    #[error("move queue is closed")]
    QueueClosed,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the "item is not where you asked for it" condition, as
    /// opposed to I/O or queue failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
