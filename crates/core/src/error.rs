use crate::types::Arch;
use std::collections::TryReserveError;

/// Errors that can occur while building a capability description.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("out of memory: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("cannot load capabilities '{name}' for {arch}: {reason}")]
    Probe {
        name: String,
        arch: Arch,
        reason: String,
    },

    #[error("machine type '{machine}' is not supported by '{emulator}' on {arch}")]
    Resolution {
        machine: String,
        emulator: String,
        arch: Arch,
    },

    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
