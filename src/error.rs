//! Error types for the Johnny Decimal filing engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or scanning a filing tree.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("not a Johnny Decimal directory: {0}")]
    NotJohnnyDecimalDirectory(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operation-level errors.
///
/// Policy and scope documents never surface here as hard failures: a
/// malformed document degrades to "absent" inside those subsystems. The
/// only hard stops besides I/O are scope denial and destination conflicts.
#[derive(Debug, Error)]
pub enum OpError {
    #[error("{0} not found")]
    AddressNotFound(String),

    #[error("destination already exists: {0}")]
    DestinationConflict(PathBuf),

    #[error("category {0:02} is full — no sequence numbers 1-99 free")]
    CategoryFull(u8),

    #[error("area {0:02}-{1:02} is full — no category numbers free")]
    AreaFull(u8, u8),

    #[error("out of scope: {0}")]
    OutOfScope(String),

    #[error("{0}")]
    InvalidTarget(String),

    #[error(
        "cannot restore — {address} already exists\n  archived: {archived} ({archived_items} items)\n  current:  {existing} ({existing_items} items)"
    )]
    RestoreConflict {
        address: String,
        archived: PathBuf,
        existing: PathBuf,
        archived_items: usize,
        existing_items: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
