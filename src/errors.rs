//! Error taxonomy for the tracker
//!
//! A failed fetch aborts the current refresh tick and leaves all persisted
//! state untouched; a failed persistence write downgrades the tick to
//! in-memory only. Neither is fatal to the process.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// Network-level failure reaching the exchange
    #[error("exchange request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Non-2xx response from the exchange with its error body
    #[error("exchange returned {status}: {message}")]
    Exchange { status: u16, message: String },

    /// State store read/write failure
    #[error("persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    /// No credentials configured for a signed endpoint
    #[error("no API credentials found, run 'bintrack init' first")]
    MissingCredentials,
}
