// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for the ledger library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database not initialized. Call init() first.")]
    NotInitialized,

    #[error("Database initialization failed: {0}")]
    InitFailed(String),

    #[error("Settings not initialized")]
    SettingsNotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Import error: {0}")]
    Import(String),
}

impl Error {
    /// True for precondition failures callers are expected to special-case.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::SettingsNotInitialized | Error::NotInitialized)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_setup_counts_as_precondition() {
        assert!(Error::NotInitialized.is_precondition());
        assert!(Error::SettingsNotInitialized.is_precondition());
        assert!(!Error::NotFound("account 'x'".into()).is_precondition());
        assert!(!Error::Import("bad".into()).is_precondition());

        let wrapped = anyhow::Error::from(Error::SettingsNotInitialized).context("settings show");
        assert!(wrapped
            .downcast_ref::<Error>()
            .is_some_and(Error::is_precondition));
    }
}
