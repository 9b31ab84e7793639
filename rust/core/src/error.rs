// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for entity graph access
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading the entity graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity #{0} not found")]
    EntityNotFound(u32),

    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),
}

impl Error {
    /// Create an invalid attribute error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidAttribute(msg.into())
    }
}
