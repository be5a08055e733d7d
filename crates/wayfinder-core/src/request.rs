use serde::Deserialize;
use thiserror::Error;

use crate::intent::Role;

/// Maximum query length in characters, after trimming
pub const MAX_QUERY_CHARS: usize = 500;

/// Maximum opaque user id length
pub const MAX_USER_ID_CHARS: usize = 128;

/// Maximum records a caller may request per query
pub const MAX_RECORDS: usize = 50;

/// A malformed request, surfaced before any classification work begins
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("query exceeds {MAX_QUERY_CHARS} characters (got {0})")]
    QueryTooLong(usize),

    #[error("user_id must be 1..={MAX_USER_ID_CHARS} characters")]
    InvalidUserId,

    #[error("max_records must be 1..={MAX_RECORDS} (got {0})")]
    MaxRecordsOutOfRange(usize),
}

/// Per-query caller options
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryOptions {
    /// Skip the optional LLM formatting layer and return structured records
    #[serde(default)]
    pub include_raw: bool,
    /// Cap on returned records
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            include_raw: false,
            max_records: default_max_records(),
        }
    }
}

const fn default_max_records() -> usize {
    5
}

/// An authenticated query as delivered by the transport layer
///
/// `role` and `user_id` arrive already validated by the identity layer;
/// the core only checks shape, never identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRequest {
    pub query: String,
    pub user_id: String,
    pub role: Role,
    #[serde(default)]
    pub partner_id: Option<String>,
    #[serde(default)]
    pub options: QueryOptions,
}

impl QueryRequest {
    /// Trim and validate the request in place
    ///
    /// # Errors
    ///
    /// Returns a `RequestError` when the query is empty after trimming or
    /// over [`MAX_QUERY_CHARS`], the user id is out of shape, or
    /// `max_records` is outside 1..=[`MAX_RECORDS`].
    pub fn validate(mut self) -> Result<Self, RequestError> {
        self.query = self.query.trim().to_owned();

        if self.query.is_empty() {
            return Err(RequestError::EmptyQuery);
        }
        let chars = self.query.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(RequestError::QueryTooLong(chars));
        }

        let id_chars = self.user_id.chars().count();
        if id_chars == 0 || id_chars > MAX_USER_ID_CHARS {
            return Err(RequestError::InvalidUserId);
        }

        if self.options.max_records == 0 || self.options.max_records > MAX_RECORDS {
            return Err(RequestError::MaxRecordsOutOfRange(self.options.max_records));
        }

        Ok(self)
    }
}
