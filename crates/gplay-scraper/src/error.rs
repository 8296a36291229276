use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// Caller input rejected before any request was issued.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// A load-bearing field, delimiter or sentinel path was missing from an
    /// otherwise successful response.
    #[error("could not extract {field}: {reason}")]
    Parse { field: &'static str, reason: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("pagination limit reached: exceeded {max_pages} pages")]
    PaginationLimit { max_pages: usize },
}

impl ScraperError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Parse {
            field,
            reason: reason.into(),
        }
    }

    /// `true` for failures raised by the fetch collaborator.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::RateLimited { .. }
                | Self::NotFound { .. }
                | Self::UnexpectedStatus { .. }
        )
    }

    /// `true` when the response arrived but its shape did not match what the
    /// extractors expect.
    #[must_use]
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Deserialize { .. })
    }
}
