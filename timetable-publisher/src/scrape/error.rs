//! Scraper error types.

/// Errors that can occur when fetching or reading a schedule page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("schedule page returned status {status}")]
    Status { status: u16 },

    /// Page has no schedule container
    #[error("schedule table not found on page")]
    MissingSchedule,

    /// Schedule container has no recognisable day-type sections
    #[error("no day-type sections found in schedule table")]
    NoDayTypes,

    /// A CSS selector failed to compile
    #[error("invalid selector {selector}: {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ScrapeError::Status { status: 503 };
        assert_eq!(err.to_string(), "schedule page returned status 503");

        let err = ScrapeError::MissingSchedule;
        assert_eq!(err.to_string(), "schedule table not found on page");
    }
}
