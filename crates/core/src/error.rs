use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AlivenError {
    #[error("invalid value: {0}")]
    InvalidValue(#[from] aliven_types::TypeError),

    #[error("invalid deployment mode: {0} (expected \"local\" or \"hosted\")")]
    InvalidDeploymentMode(String),
    #[error("invalid duration in seconds: {0}")]
    InvalidDuration(String),

    #[error("failed to read draft storage: {0}")]
    StorageRead(std::io::Error),
    #[error("failed to write draft storage: {0}")]
    StorageWrite(std::io::Error),
    #[error("draft storage is unavailable")]
    StorageUnavailable,
    #[error("failed to serialize drafts: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize drafts: {0}")]
    Deserialization(serde_json::Error),

    #[error("failed to launch headless browser: {0}")]
    BrowserLaunch(String),
    #[error("failed to open browser page: {0}")]
    PageOpen(String),
    #[error("failed to load export document: {0}")]
    Navigation(String),
    #[error("network did not settle within {0:?}")]
    NetworkIdleTimeout(Duration),
    #[error("failed to print PDF: {0}")]
    Print(String),
    #[error("renderer produced an empty PDF")]
    EmptyDocument,
}

impl AlivenError {
    /// Whether this error came out of the headless rendering pipeline.
    pub fn is_render_failure(&self) -> bool {
        matches!(
            self,
            AlivenError::BrowserLaunch(_)
                | AlivenError::PageOpen(_)
                | AlivenError::Navigation(_)
                | AlivenError::NetworkIdleTimeout(_)
                | AlivenError::Print(_)
                | AlivenError::EmptyDocument
        )
    }
}

pub type AlivenResult<T> = std::result::Result<T, AlivenError>;

#[cfg(test)]
mod tests {
    use super::*;
    use aliven_types::WeekNumber;

    #[test]
    fn test_type_errors_convert() {
        fn week(n: i64) -> AlivenResult<WeekNumber> {
            Ok(WeekNumber::new(n)?)
        }

        let err = week(9).unwrap_err();
        assert!(matches!(err, AlivenError::InvalidValue(_)));
        assert!(!err.is_render_failure());
    }

    #[test]
    fn test_render_failures_are_classified() {
        assert!(AlivenError::NetworkIdleTimeout(Duration::from_secs(30)).is_render_failure());
        assert!(AlivenError::EmptyDocument.is_render_failure());
        assert!(!AlivenError::StorageUnavailable.is_render_failure());
    }
}
