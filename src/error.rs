use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("configuration: {0}")]
    Configuration(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuditError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Configuration(_) => 500,
            Self::InvalidInput(_) => 400,
            Self::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── http_status: exhaustive variant coverage ──────────────────

    #[test]
    fn http_status_not_found() {
        assert_eq!(AuditError::NotFound("x".into()).http_status(), 404);
    }

    #[test]
    fn http_status_configuration() {
        assert_eq!(AuditError::Configuration("x".into()).http_status(), 500);
    }

    #[test]
    fn http_status_invalid_input() {
        assert_eq!(AuditError::InvalidInput("x".into()).http_status(), 400);
    }

    #[test]
    fn http_status_internal() {
        let err = AuditError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.http_status(), 500);
    }

    // ── Display impl ─────────────────────────────────────────────

    #[test]
    fn display_not_found() {
        let e = AuditError::NotFound("batch 42".into());
        assert_eq!(e.to_string(), "not found: batch 42");
    }

    #[test]
    fn display_configuration() {
        let e = AuditError::Configuration("unknown processor 'x'".into());
        assert_eq!(e.to_string(), "configuration: unknown processor 'x'");
    }

    #[test]
    fn display_invalid_input() {
        let e = AuditError::InvalidInput("bad filter".into());
        assert_eq!(e.to_string(), "invalid input: bad filter");
    }

    #[test]
    fn display_internal() {
        let e = AuditError::Internal(anyhow::anyhow!("segfault"));
        assert_eq!(e.to_string(), "internal: segfault");
    }
}
