//! Verification of replayed responses against recorded expectations

use crate::model::{Request, Response};
use crate::GophermanError;

/// Collects the errors a verification callback reports for one collection
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<GophermanError>,
}

impl ErrorCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error
    pub fn push(&mut self, error: GophermanError) {
        self.errors.push(error);
    }

    /// Record a verification failure
    pub fn fail(&mut self, message: impl Into<String>) {
        self.errors.push(GophermanError::Verification(message.into()));
    }

    /// Number of collected errors
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing was collected
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collected errors, in report order
    #[must_use]
    pub fn into_errors(self) -> Vec<GophermanError> {
        self.errors
    }
}

/// Stock verifier: the actual status and raw body must equal the expected
/// response. Items recorded without a response only need a success status,
/// which the replay engine has already checked.
pub fn status_and_body(
    errors: &mut ErrorCollector,
    _request: &Request,
    expected: Option<&Response>,
    actual: &Response,
) {
    let Some(expected) = expected else {
        return;
    };

    if expected.status != actual.status {
        errors.fail(format!(
            "status mismatch: expected {}, got {}",
            expected.status, actual.status
        ));
    }

    if expected.raw != actual.raw {
        errors.fail(format!(
            "body mismatch: expected {:?}, got {:?}",
            expected.raw, actual.raw
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_body_match() {
        let mut errors = ErrorCollector::new();
        let expected = Response::raw(b"ok", 200);
        status_and_body(&mut errors, &Request::default(), Some(&expected), &expected.clone());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_status_and_body_mismatch() {
        let mut errors = ErrorCollector::new();
        let expected = Response::raw(b"ok", 201);
        let actual = Response::raw(b"nope", 200);
        status_and_body(&mut errors, &Request::default(), Some(&expected), &actual);

        let errors = errors.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, GophermanError::Verification(_))));
    }

    #[test]
    fn test_status_and_body_without_expectation() {
        let mut errors = ErrorCollector::new();
        status_and_body(
            &mut errors,
            &Request::default(),
            None,
            &Response::raw(b"anything", 200),
        );
        assert!(errors.is_empty());
    }
}
