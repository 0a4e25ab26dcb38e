//! Classified failures of a single backend call.
//!
//! Every driven port that talks to the backend reports failures through
//! [`RequestError`], so services can branch on the failure kind without
//! knowing which transport produced it.

use std::time::Duration;

use super::define_port_error;

define_port_error! {
    /// Why one backend call did not produce usable data.
    pub enum RequestError {
        /// The deadline elapsed before a response arrived; the call was cancelled.
        Timeout { timeout_ms: u64 } =>
            "request timed out after {timeout_ms}ms",
        /// The backend answered with a non-success status.
        Http { status: u16, body: String } =>
            "backend responded with HTTP {status}: {body}",
        /// The call never reached the backend.
        Transport { message: String } =>
            "backend transport failed: {message}",
        /// A success response did not match the expected payload.
        Decode { message: String } =>
            "backend response could not be decoded: {message}",
    }
}

impl RequestError {
    /// Build a [`RequestError::Timeout`] from the configured deadline.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    ///
    /// use client::domain::ports::RequestError;
    ///
    /// let err = RequestError::timed_out_after(Duration::from_secs(2));
    /// assert_eq!(err, RequestError::timeout(2_000_u64));
    /// ```
    pub fn timed_out_after(deadline: Duration) -> Self {
        Self::timeout(u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX))
    }

    /// Return whether the backend may have applied the call anyway.
    ///
    /// A timed-out mutation has an unknown outcome: the backend may have
    /// committed it before the client gave up. Callers re-query state before
    /// assuming it failed.
    pub fn is_outcome_unknown(&self) -> bool {
        self.is_timeout()
    }

    /// HTTP status carried by the error, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::timeout(RequestError::timeout(50_u64), true)]
    #[case::http(RequestError::http(500_u16, "boom"), false)]
    #[case::transport(RequestError::transport("refused"), false)]
    #[case::decode(RequestError::decode("not json"), false)]
    fn only_timeouts_leave_the_outcome_unknown(#[case] error: RequestError, #[case] unknown: bool) {
        assert_eq!(error.is_outcome_unknown(), unknown);
    }

    #[test]
    fn timeout_message_carries_the_configured_duration() {
        let error = RequestError::timed_out_after(Duration::from_millis(120_000));
        assert_eq!(error.to_string(), "request timed out after 120000ms");
    }

    #[test]
    fn http_errors_expose_their_status() {
        assert_eq!(RequestError::http(404_u16, "").status(), Some(404));
        assert_eq!(RequestError::transport("reset").status(), None);
    }
}
