//! Content moderation: local filter plus optional external escalation.
//!
//! [`ModerationGate`] is what the services call. The local
//! [`ModerationFilter`] always runs first and is authoritative for
//! rejection. When an escalation URL is configured, text that passes the
//! local filter is additionally submitted to the external service — but
//! that call fails open: timeout, transport error, or a non-2xx response
//! lets the write proceed. Availability over strictness, by contract.

pub mod filter;

use std::time::Duration;

pub use filter::{ModerationFilter, REJECTION_REASON, Verdict};
use serde::Deserialize;

use crate::error::MarketError;

/// Screening entry point composing the local filter with optional
/// external escalation.
#[derive(Debug)]
pub struct ModerationGate {
    filter: ModerationFilter,
    escalation: Option<Escalation>,
}

#[derive(Debug)]
struct Escalation {
    client: reqwest::Client,
    url: String,
}

/// Response body expected from the external moderation service.
#[derive(Debug, Deserialize)]
struct EscalationResponse {
    #[serde(default)]
    flagged: bool,
}

impl ModerationGate {
    /// Creates a gate with no external escalation.
    #[must_use]
    pub fn new(filter: ModerationFilter) -> Self {
        Self {
            filter,
            escalation: None,
        }
    }

    /// Enables escalation to an external moderation service with a
    /// bounded per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if the HTTP client cannot be
    /// constructed.
    pub fn with_escalation(mut self, url: String, timeout: Duration) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MarketError::Internal(format!("moderation client: {e}")))?;
        self.escalation = Some(Escalation { client, url });
        Ok(self)
    }

    /// Screens free text before it is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::ModerationRejected`] when the local filter
    /// matches, or when the external service responds `flagged`. An
    /// unreachable or erroring external service is logged and treated as
    /// safe.
    pub async fn screen(&self, text: &str) -> Result<(), MarketError> {
        let verdict = self.filter.review(text);
        if !verdict.safe {
            let reason = verdict
                .reason
                .unwrap_or_else(|| REJECTION_REASON.to_string());
            return Err(MarketError::ModerationRejected(reason));
        }

        if let Some(escalation) = &self.escalation {
            match escalation.flagged(text).await {
                Ok(true) => {
                    return Err(MarketError::ModerationRejected(
                        REJECTION_REASON.to_string(),
                    ));
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "external moderation unavailable; failing open");
                }
            }
        }
        Ok(())
    }
}

impl Escalation {
    async fn flagged(&self, text: &str) -> Result<bool, reqwest::Error> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?
            .error_for_status()?;
        let body: EscalationResponse = response.json().await?;
        Ok(body.flagged)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn rejection_carries_the_generic_reason() {
        let gate = ModerationGate::new(ModerationFilter::new());
        let result = tokio_test::block_on(gate.screen("n1gg3r"));
        let Err(MarketError::ModerationRejected(reason)) = result else {
            panic!("expected rejection");
        };
        assert_eq!(reason, REJECTION_REASON);
    }

    #[tokio::test]
    async fn clean_text_passes() {
        let gate = ModerationGate::new(ModerationFilter::new());
        assert!(gate.screen("hello world").await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_escalation_fails_open() {
        // Nothing listens on this port; the gate must treat the
        // transport error as safe.
        let gate = ModerationGate::new(ModerationFilter::new())
            .with_escalation(
                "http://127.0.0.1:9/moderate".to_string(),
                Duration::from_millis(200),
            )
            .ok();
        let Some(gate) = gate else {
            panic!("gate construction failed");
        };
        assert!(gate.screen("perfectly fine trade note").await.is_ok());
    }

    #[tokio::test]
    async fn local_filter_rejects_before_escalation_runs() {
        let gate = ModerationGate::new(ModerationFilter::new())
            .with_escalation(
                "http://127.0.0.1:9/moderate".to_string(),
                Duration::from_millis(200),
            )
            .ok();
        let Some(gate) = gate else {
            panic!("gate construction failed");
        };
        assert!(gate.screen("n-i-g-g-e-r").await.is_err());
    }
}
