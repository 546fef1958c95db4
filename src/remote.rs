use crate::error::ClassifyError;
use crate::features::FeatureVector;
use crate::verdict::Verdict;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Client for the external scoring endpoint. Best-effort enrichment only:
/// a single POST per classification, no retry, and every failure collapses
/// to an unknown verdict rather than surfacing to the caller.
#[derive(Debug)]
pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    requests: AtomicU64,
}

impl RemoteClassifier {
    pub fn new(endpoint: &str, timeout_seconds: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("linkshield/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            requests: AtomicU64::new(0),
        })
    }

    /// Send the feature vector for scoring. Network failures, non-success
    /// statuses and malformed response bodies all yield the unknown verdict.
    pub async fn classify(&self, features: &FeatureVector) -> Verdict {
        match self.exchange(features).await {
            Ok(verdict) => verdict,
            Err(e) => {
                log::debug!("Remote classification unavailable: {e}");
                Verdict::unknown()
            }
        }
    }

    async fn exchange(&self, features: &FeatureVector) -> Result<Verdict, ClassifyError> {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "features": features }))
            .send()
            .await
            .map_err(|e| ClassifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Network(format!(
                "scoring endpoint returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClassifyError::Network(e.to_string()))?;
        parse_response(&body)
    }

    /// Number of requests issued so far. Used to verify that cached and
    /// heuristic-decided URLs never reach the network.
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

/// Strict decode of a scoring response. A body missing label or score, or
/// carrying a score outside [0.0, 1.0], is rejected, never defaulted. The
/// endpoint applies its own labeling threshold, so a label that disagrees
/// with the local thresholds is taken as returned.
fn parse_response(body: &str) -> Result<Verdict, ClassifyError> {
    let verdict: Verdict = serde_json::from_str(body)
        .map_err(|e| ClassifyError::Network(format!("malformed response: {e}")))?;
    if !(0.0..=1.0).contains(&verdict.score) {
        return Err(ClassifyError::Network(format!(
            "score {} out of range",
            verdict.score
        )));
    }
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::verdict::Label;

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_unknown() {
        // Nothing listens on port 9; connection fails immediately
        let remote = RemoteClassifier::new("http://127.0.0.1:9/predict", 1).unwrap();
        let features = extract_features("https://example.com/").unwrap();

        let verdict = remote.classify(&features).await;
        assert_eq!(verdict.label, Label::Unknown);
        assert_eq!(verdict.score, 0.0);
        assert_eq!(remote.request_count(), 1);
    }

    #[test]
    fn test_strict_response_decode() {
        let ok = parse_response("{\"label\":\"phishing\",\"score\":0.92}");
        assert_eq!(ok.unwrap().label, Label::Phishing);

        // Extra fields are tolerated, missing required fields are not
        assert!(parse_response("{\"label\":\"legitimate\",\"score\":0.1,\"model\":\"rf\"}").is_ok());
        assert!(parse_response("{\"label\":\"phishing\"}").is_err());
        assert!(parse_response("{\"score\":0.9}").is_err());
        assert!(parse_response("{\"label\":\"malicious\",\"score\":0.9}").is_err());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        assert!(parse_response("{\"label\":\"phishing\",\"score\":1.5}").is_err());
        assert!(parse_response("{\"label\":\"legitimate\",\"score\":-0.2}").is_err());
        assert!(parse_response("{\"label\":\"phishing\",\"score\":1.0}").is_ok());
        assert!(parse_response("{\"label\":\"legitimate\",\"score\":0.0}").is_ok());
    }

    #[test]
    fn test_endpoint_threshold_trusted_for_label() {
        // The scoring service labels at its own cutoff; a phishing label at
        // 0.55 is a valid response and passes through unchanged
        let verdict = parse_response("{\"label\":\"phishing\",\"score\":0.55}").unwrap();
        assert_eq!(verdict.label, Label::Phishing);
        assert_eq!(verdict.score, 0.55);
    }
}
