use serde::{Deserialize, Serialize};

/// Score at or above which a verdict is labeled phishing.
pub const PHISHING_THRESHOLD: f64 = 0.7;
/// Score at or above which a verdict is labeled suspicious.
pub const SUSPICIOUS_THRESHOLD: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Legitimate,
    Suspicious,
    Phishing,
    /// Classification could not complete (parse failure, network failure).
    /// Rendered neutral, never treated as safe.
    Unknown,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Legitimate => write!(f, "legitimate"),
            Label::Suspicious => write!(f, "suspicious"),
            Label::Phishing => write!(f, "phishing"),
            Label::Unknown => write!(f, "unknown"),
        }
    }
}

/// Result of any classification stage: a label plus a risk score in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub score: f64,
}

impl Verdict {
    /// Derive the label from a score under the fixed thresholds.
    pub fn from_score(score: f64) -> Self {
        let label = if score >= PHISHING_THRESHOLD {
            Label::Phishing
        } else if score >= SUSPICIOUS_THRESHOLD {
            Label::Suspicious
        } else {
            Label::Legitimate
        };
        Verdict { label, score }
    }

    /// Verdict for a URL that could not be classified.
    pub fn unknown() -> Self {
        Verdict {
            label: Label::Unknown,
            score: 0.0,
        }
    }

    /// Authoritative verdict for a member of the durable block set.
    pub fn blocked() -> Self {
        Verdict {
            label: Label::Phishing,
            score: 1.0,
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_mapping() {
        assert_eq!(Verdict::from_score(0.0).label, Label::Legitimate);
        assert_eq!(Verdict::from_score(0.29).label, Label::Legitimate);
        assert_eq!(Verdict::from_score(0.3).label, Label::Suspicious);
        assert_eq!(Verdict::from_score(0.69).label, Label::Suspicious);
        assert_eq!(Verdict::from_score(0.7).label, Label::Phishing);
        assert_eq!(Verdict::from_score(1.0).label, Label::Phishing);
    }

    #[test]
    fn test_label_serialization() {
        let verdict = Verdict::from_score(0.85);
        let json = serde_json::to_string(&verdict).unwrap();
        assert!(json.contains("\"label\":\"phishing\""));

        let parsed: Verdict = serde_json::from_str("{\"label\":\"unknown\",\"score\":0}").unwrap();
        assert_eq!(parsed.label, Label::Unknown);
    }
}
