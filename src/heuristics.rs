use crate::config::ScanOptions;
use crate::verdict::Verdict;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

// Substrings that commonly appear in credential-harvesting URLs
const SUSPICIOUS_KEYWORDS: [&str; 15] = [
    "login",
    "signin",
    "verify",
    "secure",
    "update",
    "confirm",
    "account",
    "otp",
    "password",
    "bank",
    "wallet",
    "unlock",
    "auth",
    "subscription",
    "recovery",
];

const KEYWORD_WEIGHT: f64 = 0.4;
const IP_LITERAL_WEIGHT: f64 = 0.25;
const LONG_URL_WEIGHT: f64 = 0.15;
const NO_HTTPS_WEIGHT: f64 = 0.10;
const PUNYCODE_WEIGHT: f64 = 0.20;
const AT_SYMBOL_WEIGHT: f64 = 0.20;

const LONG_URL_THRESHOLD: usize = 80;

lazy_static! {
    static ref IPV4_LITERAL: Regex = Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap();
}

/// Check whether a hostname is a raw IPv4 literal.
pub fn is_ipv4_literal(hostname: &str) -> bool {
    IPV4_LITERAL.is_match(hostname)
}

/// Score a URL with weighted lexical signals.
///
/// Synchronous and side-effect free; this runs on the fast local-decision
/// path and must never block on I/O. The keyword and length signals are
/// gated behind options; the IP-literal, transport, punycode and `@` signals
/// always apply. Weights are not normalized, so the sum can exceed 1.0 and
/// is clamped (intentional).
///
/// Returns an unknown verdict when the URL cannot be parsed.
pub fn heuristic_score(raw_url: &str, options: &ScanOptions) -> Verdict {
    let parsed = match Url::parse(raw_url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Heuristic scoring skipped for unparseable URL {raw_url}: {e}");
            return Verdict::unknown();
        }
    };

    let lower = raw_url.to_lowercase();
    let hostname = parsed.host_str().unwrap_or("").to_lowercase();

    let mut score = 0.0;

    if options.flag_login_keywords && SUSPICIOUS_KEYWORDS.iter().any(|w| lower.contains(w)) {
        score += KEYWORD_WEIGHT;
    }
    if options.flag_long_urls && lower.chars().count() > LONG_URL_THRESHOLD {
        score += LONG_URL_WEIGHT;
    }

    if is_ipv4_literal(&hostname) {
        score += IP_LITERAL_WEIGHT;
    }
    if !lower.starts_with("https://") {
        score += NO_HTTPS_WEIGHT;
    }
    if hostname.contains("xn--") {
        score += PUNYCODE_WEIGHT;
    }
    if lower.contains('@') {
        score += AT_SYMBOL_WEIGHT;
    }

    if score > 1.0 {
        score = 1.0;
    }

    Verdict::from_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::Label;

    #[test]
    fn test_keyword_plus_no_https() {
        let v = heuristic_score("http://example.com/login", &ScanOptions::default());
        assert_eq!(v.label, Label::Suspicious);
        assert!((v.score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_https_weight_is_constant() {
        let opts = ScanOptions::default();
        for (http_url, https_url) in [
            ("http://example.com/", "https://example.com/"),
            ("http://foo.org/page", "https://foo.org/page"),
            ("ftp://example.com/", "https://example.com/"),
        ] {
            let insecure = heuristic_score(http_url, &opts).score;
            let secure = heuristic_score(https_url, &opts).score;
            assert!((insecure - secure - NO_HTTPS_WEIGHT).abs() < 1e-9);
        }
    }

    #[test]
    fn test_score_clamped_to_one() {
        // keyword + ip + long + no-https + @ sums past 1.0
        let url = format!(
            "http://192.168.0.1/login/verify@bank?next={}",
            "a".repeat(60)
        );
        let v = heuristic_score(&url, &ScanOptions::default());
        assert_eq!(v.score, 1.0);
        assert_eq!(v.label, Label::Phishing);
    }

    #[test]
    fn test_punycode_alone_stays_legitimate() {
        let v = heuristic_score("https://xn--80ak6aa92e.com/", &ScanOptions::default());
        assert!((v.score - 0.2).abs() < 1e-9);
        assert_eq!(v.label, Label::Legitimate);
    }

    #[test]
    fn test_option_gating() {
        let url = "http://example.com/login";
        let gated = ScanOptions {
            flag_login_keywords: false,
            ..ScanOptions::default()
        };
        let v = heuristic_score(url, &gated);
        // only the no-https signal remains
        assert!((v.score - 0.1).abs() < 1e-9);
        assert_eq!(v.label, Label::Legitimate);

        let long_url = format!("https://example.com/?q={}", "x".repeat(80));
        let gated = ScanOptions {
            flag_long_urls: false,
            ..ScanOptions::default()
        };
        assert_eq!(heuristic_score(&long_url, &gated).score, 0.0);
    }

    #[test]
    fn test_ungated_signals_ignore_options() {
        let all_off = ScanOptions {
            flag_navigation_links: false,
            flag_long_urls: false,
            flag_login_keywords: false,
        };
        let v = heuristic_score("http://10.0.0.1/", &all_off);
        assert!((v.score - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_ip_literal_host_only() {
        assert!(is_ipv4_literal("192.168.1.1"));
        assert!(!is_ipv4_literal("example.com"));
        assert!(!is_ipv4_literal("1.2.3"));
        // digits in the path must not flag the host
        let v = heuristic_score("https://example.com/1.2.3.4", &ScanOptions::default());
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn test_unparseable_url_is_unknown() {
        let v = heuristic_score("::::not a url::::", &ScanOptions::default());
        assert_eq!(v.label, Label::Unknown);
        assert_eq!(v.score, 0.0);
    }

    #[test]
    fn test_score_always_in_range() {
        let opts = ScanOptions::default();
        let samples = [
            "https://example.com/",
            "http://login.verify.bank@10.0.0.1/xn--whatever",
            "https://a.b.c.d.e.f/deep/path/segments",
            "http://otp-recovery-unlock.example/login/confirm",
        ];
        for url in samples {
            let v = heuristic_score(url, &opts);
            assert!((0.0..=1.0).contains(&v.score), "score out of range for {url}");
        }
    }
}
