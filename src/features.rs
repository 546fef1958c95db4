use crate::error::ClassifyError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Lexical feature vector derived from a URL string. Pure function of the
/// URL; no network access, no side effects. Field names on the wire match
/// what the scoring endpoint's model was trained against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    #[serde(rename = "NumDots")]
    pub num_dots: u32,
    #[serde(rename = "SubdomainLevel")]
    pub subdomain_level: i32,
    #[serde(rename = "PathLevel")]
    pub path_level: i32,
    #[serde(rename = "UrlLength")]
    pub url_length: u32,
    #[serde(rename = "NumDash")]
    pub num_dash: u32,
    #[serde(rename = "NumDashInHostname")]
    pub num_dash_in_hostname: u32,
    #[serde(rename = "AtSymbol")]
    pub at_symbol: u8,
    #[serde(rename = "NumNumericChars")]
    pub num_numeric_chars: u32,
    #[serde(rename = "NoHttps")]
    pub no_https: u8,
    #[serde(rename = "IpAddress")]
    pub ip_address: u8,
}

/// Extract the lexical feature vector for a URL.
///
/// All counts operate on the lowercased URL string, except the
/// dash-in-hostname count and the IPv4-literal flag, which apply to the
/// hostname only so that digits in paths do not trigger them.
pub fn extract_features(raw_url: &str) -> Result<FeatureVector, ClassifyError> {
    let parsed = Url::parse(raw_url)?;
    let lower = raw_url.to_lowercase();
    let hostname = parsed.host_str().unwrap_or("");

    Ok(FeatureVector {
        num_dots: count_char(&lower, '.'),
        subdomain_level: lower.split('.').count() as i32 - 2,
        path_level: lower.split('/').count() as i32 - 3,
        url_length: lower.chars().count() as u32,
        num_dash: count_char(&lower, '-'),
        num_dash_in_hostname: count_char(hostname, '-'),
        at_symbol: lower.contains('@') as u8,
        num_numeric_chars: lower.chars().filter(|c| c.is_ascii_digit()).count() as u32,
        no_https: !lower.starts_with("https://") as u8,
        ip_address: crate::heuristics::is_ipv4_literal(hostname) as u8,
    })
}

fn count_char(s: &str, c: char) -> u32 {
    s.chars().filter(|&x| x == c).count() as u32
}
