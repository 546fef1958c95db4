use crate::cache::RiskCache;
use crate::config::ScanOptions;
use crate::features::extract_features;
use crate::guard::NavigationGuard;
use crate::heuristics::heuristic_score;
use crate::remote::RemoteClassifier;
use crate::storage::{Storage, KEY_ENABLED, KEY_OPTIONS, KEY_SCAN_STATS};
use crate::verdict::{Label, Verdict};
use serde::{Deserialize, Serialize};
use url::Url;

/// Resolve a URL to its absolute form, joining relative references against
/// the optional base. Case is preserved for display. Returns None when the
/// string cannot be made absolute.
pub fn resolve_url(raw: &str, base: Option<&Url>) -> Option<Url> {
    match Url::parse(raw) {
        Ok(parsed) => Some(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok(),
        Err(_) => None,
    }
}

/// Normalize a URL to its absolute, lowercased form for matching.
pub fn normalize_url(raw: &str, base: Option<&Url>) -> Option<String> {
    resolve_url(raw, base).map(|parsed| parsed.to_string().to_lowercase())
}

/// One hyperlink from the scanned page, in document order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Link {
    pub href: String,
    /// Set when the link sits inside navigation chrome (nav/header/footer);
    /// such links are skipped when the corresponding option is enabled.
    #[serde(default)]
    pub navigational: bool,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            navigational: false,
        }
    }
}

/// Counters summarizing one page scan, emitted for UI consumption. Phishing
/// and suspicious verdicts both land in `suspicious`; everything else
/// (including unknown, which renders neutral) lands in `safe`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    pub total: u32,
    pub safe: u32,
    pub suspicious: u32,
}

/// Presence-only transport check for the manual-check path. Not certificate
/// validation; a reachable HTTPS endpoint is assumed valid.
pub fn transport_check(url: &str) -> Verdict {
    if url.to_lowercase().starts_with("https://") {
        Verdict {
            label: Label::Legitimate,
            score: 0.0,
        }
    } else {
        Verdict {
            label: Label::Suspicious,
            score: 0.7,
        }
    }
}

/// Orchestrator for link classification. One instance per page context; it
/// exclusively owns the session cache and the page's navigation guard, so no
/// ambient state survives a reload.
pub struct Pipeline {
    options: ScanOptions,
    cache: RiskCache,
    remote: RemoteClassifier,
    storage: Storage,
    guard: NavigationGuard,
}

impl Pipeline {
    pub fn new(storage: Storage, remote: RemoteClassifier) -> Self {
        Self {
            options: ScanOptions::default(),
            cache: RiskCache::new(storage.clone()),
            remote,
            storage,
            guard: NavigationGuard::new(),
        }
    }

    /// Load the durable block set and the options record. Called at scan
    /// start; manual checks that bypass `scan` should call it first too.
    pub async fn load_state(&mut self) {
        self.cache.load().await;
        match self.storage.get::<ScanOptions>(KEY_OPTIONS).await {
            Ok(Some(options)) => self.options = options,
            Ok(None) => self.options = ScanOptions::default(),
            Err(e) => {
                log::warn!("Failed to load options, using defaults: {e}");
                self.options = ScanOptions::default();
            }
        }
    }

    /// Classify a URL. Never fails: every error path degrades to a verdict.
    ///
    /// Decision order, first match wins:
    /// 1. heuristic score, returned immediately unless legitimate (no I/O);
    /// 2. session cache hit, returned unchanged;
    /// 3. durable block set membership, authoritative;
    /// 4. feature extraction failure, unknown;
    /// 5. remote classification, best effort.
    pub async fn classify(&mut self, url: &str) -> Verdict {
        self.classify_with_base(url, None).await
    }

    /// Classify a link href, resolving relative references against the page
    /// base before any scoring or lookup. Same decision order as
    /// [`Pipeline::classify`].
    pub async fn classify_with_base(&mut self, url: &str, base: Option<&Url>) -> Verdict {
        let target = match resolve_url(url, base) {
            Some(absolute) => absolute.to_string(),
            None => url.to_string(),
        };
        let key = target.to_lowercase();

        // Cheap, synchronous signals first. An unknown verdict here means
        // the URL did not even resolve, which no later stage can improve on.
        let heuristic = heuristic_score(&target, &self.options);
        if heuristic.label != Label::Legitimate {
            log::debug!(
                "Heuristic verdict for {target}: {} ({:.2})",
                heuristic.label,
                heuristic.score
            );
            self.cache.record(&key, heuristic).await;
            return heuristic;
        }

        if let Some(cached) = self.cache.session_get(&key) {
            log::debug!("Session cache hit for {target}: {}", cached.label);
            return cached;
        }

        if self.cache.is_blocked(&key) {
            log::debug!("Durable block set hit for {target}");
            let verdict = Verdict::blocked();
            self.cache.record(&key, verdict).await;
            return verdict;
        }

        let features = match extract_features(&target) {
            Ok(features) => features,
            Err(e) => {
                log::debug!("Feature extraction failed for {target}: {e}");
                let verdict = Verdict::unknown();
                self.cache.record(&key, verdict).await;
                return verdict;
            }
        };

        let verdict = self.remote.classify(&features).await;
        self.cache.record(&key, verdict).await;
        verdict
    }

    /// Scan a page's links in document order, resolving relative hrefs
    /// against the page base. Returns None without touching anything when
    /// scanning is disabled. Arms the navigation guard with a block-set
    /// snapshot, classifies every non-filtered link, persists the stats,
    /// and returns them.
    pub async fn scan(&mut self, links: &[Link], base: Option<&Url>) -> Option<ScanStats> {
        let enabled = self
            .storage
            .get::<bool>(KEY_ENABLED)
            .await
            .unwrap_or_else(|e| {
                log::warn!("Failed to read enabled flag: {e}");
                None
            })
            .unwrap_or(false);
        if !enabled {
            log::debug!("Scanning disabled, skipping {} links", links.len());
            return None;
        }

        self.load_state().await;

        // Snapshot handoff happens before classification; URLs blocklisted
        // during this scan are picked up by the next one.
        self.guard.arm(self.cache.blocklist_snapshot());

        let mut stats = ScanStats::default();
        for link in links {
            if self.options.flag_navigation_links && link.navigational {
                continue;
            }
            stats.total += 1;

            let verdict = self.classify_with_base(&link.href, base).await;
            match verdict.label {
                Label::Phishing | Label::Suspicious => stats.suspicious += 1,
                Label::Legitimate | Label::Unknown => stats.safe += 1,
            }
        }

        if let Err(e) = self.storage.set(KEY_SCAN_STATS, &stats).await {
            log::warn!("Failed to persist scan stats: {e}");
        }
        log::info!(
            "Scan complete: {} links, {} safe, {} suspicious",
            stats.total,
            stats.safe,
            stats.suspicious
        );

        Some(stats)
    }

    /// User-initiated clear of the durable block set.
    pub async fn clear_blocklist(&mut self) {
        self.cache.clear_blocklist().await;
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    pub fn remote(&self) -> &RemoteClassifier {
        &self.remote
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }
}
