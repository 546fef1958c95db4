use crate::storage::{Storage, KEY_BLOCKLIST};
use crate::verdict::Verdict;
use std::collections::{HashMap, HashSet};

/// Two-tier verdict cache owned by a single pipeline instance.
///
/// The session tier maps URL keys to the last-computed verdict and lives only
/// as long as the page context. The durable tier is the cross-session block
/// set of confirmed-phishing URLs, persisted through [`Storage`] and shared
/// across contexts. Membership in the durable set is authoritative: a lookup
/// hit there always yields `{phishing, 1.0}` regardless of any recomputed
/// score.
#[derive(Debug)]
pub struct RiskCache {
    session: HashMap<String, Verdict>,
    blocked: HashSet<String>,
    storage: Storage,
    loaded: bool,
}

impl RiskCache {
    pub fn new(storage: Storage) -> Self {
        Self {
            session: HashMap::new(),
            blocked: HashSet::new(),
            storage,
            loaded: false,
        }
    }

    /// Load the durable block set. Until this completes the set is treated
    /// as empty, so early lookups fail open rather than blocking on storage.
    /// A read failure degrades to heuristic-only protection for this page.
    pub async fn load(&mut self) {
        match self.storage.get::<Vec<String>>(KEY_BLOCKLIST).await {
            Ok(Some(urls)) => {
                self.blocked = urls.into_iter().collect();
                log::debug!("Loaded {} blocklisted URLs", self.blocked.len());
            }
            Ok(None) => {
                self.blocked = HashSet::new();
            }
            Err(e) => {
                log::warn!("Failed to load block set, treating as empty: {e}");
                self.blocked = HashSet::new();
            }
        }
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Look up a normalized URL key: session cache first, then the durable
    /// block set, which short-circuits to the authoritative verdict.
    pub fn lookup(&self, key: &str) -> Option<Verdict> {
        if let Some(verdict) = self.session.get(key) {
            return Some(*verdict);
        }
        if self.blocked.contains(key) {
            return Some(Verdict::blocked());
        }
        None
    }

    pub fn session_get(&self, key: &str) -> Option<Verdict> {
        self.session.get(key).copied()
    }

    pub fn is_blocked(&self, key: &str) -> bool {
        self.blocked.contains(key)
    }

    /// Record a verdict. The session cache is always updated; the URL is
    /// additionally persisted into the durable block set iff the verdict is
    /// phishing and not already a member (re-adding is a no-op). Persistence
    /// failure is logged and swallowed: losing the durable record only
    /// degrades future-page protection, not current-page correctness.
    pub async fn record(&mut self, key: &str, verdict: Verdict) {
        self.session.insert(key.to_string(), verdict);

        if verdict.is_phishing() && !self.blocked.contains(key) {
            self.blocked.insert(key.to_string());
            let urls: Vec<&String> = self.blocked.iter().collect();
            if let Err(e) = self.storage.set(KEY_BLOCKLIST, &urls).await {
                log::warn!("Failed to persist blocklisted URL {key}: {e}");
            }
        }
    }

    /// User-initiated clear of the durable block set. The session cache is
    /// untouched; already-computed verdicts for this page stand.
    pub async fn clear_blocklist(&mut self) {
        self.blocked.clear();
        if let Err(e) = self.storage.remove(KEY_BLOCKLIST).await {
            log::warn!("Failed to clear persisted block set: {e}");
        }
    }

    /// Point-in-time copy of the durable block set for the page-context
    /// handoff. Later insertions do not update it.
    pub fn blocklist_snapshot(&self) -> HashSet<String> {
        self.blocked.clone()
    }
}
