use crate::pipeline::normalize_url;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Uninitialized,
    Armed,
}

/// Navigation attempts the guard intercepts while armed. Link activations
/// come from the content-script context; the window/history variants are the
/// programmatic calls hooked in the page-script context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    LinkClick,
    AuxiliaryClick,
    WindowOpen,
    HistoryPush,
    HistoryReplace,
}

impl NavigationKind {
    fn as_str(&self) -> &'static str {
        match self {
            NavigationKind::LinkClick => "click",
            NavigationKind::AuxiliaryClick => "auxclick",
            NavigationKind::WindowOpen => "window.open",
            NavigationKind::HistoryPush => "history.pushState",
            NavigationKind::HistoryReplace => "history.replaceState",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allowed,
    /// The attempt is cancelled and this warning is surfaced to the user.
    Blocked { warning: String },
}

/// Interception layer for link activation and programmatic navigation.
///
/// Per page load the guard moves Uninitialized → Armed when a block-set
/// snapshot is installed at scan time, and back on unload. The snapshot is a
/// one-way, point-in-time copy: URLs blocklisted after it was taken are not
/// retroactively blocked until the next scan re-arms the guard. While
/// uninitialized every attempt is allowed (fail open, accepted gap).
#[derive(Debug)]
pub struct NavigationGuard {
    state: GuardState,
    snapshot: HashSet<String>,
}

impl NavigationGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Uninitialized,
            snapshot: HashSet::new(),
        }
    }

    /// Install a block-set snapshot and arm the guard. Keys are expected in
    /// normalized lowercase form, as produced by the risk cache.
    pub fn arm(&mut self, snapshot: HashSet<String>) {
        log::debug!("Navigation guard armed with {} URLs", snapshot.len());
        self.snapshot = snapshot;
        self.state = GuardState::Armed;
    }

    /// Page unload: drop the snapshot and return to Uninitialized.
    pub fn disarm(&mut self) {
        self.snapshot.clear();
        self.state = GuardState::Uninitialized;
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == GuardState::Armed
    }

    /// Decide on one navigation attempt. The target is normalized before the
    /// membership check; unparseable targets fall back to lowercase string
    /// matching and otherwise proceed unmodified.
    pub fn check(&self, kind: NavigationKind, target: &str) -> GuardDecision {
        if self.state == GuardState::Uninitialized {
            return GuardDecision::Allowed;
        }

        let key = normalize_url(target, None).unwrap_or_else(|| target.to_lowercase());
        if self.snapshot.contains(&key) {
            log::warn!("Blocked {} navigation to {target}", kind.as_str());
            return GuardDecision::Blocked {
                warning: format!("Blocked potential phishing link: {target}"),
            };
        }
        GuardDecision::Allowed
    }

    /// Serialize the snapshot for the one-time handoff into the page's own
    /// execution context. Sorted so repeated exports are byte-stable.
    pub fn snapshot_json(&self) -> String {
        let mut urls: Vec<&String> = self.snapshot.iter().collect();
        urls.sort();
        serde_json::to_string(&urls).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new()
    }
}
