pub mod cache;
pub mod config;
pub mod error;
pub mod features;
pub mod guard;
pub mod heuristics;
pub mod pipeline;
pub mod remote;
pub mod storage;
pub mod verdict;

pub use cache::RiskCache;
pub use config::{Config, ScanOptions};
pub use error::{ClassifyError, StorageError};
pub use features::{extract_features, FeatureVector};
pub use guard::{GuardDecision, NavigationGuard, NavigationKind};
pub use heuristics::heuristic_score;
pub use pipeline::{normalize_url, resolve_url, transport_check, Link, Pipeline, ScanStats};
pub use remote::RemoteClassifier;
pub use storage::Storage;
pub use verdict::{Label, Verdict};
