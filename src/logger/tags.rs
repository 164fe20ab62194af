//! Log tags: one per core component, so `--debug-<tag>` can silence a
//! noisy consumer without silencing the rest of the pipeline.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    Feed,
    Consumer,
    Reconciler,
    Store,
    Score,
    Holder,
    Rpc,
    Enrich,
    Budget,
    Config,
    Shutdown,
    System,
    Test,
    Other(String),
}

impl LogTag {
    /// Plain (uncolored) tag name as it appears in the file log and in
    /// `--debug-<tag>` flag matching.
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Feed => "feed".to_string(),
            LogTag::Consumer => "consumer".to_string(),
            LogTag::Reconciler => "reconciler".to_string(),
            LogTag::Store => "store".to_string(),
            LogTag::Score => "score".to_string(),
            LogTag::Holder => "holder".to_string(),
            LogTag::Rpc => "rpc".to_string(),
            LogTag::Enrich => "enrich".to_string(),
            LogTag::Budget => "budget".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Shutdown => "shutdown".to_string(),
            LogTag::System => "system".to_string(),
            LogTag::Test => "test".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Key used to look up `--debug-<tag>` / `--verbose-<tag>` state.
    pub fn to_debug_key(&self) -> String {
        self.to_plain_string()
    }
}

impl fmt::Display for LogTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
