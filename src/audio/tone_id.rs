use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static ISSUED: AtomicU64 = AtomicU64::new(0);

/// Process-wide handle for one scheduled tone, shared by the channel registry
/// and the driver's log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ToneId(pub u64);

impl ToneId {
    // ids only need to be distinct, not ordered across threads
    pub fn next() -> Self {
        ToneId(ISSUED.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ToneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tone#{}", self.0)
    }
}
