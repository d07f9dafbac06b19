//! Process-wide identifier generation.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates an opaque hex identifier: 12 random bytes followed by 4 bytes
/// of a monotonically increasing counter.
///
/// The counter keeps IDs unique within the process even if the entropy
/// source fails (in which case only the counter is rendered); the random
/// block keeps them unpredictable and unique across restarts. Never fails
/// and is safe under unbounded concurrent calls.
pub fn new_id() -> String {
    let count = COUNTER.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

    let mut buf = [0u8; 12];
    if OsRng.try_fill_bytes(&mut buf).is_err() {
        return format!("{count:08x}");
    }

    let mut id = String::with_capacity(32);
    for byte in buf.iter().chain(count.to_be_bytes()[4..].iter()) {
        let _ = write!(id, "{byte:02x}");
    }
    id
}
