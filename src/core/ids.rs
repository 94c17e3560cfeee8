//! Identifier generation for new expenses.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use uuid::Uuid;

/// Produces identifiers for newly added expenses.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Base-36 millisecond timestamp followed by a 5 character random suffix.
///
/// Uniqueness is probabilistic; nothing checks the repository for collisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeRandomIds;

impl IdGenerator for TimeRandomIds {
    fn next_id(&self) -> String {
        let millis = Utc::now().timestamp_millis().max(0) as u128;
        let random = to_base36(Uuid::new_v4().as_u128());
        let suffix: String = random.chars().take(5).collect();
        format!("{}{}", to_base36(millis), suffix)
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... identifiers.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("exp")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".into();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
