// SPDX-FileCopyrightText: 2026 Gramgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unique-token generation for client identifiers and storage keys.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Source of opaque unique tokens.
///
/// Injected wherever a token is needed so tests can substitute a
/// deterministic implementation.
pub trait TokenGenerator: Send + Sync {
    /// Returns a new token, unique across the process lifetime.
    fn generate(&self) -> String;
}

/// Default generator: SHA-256 over the current nanosecond timestamp and a
/// monotonically increasing counter. The counter makes concurrent calls
/// within one timer tick produce distinct tokens.
#[derive(Debug, Default)]
pub struct SequencedTokenGenerator {
    counter: AtomicU32,
}

impl SequencedTokenGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenGenerator for SequencedTokenGenerator {
    fn generate(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let digest = Sha256::digest(format!("{nanos}{seq}").as_bytes());
        hex::encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_hex() {
        let generator = SequencedTokenGenerator::new();
        let a = generator.generate();
        let b = generator.generate();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn concurrent_generation_stays_unique() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let generator = Arc::new(SequencedTokenGenerator::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let generator = Arc::clone(&generator);
            handles.push(std::thread::spawn(move || {
                (0..100).map(|_| generator.generate()).collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for token in handle.join().unwrap() {
                assert!(seen.insert(token), "duplicate token generated");
            }
        }
    }
}
