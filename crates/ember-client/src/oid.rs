//! Submission id generation.
//!
//! Each mempool submission carries a locally generated, ObjectId-style
//! 24-hex-character id: 4 bytes of unix timestamp, 5 bytes of per-process
//! random, 3 bytes of an incrementing counter. The id distinguishes
//! submission attempts, it is not a semantic transaction id — two calls for
//! the same economic transfer produce two distinct mempool entries.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

fn process_random() -> &'static [u8; 5] {
    static PROCESS_RANDOM: OnceLock<[u8; 5]> = OnceLock::new();
    PROCESS_RANDOM.get_or_init(|| {
        let mut buf = [0u8; 5];
        rand::rngs::OsRng.fill_bytes(&mut buf);
        buf
    })
}

fn next_counter() -> u32 {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| AtomicU32::new(rand::rngs::OsRng.next_u32()));
    counter.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF
}

/// Generates a 24-lowercase-hex submission id.
pub fn submission_id() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32;

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
    bytes[4..9].copy_from_slice(process_random());
    bytes[9..].copy_from_slice(&next_counter().to_be_bytes()[1..]);

    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_is_24_lowercase_hex() {
        let id = submission_id();
        assert_eq!(id.len(), 24);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_are_unique_across_many_calls() {
        let ids: HashSet<String> = (0..10_000).map(|_| submission_id()).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn timestamp_prefix_is_current() {
        let id = submission_id();
        let encoded = u32::from_str_radix(&id[..8], 16).unwrap() as u64;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert!(now.abs_diff(encoded) < 5);
    }

    #[test]
    fn machine_component_is_stable_within_process() {
        let a = submission_id();
        let b = submission_id();
        // Bytes 4..9 (hex chars 8..18) are the per-process random component.
        assert_eq!(a[8..18], b[8..18]);
    }
}
