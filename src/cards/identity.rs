//! Content identity for cards.
//!
//! The content hash is the dedup key and the source of the card id, so the
//! same front/back text must always hash the same way regardless of stray
//! whitespace. That is what makes redelivery idempotent.

use sha2::{Digest, Sha256};

/// Separator between the normalized front and back halves. Normalization
/// collapses all whitespace and control characters never survive it, so this
/// byte cannot be produced by either field.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Hex width of the content hash
const HASH_LEN: usize = 16;

/// Collapse whitespace runs to single spaces and trim the ends
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Hash of normalized `front|back`, truncated to a fixed width
pub fn content_hash(front: &str, back: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(front).as_bytes());
    hasher.update([FIELD_SEPARATOR as u8]);
    hasher.update(normalize(back).as_bytes());
    let mut hash = hex::encode(hasher.finalize());
    hash.truncate(HASH_LEN);
    hash
}

/// Card id derived from a content hash
pub fn card_id(content_hash: &str) -> String {
    format!("card-{}", content_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable() {
        let a = content_hash("What is the hilum?", "The root of the lung.");
        let b = content_hash("What is the hilum?", "The root of the lung.");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_LEN);
    }

    #[test]
    fn hash_ignores_whitespace_differences() {
        let a = content_hash("  What is   the hilum?\n", "The root\tof the lung. ");
        let b = content_hash("What is the hilum?", "The root of the lung.");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_distinguishes_content() {
        let a = content_hash("What is the hilum?", "The root of the lung.");
        let b = content_hash("What is the hilum?", "The root of the liver.");
        assert_ne!(a, b);
    }

    #[test]
    fn separator_prevents_boundary_shifts() {
        // "ab" + "c" must not collide with "a" + "bc"
        assert_ne!(content_hash("ab", "c"), content_hash("a", "bc"));
    }

    #[test]
    fn card_id_embeds_hash() {
        let hash = content_hash("front text", "back text");
        assert_eq!(card_id(&hash), format!("card-{}", hash));
    }
}
