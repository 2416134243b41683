//! On-disk directory keys for units.
//!
//! Course and module names are user text and cannot be trusted as path
//! components. The key is built from sanitized halves plus a short hash of
//! the raw pair, so two units whose names only differ in characters the
//! sanitizer strips still get distinct directories.

use sha2::{Digest, Sha256};

use crate::cards::Unit;

/// Hex width of the disambiguating suffix
const SUFFIX_LEN: usize = 8;

/// Lowercase, map anything outside `[a-z0-9]` to `-`, collapse runs, trim
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_dash = false;
        } else if !last_dash {
            out.push('-');
            last_dash = true;
        }
    }
    let out = out.trim_end_matches('-').to_string();
    if out.is_empty() {
        "unit".to_string()
    } else {
        out
    }
}

/// Directory name for a unit's deck document
pub fn unit_dir_key(unit: &Unit) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unit.course.as_bytes());
    hasher.update([0x1f]);
    hasher.update(unit.module.as_bytes());
    let mut suffix = hex::encode(hasher.finalize());
    suffix.truncate(SUFFIX_LEN);

    format!(
        "{}__{}-{}",
        sanitize(&unit.course),
        sanitize(&unit.module),
        suffix
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable() {
        let unit = Unit::new("Anatomy", "Chapter 5");
        assert_eq!(unit_dir_key(&unit), unit_dir_key(&unit));
    }

    #[test]
    fn key_contains_no_path_separators() {
        let unit = Unit::new("A/B\\C", "../../etc");
        let key = unit_dir_key(&unit);
        assert!(!key.contains('/'));
        assert!(!key.contains('\\'));
        assert!(!key.contains(".."));
    }

    #[test]
    fn sanitized_collisions_stay_distinct() {
        // Both sanitize to the same readable halves; the hash suffix differs
        let a = unit_dir_key(&Unit::new("Bio 101", "Week 1"));
        let b = unit_dir_key(&Unit::new("Bio-101", "Week.1"));
        assert_ne!(a, b);
    }

    #[test]
    fn readable_halves_survive() {
        let key = unit_dir_key(&Unit::new("Anatomy", "Chapter 5"));
        assert!(key.starts_with("anatomy__chapter-5-"));
    }

    #[test]
    fn degenerate_names_get_a_fallback() {
        let key = unit_dir_key(&Unit::new("!!", "??"));
        assert!(key.starts_with("unit__unit-"));
    }
}
