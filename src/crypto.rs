//! Constant-time comparison of secret material.
//!
//! Standard `==` on byte slices returns as soon as it finds a mismatching
//! byte, which leaks how much of a secret an attacker has guessed through
//! response timing. Comparisons of key material in this crate go through
//! the `subtle` crate instead, which takes the same time regardless of
//! where (or whether) the inputs differ.

use subtle::ConstantTimeEq;

/// Compare two byte slices in constant time.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Compare two strings in constant time.
///
/// Convenience wrapper around [`constant_time_eq`]. Used when checking
/// whether a secret rotation actually changes the signing secret.
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    constant_time_eq(a.as_bytes(), b.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_match() {
        assert!(constant_time_eq(b"swordfish", b"swordfish"));
        assert!(constant_time_str_eq("", ""));
    }

    #[test]
    fn different_inputs_do_not_match() {
        assert!(!constant_time_eq(b"swordfish", b"swordfisi"));
        assert!(!constant_time_str_eq("secret-a", "secret-b"));
    }

    #[test]
    fn different_lengths_do_not_match() {
        assert!(!constant_time_eq(b"short", b"much longer input"));
    }
}
