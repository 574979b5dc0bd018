//! License key generation.

use rand::Rng;

/// Alphanumeric alphabet used for license keys.
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draw a random fixed-length alphanumeric key.
///
/// At 24 characters over a 62-symbol alphabet collisions are practically
/// impossible, but issuance still checks uniqueness with a bounded retry.
pub fn generate_key(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_has_requested_length() {
        assert_eq!(generate_key(24).len(), 24);
        assert_eq!(generate_key(8).len(), 8);
    }

    #[test]
    fn test_key_is_alphanumeric() {
        let key = generate_key(64);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_keys_are_not_repeated() {
        // Probabilistic, but a collision here would mean the RNG is broken.
        assert_ne!(generate_key(24), generate_key(24));
    }
}
