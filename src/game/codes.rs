//! Short human-typable room codes.

use rand::Rng;

/// Alphabet for room codes: uppercase letters and digits.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Length of a room code.
pub const CODE_LENGTH: usize = 6;

/// Generate a random 6-character room code.
///
/// Uniqueness is not checked here; the caller retries on collision.
pub fn generate_room_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let index = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[index] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_have_expected_shape() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }
}
