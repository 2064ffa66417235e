//! Salted token digest used for `PENC=KHASH`.
//!
//! The digest is an HMAC-SHA256 of the token keyed by the merchant's config
//! key. The hex digest is folded into 14 base-36 characters and prefixed with
//! either the first six characters of the token (its BIN) or, for gift cards,
//! the merchant id.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::concepts::TokenHasher;

type HmacSha256 = Hmac<Sha256>;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGEST_CHARS: usize = 14;
const BIN_LENGTH: usize = 6;

/// Default [`TokenHasher`].
#[derive(Clone)]
pub struct Khash {
    salt: Vec<u8>,
}

impl Khash {
    pub fn new(salt: impl AsRef<[u8]>) -> Self {
        Khash {
            salt: salt.as_ref().to_vec(),
        }
    }

    fn digest(&self, token: &str) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.salt).expect("HMAC key size is always valid");
        mac.update(token.as_bytes());
        let hex_digest = hex::encode(mac.finalize().into_bytes());

        // Seven hex digits (28 bits) per output character, sliding by two.
        (0..DIGEST_CHARS)
            .map(|i| {
                let window = &hex_digest[i * 2..i * 2 + 7];
                let value = u32::from_str_radix(window, 16).unwrap_or_default();
                ALPHABET[(value % 36) as usize] as char
            })
            .collect()
    }
}

impl std::fmt::Debug for Khash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Khash").field("salt", &"<redacted>").finish()
    }
}

impl TokenHasher for Khash {
    fn hash_payment_token(&self, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        let bin: String = token.chars().take(BIN_LENGTH).collect();
        format!("{}{}", bin, self.digest(token))
    }

    fn hash_gift_card(&self, merchant_id: &str, token: &str) -> String {
        if token.is_empty() {
            return String::new();
        }
        format!("{}{}", merchant_id, self.digest(token))
    }
}
