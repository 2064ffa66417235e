//! Payment token encoding: hashing, masking and last-4 extraction.

use crate::{concepts::TokenHasher, errors::EncodingError, types::PaymentType};

const MASK_PREFIX: usize = 6;
const MASK_SUFFIX: usize = 4;
const MASK_CHAR: char = 'X';
const LAST4_LENGTH: usize = 4;

/// Result of encoding a raw payment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
    /// Value to store in `PTOK`.
    pub token: String,
    /// Value to store in `LAST4`, or `None` when one is already set.
    pub last4: Option<String>,
}

/// Turns raw payment tokens into their stored form.
#[derive(Debug, Clone)]
pub struct TokenEncoder<H: TokenHasher> {
    hasher: H,
    merchant_id: String,
}

impl<H: TokenHasher> TokenEncoder<H> {
    pub fn new(hasher: H, merchant_id: impl Into<String>) -> Self {
        TokenEncoder {
            hasher,
            merchant_id: merchant_id.into(),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Encode `raw` for `payment_type`.
    ///
    /// `last4` is derived from the raw token only when `has_last4` is false.
    pub fn encode(
        &self,
        raw: &str,
        payment_type: PaymentType,
        khash_enabled: bool,
        has_last4: bool,
    ) -> EncodedToken {
        let last4 = (!has_last4).then(|| last_four(raw));

        let token = if !khash_enabled {
            raw.to_string()
        } else if payment_type == PaymentType::GiftCard {
            self.hasher.hash_gift_card(&self.merchant_id, raw)
        } else {
            self.hasher.hash_payment_token(raw)
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Encoded {} token: khash={}, last4_derived={}",
            payment_type,
            khash_enabled,
            last4.is_some()
        );

        EncodedToken { token, last4 }
    }
}

/// Last four characters of `token`, or the whole token when it is that short.
pub fn last_four(token: &str) -> String {
    let length = token.chars().count();
    token
        .chars()
        .skip(length.saturating_sub(LAST4_LENGTH))
        .collect()
}

/// Redact everything between the first six and the last four characters.
///
/// Tokens shorter than ten characters have no redactable middle and are
/// rejected rather than passed through partially visible.
pub fn mask(token: &str) -> Result<String, EncodingError> {
    let chars: Vec<char> = token.chars().collect();
    let minimum = MASK_PREFIX + MASK_SUFFIX;

    if chars.len() < minimum {
        return Err(EncodingError::TokenTooShort {
            length: chars.len(),
            minimum,
        });
    }

    let suffix_start = chars.len() - MASK_SUFFIX;
    let masked = chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i < MASK_PREFIX || i >= suffix_start {
                *c
            } else {
                MASK_CHAR
            }
        })
        .collect();

    Ok(masked)
}
