//! Core traits used across the RIS Kit.

/// One-way, deterministic digest of payment tokens.
///
/// Implementations are salted by a secret supplied at construction; two hashers
/// with the same secret must produce identical output.
pub trait TokenHasher {
    /// Digest of a globally unique payment token (card number, account id, ...).
    fn hash_payment_token(&self, token: &str) -> String;

    /// Digest of a gift card number, scoped to the merchant that issued it.
    fn hash_gift_card(&self, merchant_id: &str, token: &str) -> String;
}

/// Delivers a finished request payload to RIS and returns the raw response body.
pub trait Transport {
    type Error: std::error::Error;

    fn send(
        &self,
        payload: &[(String, String)],
    ) -> impl Future<Output = Result<String, Self::Error>>;
}
