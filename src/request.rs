//! The request record and its typed setters.

use std::{net::IpAddr, sync::Arc};

use bon::Builder;

use crate::{
    concepts::TokenHasher,
    encoder::{TokenEncoder, mask},
    errors::{EncodingError, Error, Result},
    khash::Khash,
    schema::Schema,
    types::{FieldFamily, FieldValue, PaymentEncoding, PaymentType, Record, keys},
    validator::{ValidationError, ValidationReport, validate},
};

/// Schema version sent in `VERS` unless overridden.
pub const DEFAULT_VERSION: &str = "0720";

/// Fields whose consistency the request maintains itself.
const MANAGED_KEYS: [&str; 6] = [
    keys::MERC,
    keys::VERS,
    keys::PTYP,
    keys::PTOK,
    keys::PENC,
    keys::LAST4,
];

/// One line of the shopping cart.
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    /// High level product category, e.g. `SPORTING_GOODS`.
    #[builder(into)]
    pub product_type: String,
    /// Item name or SKU.
    #[builder(into)]
    pub item_name: String,
    #[builder(into, default)]
    pub description: String,
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub price: i64,
}

/// A single in-flight RIS transaction.
///
/// Not meant to be shared between concurrent callers; build one per
/// transaction.
#[derive(Debug, Clone)]
pub struct Request<H: TokenHasher = Khash> {
    fields: Record<FieldValue>,
    encoder: TokenEncoder<H>,
    /// Encoding of the `PTOK` currently stored.
    encoding: PaymentEncoding,
    /// Whether later payment setters hash their token.
    khash: bool,
    schema: Option<Arc<Schema>>,
}

impl<H: TokenHasher> Request<H> {
    pub fn new(encoder: TokenEncoder<H>) -> Self {
        let mut fields = Record::new();
        fields.insert(keys::MERC.to_string(), encoder.merchant_id().into());
        fields.insert(keys::VERS.to_string(), DEFAULT_VERSION.into());

        Request {
            fields,
            encoder,
            encoding: PaymentEncoding::Plain,
            khash: false,
            schema: None,
        }
    }

    /// Validate against `schema` instead of the bundled one.
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn set_version(&mut self, version: impl Into<String>) -> &mut Self {
        self.put(keys::VERS, version.into())
    }

    pub fn set_mode(&mut self, mode: impl Into<char>) -> &mut Self {
        self.put(keys::MODE, mode.into())
    }

    pub fn set_session_id(&mut self, session_id: impl Into<String>) -> &mut Self {
        self.put(keys::SESS, session_id.into())
    }

    pub fn set_order_number(&mut self, order_number: impl Into<String>) -> &mut Self {
        self.put(keys::ORDR, order_number.into())
    }

    /// Whether the merchant acknowledges the order will ship (`MACK` Y/N).
    pub fn set_merchant_acknowledgment(&mut self, acknowledged: bool) -> &mut Self {
        self.put(keys::MACK, if acknowledged { 'Y' } else { 'N' })
    }

    /// Authorization result from the processor, `A` (approved) or `D` (declined).
    pub fn set_authorization_status(&mut self, status: char) -> &mut Self {
        self.put(keys::AUTH, status)
    }

    pub fn set_avs_zip_reply(&mut self, reply: char) -> &mut Self {
        self.put(keys::AVSZ, reply)
    }

    pub fn set_avs_address_reply(&mut self, reply: char) -> &mut Self {
        self.put(keys::AVST, reply)
    }

    pub fn set_cvv_reply(&mut self, reply: char) -> &mut Self {
        self.put(keys::CVVR, reply)
    }

    pub fn set_customer_id(&mut self, customer_id: impl Into<String>) -> &mut Self {
        self.put(keys::CUSTOMER_ID, customer_id.into())
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> &mut Self {
        self.put(keys::EMAL, email.into())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.put(keys::NAME, name.into())
    }

    /// Order total in minor currency units.
    pub fn set_total(&mut self, total: i64) -> &mut Self {
        self.put(keys::TOTL, total)
    }

    pub fn set_currency(&mut self, currency: impl Into<String>) -> &mut Self {
        self.put(keys::CURR, currency.into())
    }

    pub fn set_ip_address(&mut self, ip: IpAddr) -> &mut Self {
        self.put(keys::IPAD, ip.to_string())
    }

    pub fn set_website(&mut self, site: impl Into<String>) -> &mut Self {
        self.put(keys::SITE, site.into())
    }

    /// Replace the cart with `items`, written as indexed `PROD_*` fields.
    pub fn set_cart(&mut self, items: &[CartItem]) -> &mut Self {
        self.fields
            .retain(|key, _| !FieldFamily::ALL.iter().any(|family| family.matches(key)));

        for (i, item) in items.iter().enumerate() {
            self.put_indexed(FieldFamily::ProductType, i, item.product_type.as_str());
            self.put_indexed(FieldFamily::ProductItem, i, item.item_name.as_str());
            self.put_indexed(FieldFamily::ProductDescription, i, item.description.as_str());
            self.put_indexed(FieldFamily::ProductQuantity, i, item.quantity);
            self.put_indexed(FieldFamily::ProductPrice, i, item.price);
        }
        self
    }

    /// Set an arbitrary field.
    ///
    /// Payment and identity fields are maintained by their dedicated setters
    /// and are refused here.
    pub fn set_parameter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<&mut Self> {
        let key = key.into();
        if MANAGED_KEYS.contains(&key.as_str()) {
            return Err(Error::ManagedField(key));
        }
        self.fields.insert(key, value.into());
        Ok(self)
    }

    pub fn remove_parameter(&mut self, key: &str) -> Result<Option<FieldValue>> {
        if MANAGED_KEYS.contains(&key) {
            return Err(Error::ManagedField(key.to_string()));
        }
        Ok(self.fields.remove(key))
    }

    pub fn parameter(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Record<FieldValue> {
        &self.fields
    }

    /// Transaction mode from `MODE`, if set to a single character.
    pub fn mode(&self) -> Option<char> {
        match self.fields.get(keys::MODE)? {
            FieldValue::Char(c) => Some(*c),
            FieldValue::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            FieldValue::Integer(_) => None,
        }
    }

    pub fn payment_encoding(&self) -> PaymentEncoding {
        self.encoding
    }

    pub fn payment_type(&self) -> Option<PaymentType> {
        self.fields
            .get(keys::PTYP)
            .and_then(FieldValue::as_text)
            .and_then(|code| code.parse().ok())
    }

    /// Hash payment tokens (`PENC=KHASH`) in later payment setters.
    ///
    /// Enabling also hashes a plain token that is already stored. Disabling
    /// leaves an already hashed token (and its `PENC`) in place until the next
    /// payment setter; a masked token is never re-encoded.
    pub fn set_khash_payment_encoding(&mut self, enabled: bool) -> &mut Self {
        self.khash = enabled;
        let stored = self.stored_payment();

        match (self.encoding, stored) {
            (PaymentEncoding::Mask, _) => {}
            (PaymentEncoding::Plain, Some((payment_type, token))) if enabled => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Hashing stored {} token after enabling KHASH", payment_type);
                self.store_payment(payment_type, &token, true);
                self.set_encoding(PaymentEncoding::Khash);
            }
            (PaymentEncoding::Khash, Some(_)) => {}
            _ => self.set_encoding(self.preferred_encoding()),
        }
        self
    }

    /// Explicit `LAST4`. Later payment setters keep this value.
    pub fn set_payment_token_last4(&mut self, last4: impl Into<String>) -> &mut Self {
        self.put(keys::LAST4, last4.into())
    }

    /// Set `PTYP` and `PTOK` together, encoding the token per `PENC`.
    pub fn set_payment(&mut self, payment_type: PaymentType, token: &str) -> &mut Self {
        if payment_type == PaymentType::None {
            return self.set_no_payment();
        }
        self.store_payment(payment_type, token, self.khash);
        self.set_encoding(self.preferred_encoding());
        self
    }

    pub fn set_card_payment(&mut self, card_number: &str) -> &mut Self {
        self.set_payment(PaymentType::Card, card_number)
    }

    /// Checks are identified by their MICR line.
    pub fn set_check_payment(&mut self, micr: &str) -> &mut Self {
        self.set_payment(PaymentType::Check, micr)
    }

    pub fn set_paypal_payment(&mut self, paypal_id: &str) -> &mut Self {
        self.set_payment(PaymentType::PayPal, paypal_id)
    }

    pub fn set_google_payment(&mut self, google_id: &str) -> &mut Self {
        self.set_payment(PaymentType::GooglePay, google_id)
    }

    pub fn set_gift_card_payment(&mut self, gift_card_number: &str) -> &mut Self {
        self.set_payment(PaymentType::GiftCard, gift_card_number)
    }

    pub fn set_bill_me_later_payment(&mut self, blml_id: &str) -> &mut Self {
        self.set_payment(PaymentType::BillMeLater, blml_id)
    }

    pub fn set_green_dot_money_pak_payment(&mut self, money_pak_id: &str) -> &mut Self {
        self.set_payment(PaymentType::GreenDotMoneyPak, money_pak_id)
    }

    /// `PTYP=NONE` with an empty token. `PENC` follows the KHASH setting.
    pub fn set_no_payment(&mut self) -> &mut Self {
        self.put(keys::PTYP, PaymentType::None.code());
        self.put(keys::PTOK, "");
        self.set_encoding(self.preferred_encoding());
        self
    }

    /// Send a card number with its middle digits replaced by `X` (`PENC=MASK`).
    ///
    /// Fails without touching the request if the number is too short to mask.
    pub fn set_card_payment_masked(
        &mut self,
        card_number: &str,
    ) -> std::result::Result<&mut Self, EncodingError> {
        let masked = mask(card_number)?;
        self.set_encoding(PaymentEncoding::Mask);
        Ok(self.store_payment(PaymentType::Card, &masked, false))
    }

    /// Validate against the installed (or bundled) schema using this request's mode.
    ///
    /// With `strict`, any error is returned as [`Error::Validation`]; otherwise
    /// errors are handed back for the caller to inspect.
    pub fn validate(&self, strict: bool) -> Result<Vec<ValidationError>> {
        let errors = match &self.schema {
            Some(schema) => validate(&self.fields, schema, self.mode()),
            None => validate(&self.fields, Schema::bundled()?, self.mode()),
        };

        if strict && !errors.is_empty() {
            return Err(Error::Validation(ValidationReport(errors)));
        }
        Ok(errors)
    }

    /// The record as `(key, value)` pairs, sorted by key.
    pub fn to_payload(&self) -> Vec<(String, String)> {
        let mut payload: Vec<(String, String)> = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_wire()))
            .collect();
        payload.sort();
        payload
    }

    fn preferred_encoding(&self) -> PaymentEncoding {
        if self.khash {
            PaymentEncoding::Khash
        } else {
            PaymentEncoding::Plain
        }
    }

    /// Payment type and non-empty token currently in the record.
    fn stored_payment(&self) -> Option<(PaymentType, String)> {
        let payment_type = self.payment_type().filter(|t| *t != PaymentType::None)?;
        let token = self.fields.get(keys::PTOK)?.to_wire();
        (!token.is_empty()).then_some((payment_type, token))
    }

    fn store_payment(
        &mut self,
        payment_type: PaymentType,
        token: &str,
        khash_enabled: bool,
    ) -> &mut Self {
        let has_last4 = self.fields.contains_key(keys::LAST4);
        let encoded = self
            .encoder
            .encode(token, payment_type, khash_enabled, has_last4);

        self.put(keys::PTYP, payment_type.code());
        self.put(keys::PTOK, encoded.token);
        if let Some(last4) = encoded.last4 {
            self.put(keys::LAST4, last4);
        }
        self
    }

    fn set_encoding(&mut self, encoding: PaymentEncoding) {
        self.encoding = encoding;
        match encoding {
            PaymentEncoding::Plain => {
                self.fields.remove(keys::PENC);
            }
            _ => {
                self.fields
                    .insert(keys::PENC.to_string(), encoding.code().into());
            }
        }
    }

    fn put(&mut self, key: &str, value: impl Into<FieldValue>) -> &mut Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    fn put_indexed(&mut self, family: FieldFamily, index: usize, value: impl Into<FieldValue>) {
        self.fields.insert(family.indexed_key(index), value.into());
    }
}

impl Request<Khash> {
    /// Request hashing tokens with [`Khash`] salted by `config_key`.
    pub fn with_khash(merchant_id: impl Into<String>, config_key: impl AsRef<[u8]>) -> Self {
        Request::new(TokenEncoder::new(Khash::new(config_key), merchant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::with_khash("999666", "secret")
    }

    #[test]
    fn test_new_request_has_merchant_and_version() {
        let request = request();
        assert_eq!(request.parameter(keys::MERC), Some(&"999666".into()));
        assert_eq!(request.parameter(keys::VERS), Some(&DEFAULT_VERSION.into()));
        assert_eq!(request.payment_encoding(), PaymentEncoding::Plain);
        assert!(request.parameter(keys::PENC).is_none());
    }

    #[test]
    fn test_scalar_setters_use_wire_keys() {
        let mut request = request();
        request
            .set_mode('Q')
            .set_session_id("abc123")
            .set_order_number("ORD-1")
            .set_merchant_acknowledgment(true)
            .set_authorization_status('A')
            .set_avs_zip_reply('M')
            .set_avs_address_reply('N')
            .set_cvv_reply('X')
            .set_customer_id("cust-9")
            .set_total(1999)
            .set_ip_address("10.0.0.1".parse().unwrap());

        assert_eq!(request.mode(), Some('Q'));
        assert_eq!(request.parameter("SESS"), Some(&"abc123".into()));
        assert_eq!(request.parameter("ORDR"), Some(&"ORD-1".into()));
        assert_eq!(request.parameter("MACK"), Some(&'Y'.into()));
        assert_eq!(request.parameter("AUTH"), Some(&'A'.into()));
        assert_eq!(request.parameter("AVSZ"), Some(&'M'.into()));
        assert_eq!(request.parameter("AVST"), Some(&'N'.into()));
        assert_eq!(request.parameter("CVVR"), Some(&'X'.into()));
        assert_eq!(request.parameter("CUSTOMER_ID"), Some(&"cust-9".into()));
        assert_eq!(request.parameter("TOTL"), Some(&1999i64.into()));
        assert_eq!(request.parameter("IPAD"), Some(&"10.0.0.1".into()));
    }

    #[test]
    fn test_plain_card_payment() {
        let mut request = request();
        request.set_card_payment("4111111111111111");

        assert_eq!(request.payment_type(), Some(PaymentType::Card));
        assert_eq!(request.parameter("PTOK"), Some(&"4111111111111111".into()));
        assert_eq!(request.parameter("LAST4"), Some(&"1111".into()));
    }

    #[test]
    fn test_khash_card_payment_never_stores_raw_token() {
        let mut request = request();
        request
            .set_khash_payment_encoding(true)
            .set_card_payment("4111111111111111");

        let expected = Khash::new("secret").hash_payment_token("4111111111111111");
        assert_eq!(request.parameter("PTOK"), Some(&expected.as_str().into()));
        assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));
        assert_eq!(request.parameter("LAST4"), Some(&"1111".into()));
    }

    #[test]
    fn test_last4_is_first_write_wins() {
        let mut request = request();
        request.set_card_payment("4111111111111111");
        request.set_paypal_payment("buyer@example.com");

        assert_eq!(request.parameter("LAST4"), Some(&"1111".into()));
        assert_eq!(request.payment_type(), Some(PaymentType::PayPal));
    }

    #[test]
    fn test_explicit_last4_survives_payment_setter() {
        let mut request = request();
        request
            .set_payment_token_last4("9999")
            .set_card_payment("4111111111111111");
        assert_eq!(request.parameter("LAST4"), Some(&"9999".into()));
    }

    #[test]
    fn test_no_payment_keeps_encoding() {
        let mut request = request();
        request.set_khash_payment_encoding(true).set_no_payment();

        assert_eq!(request.parameter("PTYP"), Some(&"NONE".into()));
        assert_eq!(request.parameter("PTOK"), Some(&"".into()));
        assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));
        assert!(request.parameter("LAST4").is_none());
    }

    #[test]
    fn test_set_payment_none_is_no_payment() {
        let mut request = request();
        request.set_payment(PaymentType::None, "ignored");
        assert_eq!(request.parameter("PTOK"), Some(&"".into()));
    }

    #[test]
    fn test_masked_card_payment() {
        let mut request = request();
        request.set_khash_payment_encoding(true);
        request.set_card_payment_masked("0007380568572514").unwrap();

        assert_eq!(request.parameter("PTOK"), Some(&"000738XXXXXX2514".into()));
        assert_eq!(request.parameter("PENC"), Some(&"MASK".into()));
        assert_eq!(request.parameter("LAST4"), Some(&"2514".into()));
        assert_eq!(request.payment_encoding(), PaymentEncoding::Mask);
    }

    #[test]
    fn test_masking_failure_leaves_request_untouched() {
        let mut request = request();
        request.set_khash_payment_encoding(true);
        let before = request.fields().clone();

        let result = request.set_card_payment_masked("12345");
        assert!(matches!(result, Err(EncodingError::TokenTooShort { .. })));
        assert_eq!(request.fields(), &before);
        assert_eq!(request.payment_encoding(), PaymentEncoding::Khash);
    }

    #[test]
    fn test_plain_payment_after_mask_clears_mask_encoding() {
        let mut request = request();
        request.set_card_payment_masked("0007380568572514").unwrap();
        request.set_check_payment("011000015123456789");

        assert!(request.parameter("PENC").is_none());
        assert_eq!(request.parameter("PTOK"), Some(&"011000015123456789".into()));
    }

    #[test]
    fn test_enabling_khash_hashes_stored_token() {
        let mut request = request();
        request
            .set_card_payment("4111111111111111")
            .set_khash_payment_encoding(true);

        let expected = Khash::new("secret").hash_payment_token("4111111111111111");
        assert_eq!(request.parameter("PTOK"), Some(&expected.as_str().into()));
        assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));
        assert_eq!(request.parameter("LAST4"), Some(&"1111".into()));
        assert_eq!(request.payment_encoding(), PaymentEncoding::Khash);
    }

    #[test]
    fn test_enabling_khash_twice_does_not_rehash() {
        let mut request = request();
        request
            .set_gift_card_payment("GC123456789")
            .set_khash_payment_encoding(true)
            .set_khash_payment_encoding(true);

        let expected = Khash::new("secret").hash_gift_card("999666", "GC123456789");
        assert_eq!(request.parameter("PTOK"), Some(&expected.as_str().into()));
    }

    #[test]
    fn test_disabling_khash_keeps_hashed_token_labelled() {
        let mut request = request();
        request
            .set_khash_payment_encoding(true)
            .set_card_payment("4111111111111111")
            .set_khash_payment_encoding(false);

        let expected = Khash::new("secret").hash_payment_token("4111111111111111");
        assert_eq!(request.parameter("PTOK"), Some(&expected.as_str().into()));
        assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));

        request.set_card_payment("5500000000000004");
        assert_eq!(request.parameter("PTOK"), Some(&"5500000000000004".into()));
        assert!(request.parameter("PENC").is_none());
    }

    #[test]
    fn test_payment_after_mask_returns_to_khash() {
        let mut request = request();
        request.set_khash_payment_encoding(true);
        request.set_card_payment_masked("0007380568572514").unwrap();
        request.set_card_payment("4111111111111111");

        let expected = Khash::new("secret").hash_payment_token("4111111111111111");
        assert_eq!(request.parameter("PTOK"), Some(&expected.as_str().into()));
        assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));
    }

    #[test]
    fn test_toggling_khash_leaves_masked_token_alone() {
        let mut request = request();
        request.set_card_payment_masked("0007380568572514").unwrap();
        request.set_khash_payment_encoding(true);

        assert_eq!(request.parameter("PTOK"), Some(&"000738XXXXXX2514".into()));
        assert_eq!(request.parameter("PENC"), Some(&"MASK".into()));

        request.set_khash_payment_encoding(false);
        assert_eq!(request.parameter("PENC"), Some(&"MASK".into()));
    }

    #[test]
    fn test_penc_describes_stored_token_in_any_order() {
        let raw = "4111111111111111";
        let hashed = Khash::new("secret").hash_payment_token(raw);

        let mut enable_first = request();
        enable_first.set_khash_payment_encoding(true).set_card_payment(raw);
        let mut enable_last = request();
        enable_last.set_card_payment(raw).set_khash_payment_encoding(true);

        for request in [&enable_first, &enable_last] {
            assert_eq!(request.parameter("PTOK"), Some(&hashed.as_str().into()));
            assert_eq!(request.parameter("PENC"), Some(&"KHASH".into()));
        }

        let mut plain = request();
        plain
            .set_khash_payment_encoding(true)
            .set_khash_payment_encoding(false)
            .set_card_payment(raw);
        assert_eq!(plain.parameter("PTOK"), Some(&raw.into()));
        assert!(plain.parameter("PENC").is_none());
    }

    #[test]
    fn test_no_payment_after_mask_follows_khash_setting() {
        let mut request = request();
        request.set_card_payment_masked("0007380568572514").unwrap();
        request.set_no_payment();
        assert!(request.parameter("PENC").is_none());

        request.set_khash_payment_encoding(false);
        assert!(request.parameter("PENC").is_none());
    }

    #[test]
    fn test_paypal_email_id_passes_bundled_rules() {
        let mut request = request();
        request.set_mode('Q').set_paypal_payment("buyer@example.com");

        let errors = request.validate(false).unwrap();
        assert!(
            errors.iter().all(|e| e.field != "PTOK"),
            "unexpected errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_cart_is_written_as_indexed_fields() {
        let mut request = request();
        let items = [
            CartItem::builder()
                .product_type("SPORTING_GOODS")
                .item_name("BALL-1")
                .description("Soccer ball")
                .quantity(2)
                .price(1500)
                .build(),
            CartItem::builder()
                .product_type("APPAREL")
                .item_name("SHIRT-9")
                .quantity(1)
                .price(2500)
                .build(),
        ];
        request.set_cart(&items);

        assert_eq!(request.parameter("PROD_TYPE0"), Some(&"SPORTING_GOODS".into()));
        assert_eq!(request.parameter("PROD_ITEM1"), Some(&"SHIRT-9".into()));
        assert_eq!(request.parameter("PROD_DESC1"), Some(&"".into()));
        assert_eq!(request.parameter("PROD_QUANT0"), Some(&2u32.into()));
        assert_eq!(request.parameter("PROD_PRICE1"), Some(&2500i64.into()));

        request.set_cart(&items[..1]);
        assert!(request.parameter("PROD_TYPE1").is_none());
        assert!(request.parameter("PROD_TYPE0").is_some());
    }

    #[test]
    fn test_managed_fields_are_refused_by_set_parameter() {
        let mut request = request();
        assert!(matches!(
            request.set_parameter("PTOK", "4111"),
            Err(Error::ManagedField(key)) if key == "PTOK"
        ));
        assert!(matches!(
            request.remove_parameter("MERC"),
            Err(Error::ManagedField(_))
        ));

        request.set_parameter("UDF_COLOR", "blue").unwrap();
        assert_eq!(request.parameter("UDF_COLOR"), Some(&"blue".into()));
        assert_eq!(
            request.remove_parameter("UDF_COLOR").unwrap(),
            Some("blue".into())
        );
    }

    #[test]
    fn test_mode_from_text_parameter() {
        let mut request = request();
        request.set_parameter("MODE", "P").unwrap();
        assert_eq!(request.mode(), Some('P'));
        request.set_parameter("MODE", "PQ").unwrap();
        assert_eq!(request.mode(), None);
    }

    #[test]
    fn test_payload_is_sorted() {
        let mut request = request();
        request.set_mode('Q').set_session_id("s1");
        let payload = request.to_payload();

        let keys: Vec<&str> = payload.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["MERC", "MODE", "SESS", "VERS"]);
        assert!(payload.contains(&("MODE".to_string(), "Q".to_string())));
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let mut request = request();
        request.set_mode('Q');
        let before = request.fields().clone();

        let errors = request.validate(false).unwrap();
        assert!(!errors.is_empty());
        assert!(matches!(request.validate(true), Err(Error::Validation(_))));
        assert_eq!(request.fields(), &before);
    }
}
