use std::{fmt::Display, str::FromStr};

/// Payment methods accepted by RIS, with their `PTYP` wire codes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum PaymentType {
    Card,
    Check,
    PayPal,
    GooglePay,
    GiftCard,
    BillMeLater,
    GreenDotMoneyPak,
    None,
}

impl PaymentType {
    pub fn code(self) -> &'static str {
        match self {
            PaymentType::Card => "CARD",
            PaymentType::Check => "CHEK",
            PaymentType::PayPal => "PYPL",
            PaymentType::GooglePay => "GOOG",
            PaymentType::GiftCard => "GIFT",
            PaymentType::BillMeLater => "BLML",
            PaymentType::GreenDotMoneyPak => "GDMP",
            PaymentType::None => "NONE",
        }
    }
}

impl Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment type code: {0}")]
pub struct UnknownPaymentType(pub String);

impl FromStr for PaymentType {
    type Err = UnknownPaymentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARD" => Ok(PaymentType::Card),
            "CHEK" => Ok(PaymentType::Check),
            "PYPL" => Ok(PaymentType::PayPal),
            "GOOG" => Ok(PaymentType::GooglePay),
            "GIFT" => Ok(PaymentType::GiftCard),
            "BLML" => Ok(PaymentType::BillMeLater),
            "GDMP" => Ok(PaymentType::GreenDotMoneyPak),
            "NONE" => Ok(PaymentType::None),
            other => Err(UnknownPaymentType(other.to_string())),
        }
    }
}

/// How `PTOK` is encoded on the wire (`PENC`).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum PaymentEncoding {
    /// Token sent as given.
    #[default]
    Plain,
    /// Token replaced by its salted one-way digest.
    Khash,
    /// Token partially redacted before sending.
    Mask,
}

impl PaymentEncoding {
    pub fn code(self) -> &'static str {
        match self {
            PaymentEncoding::Plain => "",
            PaymentEncoding::Khash => "KHASH",
            PaymentEncoding::Mask => "MASK",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "" => Some(PaymentEncoding::Plain),
            "KHASH" => Some(PaymentEncoding::Khash),
            "MASK" => Some(PaymentEncoding::Mask),
            _ => None,
        }
    }
}

impl Display for PaymentEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
