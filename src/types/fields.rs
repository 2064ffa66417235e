use std::fmt::Display;

/// Wire names of the fields the request builder writes.
///
/// These are part of the contract with the remote service and are matched
/// case-sensitively.
pub mod keys {
    pub const MERC: &str = "MERC";
    pub const VERS: &str = "VERS";
    pub const MODE: &str = "MODE";
    pub const PTYP: &str = "PTYP";
    pub const PTOK: &str = "PTOK";
    pub const PENC: &str = "PENC";
    pub const LAST4: &str = "LAST4";
    pub const SESS: &str = "SESS";
    pub const ORDR: &str = "ORDR";
    pub const MACK: &str = "MACK";
    pub const AUTH: &str = "AUTH";
    pub const AVSZ: &str = "AVSZ";
    pub const AVST: &str = "AVST";
    pub const CVVR: &str = "CVVR";
    pub const CUSTOMER_ID: &str = "CUSTOMER_ID";
    pub const EMAL: &str = "EMAL";
    pub const NAME: &str = "NAME";
    pub const TOTL: &str = "TOTL";
    pub const CURR: &str = "CURR";
    pub const IPAD: &str = "IPAD";
    pub const SITE: &str = "SITE";
}

/// A repeated group of per-line-item fields.
///
/// Instances of a family share the family prefix and carry an arbitrary
/// suffix, usually the line index (`PROD_TYPE0`, `PROD_TYPE1`, ...).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldFamily {
    ProductType,
    ProductItem,
    ProductDescription,
    ProductQuantity,
    ProductPrice,
}

impl FieldFamily {
    pub const ALL: [FieldFamily; 5] = [
        FieldFamily::ProductType,
        FieldFamily::ProductItem,
        FieldFamily::ProductDescription,
        FieldFamily::ProductQuantity,
        FieldFamily::ProductPrice,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            FieldFamily::ProductType => "PROD_TYPE",
            FieldFamily::ProductItem => "PROD_ITEM",
            FieldFamily::ProductDescription => "PROD_DESC",
            FieldFamily::ProductQuantity => "PROD_QUANT",
            FieldFamily::ProductPrice => "PROD_PRICE",
        }
    }

    /// Plain prefix match: any suffix counts, numeric or not.
    pub fn matches(self, key: &str) -> bool {
        key.starts_with(self.prefix())
    }

    /// The family whose prefix is exactly `name`, if any.
    pub fn from_rule_name(name: &str) -> Option<FieldFamily> {
        FieldFamily::ALL
            .into_iter()
            .find(|family| family.prefix() == name)
    }

    /// Concrete key of the `index`-th instance in this family.
    pub fn indexed_key(self, index: usize) -> String {
        format!("{}{}", self.prefix(), index)
    }
}

impl Display for FieldFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}
