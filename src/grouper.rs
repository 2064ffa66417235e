//! Grouping of indexed line-item fields by family.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{FieldFamily, FieldValue, Record};

/// Concrete keys present in a request, grouped by [`FieldFamily`].
///
/// Derived from the live record on every validation pass; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayGroups {
    groups: BTreeMap<FieldFamily, BTreeSet<String>>,
}

impl ArrayGroups {
    pub fn get(&self, family: FieldFamily) -> &BTreeSet<String> {
        // Every family is inserted by `group_array_fields`.
        &self.groups[&family]
    }

    /// At least one instance of `family` exists.
    pub fn is_present(&self, family: FieldFamily) -> bool {
        !self.get(family).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldFamily, &BTreeSet<String>)> {
        self.groups.iter().map(|(family, keys)| (*family, keys))
    }
}

/// Scan `record` for keys starting with any known family prefix.
pub fn group_array_fields(record: &Record<FieldValue>) -> ArrayGroups {
    let mut groups: BTreeMap<FieldFamily, BTreeSet<String>> = FieldFamily::ALL
        .into_iter()
        .map(|family| (family, BTreeSet::new()))
        .collect();

    for key in record.keys() {
        for family in FieldFamily::ALL {
            if family.matches(key) {
                groups.entry(family).or_default().insert(key.clone());
            }
        }
    }

    ArrayGroups { groups }
}
