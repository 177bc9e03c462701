use std::collections::HashMap;

use serde::Serialize;

use crate::collate::compare_fr;
use crate::record::Record;

/// Shown instead of an empty contributor name
pub const ANONYMOUS: &str = "Anonymous";

/// Somebody bringing an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contributor {
    pub name: String,
    pub qty: String,
    pub note: String,
}

impl Contributor {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            ANONYMOUS
        } else {
            &self.name
        }
    }

    /// `Name, qty . note` with the optional parts left out when empty.
    pub fn label(&self) -> String {
        let mut label = self.display_name().to_string();
        if !self.qty.is_empty() {
            label.push_str(", ");
            label.push_str(&self.qty);
        }
        if !self.note.is_empty() {
            label.push_str(" . ");
            label.push_str(&self.note);
        }
        label
    }
}

/// Everyone bringing the same item (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemGroup {
    /// Item text as written in the most recent record of the group
    pub item: String,
    /// First non-empty quantity seen, display only
    pub qty: String,
    pub people: Vec<Contributor>,
}

/// Group the list by item for display
///
/// The list is not modified. Records whose item is blank are skipped.
/// Groups keep the list order for their contributors and are sorted with
/// French collation on the item text.
pub fn project(records: &[Record]) -> Vec<ItemGroup> {
    let mut groups: Vec<ItemGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let key = record.item.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }

        let idx = *index.entry(key).or_insert_with(|| {
            groups.push(ItemGroup {
                item: record.item.clone(),
                qty: String::new(),
                people: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[idx];
        if group.qty.is_empty() && !record.qty.is_empty() {
            group.qty = record.qty.clone();
        }
        group.people.push(Contributor {
            name: record.name.clone(),
            qty: record.qty.clone(),
            note: record.note.clone(),
        });
    }

    groups.sort_by(|a, b| compare_fr(&a.item, &b.item));
    groups
}
