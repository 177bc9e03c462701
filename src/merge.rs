use std::cmp::Reverse;
use std::collections::HashMap;

use crate::record::Record;

/// Merge a fresh snapshot of the sheet into the list currently shown
///
/// Incoming rows go in first and win on a fingerprint collision, since the
/// sheet is authoritative. Rows of `previous` are kept only when their
/// fingerprint is not already there, which preserves local submissions the
/// sheet has not published yet without duplicating the ones it has.
/// The result is sorted newest first by `created_at` (unparsable counts as
/// the epoch); equal timestamps keep their insertion order.
///
/// # Arguments
/// * `previous` - The list before this refresh
/// * `incoming` - Records decoded from the read endpoint
///
/// # Returns
/// * `Vec<Record>` - Unique by fingerprint, newest first
pub fn reconcile(previous: &[Record], incoming: &[Record]) -> Vec<Record> {
    let mut merged: Vec<Record> = Vec::with_capacity(incoming.len() + previous.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in incoming {
        let key = record.fingerprint();
        match positions.get(&key) {
            Some(&idx) => merged[idx] = record.clone(),
            None => {
                positions.insert(key, merged.len());
                merged.push(record.clone());
            }
        }
    }

    for record in previous {
        let key = record.fingerprint();
        if !positions.contains_key(&key) {
            positions.insert(key, merged.len());
            merged.push(record.clone());
        }
    }

    sort_newest_first(&mut merged);
    merged
}

/// Stable sort by descending parsed `created_at`.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by_cached_key(|r| Reverse(r.timestamp_millis()));
}
