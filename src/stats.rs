/// Label-frequency statistics over stored annotations
///
/// Buckets are keyed by value text alone, so the same word used by two
/// different attributes (an "other" hair color and an "other" hat) lands in
/// one bucket. Percentages are relative to the number of stored records.
use std::fmt;

use crate::state::store::AnnotationStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Number of stored records the percentages are relative to
    pub total: usize,
    /// `(label, percentage)` in order of first appearance
    pub buckets: Vec<(String, f64)>,
}

impl Statistics {
    /// Percentage for `label`, if any record used it
    pub fn percentage(&self, label: &str) -> Option<f64> {
        self.buckets
            .iter()
            .find(|(bucket, _)| bucket == label)
            .map(|(_, pct)| *pct)
    }
}

/// Count every attribute value across the store
///
/// Unset enumerated fields are not counted, so there is no empty-label bucket.
pub fn compute(store: &AnnotationStore) -> Statistics {
    let total = store.len();
    let mut counts: Vec<(&'static str, usize)> = Vec::new();

    for (_, record) in store.iter() {
        for value in record.attributes.values() {
            match counts.iter().position(|(label, _)| *label == value) {
                Some(i) => counts[i].1 += 1,
                None => counts.push((value, 1)),
            }
        }
    }

    let buckets = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count as f64 / total as f64 * 100.0))
        .collect();

    Statistics { total, buckets }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total == 0 {
            return f.write_str("No annotations available to display statistics.");
        }

        writeln!(f, "Statistics:")?;
        writeln!(f)?;
        for (label, pct) in &self.buckets {
            writeln!(f, "{}: {:.2}%", capitalize(label), pct)?;
        }
        Ok(())
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
