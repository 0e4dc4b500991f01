//! Read-only summaries over a finished output document.

use serde::Serialize;
use std::collections::HashMap;

use crate::model::HarvestRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackCount {
    pub stack: String,
    pub count: usize,
}

/// Most common stack tags among `ok` records, most frequent first.
/// Ties are broken alphabetically so the listing is stable.
pub fn top_stacks(records: &[HarvestRecord], limit: usize) -> Vec<StackCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in records
        .iter()
        .filter_map(HarvestRecord::signals)
        .flat_map(|s| s.stack_tags.iter())
        .filter(|tag| !tag.is_empty())
    {
        *counts.entry(tag.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<StackCount> = counts
        .into_iter()
        .map(|(stack, count)| StackCount {
            stack: stack.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.stack.cmp(&b.stack)));
    ranked.truncate(limit);
    ranked
}

/// `ok` records tagged with `stack`, compared case-insensitively.
pub fn records_with_stack<'a>(records: &'a [HarvestRecord], stack: &str) -> Vec<&'a HarvestRecord> {
    records
        .iter()
        .filter(|r| {
            r.signals()
                .is_some_and(|s| s.stack_tags.iter().any(|t| t.eq_ignore_ascii_case(stack)))
        })
        .collect()
}
