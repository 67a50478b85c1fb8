//! Counts and sums over filtered views
//!
//! Everything here is recomputed from the filtered records on each call;
//! nothing is cached between requests.

use foodbooks_parser::NOT_AVAILABLE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::filter::{Filterable, ListFilter};

/// A record with a summable amount (money, or quantity for usage logs)
pub trait Measurable {
    fn amount(&self) -> Option<Decimal>;

    /// Named sub-totals a list page shows next to the grand total
    fn extra_totals(_records: &[Self]) -> BTreeMap<String, Decimal>
    where
        Self: Sized,
    {
        BTreeMap::new()
    }
}

/// Sum clamped to the `Decimal` range instead of overflowing
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, value| acc.saturating_add(value))
}

/// Sum of present amounts; missing amounts count as zero
pub fn sum_amounts<T: Measurable>(records: &[T]) -> Decimal {
    saturating_sum(records.iter().filter_map(Measurable::amount))
}

/// Sum restricted to records passing a secondary predicate
pub fn sum_where<T, P>(records: &[T], predicate: P) -> Decimal
where
    T: Measurable,
    P: Fn(&T) -> bool,
{
    saturating_sum(
        records
            .iter()
            .filter(|r| predicate(*r))
            .filter_map(Measurable::amount),
    )
}

/// Count and sum for one category value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub count: usize,
    pub total: Decimal,
}

/// Per-value count and sum of a categorical field; records without the
/// field are grouped under `N/A`.
pub fn breakdown<T: Filterable + Measurable>(records: &[T], field: &str) -> BTreeMap<String, CategoryTotal> {
    let mut groups: BTreeMap<String, CategoryTotal> = BTreeMap::new();
    for record in records {
        let key = record.category(field).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let entry = groups.entry(key).or_default();
        entry.count += 1;
        entry.total = entry.total.saturating_add(record.amount().unwrap_or_default());
    }
    groups
}

/// Aggregates of one filtered view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Records in the filtered view
    pub count: usize,
    /// Records in the unfiltered collection
    pub source_count: usize,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BTreeMap<String, CategoryTotal>>,
}

/// Filtered, sorted records plus their aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredView<T> {
    pub records: Vec<T>,
    pub summary: Summary,
}

impl<T: Filterable + Measurable + Clone> FilteredView<T> {
    /// Filter the source collection and aggregate the result
    pub fn build(source: &[T], filter: &ListFilter, breakdown_field: Option<&str>) -> Self {
        let records = filter.apply(source);
        let summary = Summary {
            count: records.len(),
            source_count: source.len(),
            total: sum_amounts(&records),
            extras: T::extra_totals(&records),
            breakdown: breakdown_field.map(|field| breakdown(&records, field)),
        };
        Self { records, summary }
    }

    /// One page of the filtered records; aggregates still cover the whole view
    pub fn paginate(mut self, offset: usize, limit: usize) -> Self {
        self.records = self.records.into_iter().skip(offset).take(limit).collect();
        self
    }
}
