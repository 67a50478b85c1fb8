//! List filtering: text search, date range and categorical predicates,
//! combined with AND, followed by a newest-first sort.

use chrono::{NaiveDate, NaiveDateTime};
use foodbooks_parser::{end_of_day, start_of_day};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Categorical value that switches its filter off
pub const ALL: &str = "All";

/// A record that list pages can search, date-filter and group
pub trait Filterable {
    /// Primary date, `None` when missing or unparseable
    fn date(&self) -> Option<NaiveDateTime>;

    /// Text fields eligible for substring search
    fn search_fields(&self) -> Vec<&str>;

    /// Value of a categorical field, `None` when absent or unknown
    fn category(&self, field: &str) -> Option<String>;
}

/// Active filter values for one list request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Case-insensitive substring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Inclusive lower bound, from the start of that day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound, to the end of that day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    /// Field name -> selected value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, String>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.categories.insert(field.into(), value.into());
        self
    }

    /// True when a from or to bound is set
    pub fn has_date_bounds(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    /// Categorical filters that actually constrain, i.e. not `All` or empty
    pub fn active_categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories
            .iter()
            .filter(|(_, v)| !v.is_empty() && v.as_str() != ALL)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn matches_search<T: Filterable>(&self, record: &T) -> bool {
        let needle = match self.search.as_deref() {
            None | Some("") => return true,
            Some(s) => s.to_lowercase(),
        };
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    fn matches_dates<T: Filterable>(&self, record: &T) -> bool {
        if !self.has_date_bounds() {
            return true;
        }
        let Some(date) = record.date() else {
            return false;
        };
        if let Some(from) = self.from {
            if date < start_of_day(from) {
                return false;
            }
        }
        if let Some(to) = self.to {
            if date > end_of_day(to) {
                return false;
            }
        }
        true
    }

    fn matches_categories<T: Filterable>(&self, record: &T) -> bool {
        self.active_categories()
            .all(|(field, wanted)| record.category(field).as_deref() == Some(wanted))
    }

    /// Whether a record passes every active predicate
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        self.matches_search(record) && self.matches_dates(record) && self.matches_categories(record)
    }

    /// Matching records, newest first
    pub fn apply<T: Filterable + Clone>(&self, records: &[T]) -> Vec<T> {
        let mut out: Vec<T> = records.iter().filter(|r| self.matches(*r)).cloned().collect();
        sort_newest_first(&mut out);
        out
    }
}

/// Stable sort by date descending; undated records sort as the epoch, i.e. last
pub fn sort_newest_first<T: Filterable>(records: &mut [T]) {
    let epoch = start_of_day(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN));
    records.sort_by_key(|r| Reverse(r.date().unwrap_or(epoch)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodbooks_parser::parse_datetime;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        date: &'static str,
        name: &'static str,
        dept: Option<&'static str>,
    }

    impl Filterable for Row {
        fn date(&self) -> Option<NaiveDateTime> {
            parse_datetime(self.date)
        }
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name]
        }
        fn category(&self, field: &str) -> Option<String> {
            match field {
                "dept" => self.dept.map(str::to_string),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, date: "2024-01-10", name: "Flour Mill", dept: Some("Bakery") },
            Row { id: 2, date: "2024-02-05", name: "Sugar Depot", dept: Some("Sweets") },
            Row { id: 3, date: "2024-03-01", name: "flour traders", dept: Some("Bakery") },
            Row { id: 4, date: "garbage", name: "Salt Co", dept: None },
        ]
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(rows: &[Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_empty_filter_sorts_newest_first_with_bad_dates_last() {
        let out = ListFilter::new().apply(&rows());
        assert_eq!(ids(&out), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_february_window() {
        let filter = ListFilter::new().with_from(ymd(2024, 2, 1)).with_to(ymd(2024, 2, 28));
        assert_eq!(ids(&filter.apply(&rows())), vec![2]);
    }

    #[test]
    fn test_bounds_are_inclusive_whole_days() {
        let late = Row { id: 9, date: "2024-02-28 23:59:00", name: "x", dept: None };
        let early = Row { id: 8, date: "2024-02-01 00:00:00", name: "y", dept: None };
        let filter = ListFilter::new().with_from(ymd(2024, 2, 1)).with_to(ymd(2024, 2, 28));
        assert!(filter.matches(&late));
        assert!(filter.matches(&early));
    }

    #[test]
    fn test_open_ended_bounds() {
        let from_only = ListFilter::new().with_from(ymd(2024, 2, 5));
        assert_eq!(ids(&from_only.apply(&rows())), vec![3, 2]);

        let to_only = ListFilter::new().with_to(ymd(2024, 2, 4));
        assert_eq!(ids(&to_only.apply(&rows())), vec![1]);
    }

    #[test]
    fn test_bad_dates_fail_active_date_filter_only() {
        let data = rows();
        let bad = &data[3];
        assert!(ListFilter::new().matches(bad));
        assert!(!ListFilter::new().with_to(ymd(2100, 1, 1)).matches(bad));
    }

    #[test]
    fn test_search_is_case_insensitive_any_field() {
        let filter = ListFilter::new().with_search("FLOUR");
        assert_eq!(ids(&filter.apply(&rows())), vec![3, 1]);
        assert_eq!(ListFilter::new().with_search("").apply(&rows()).len(), 4);
    }

    #[test]
    fn test_categorical_and_sentinel() {
        let bakery = ListFilter::new().with_category("dept", "Bakery");
        assert_eq!(ids(&bakery.apply(&rows())), vec![3, 1]);

        let all = ListFilter::new().with_category("dept", ALL);
        assert_eq!(all.apply(&rows()).len(), 4);

        // Unknown field never matches an active value
        let unknown = ListFilter::new().with_category("colour", "red");
        assert!(unknown.apply(&rows()).is_empty());
    }

    #[test]
    fn test_and_composition_is_monotone() {
        let data = rows();
        let f1 = ListFilter::new().with_search("o");
        let f2 = f1.clone().with_category("dept", "Bakery");
        let f3 = f2.clone().with_from(ymd(2024, 2, 1));

        let n1 = f1.apply(&data).len();
        let n2 = f2.apply(&data).len();
        let n3 = f3.apply(&data).len();
        assert!(n1 >= n2 && n2 >= n3);
        assert_eq!(ids(&f3.apply(&data)), vec![3]);
    }

    #[test]
    fn test_idempotent() {
        let filter = ListFilter::new().with_search("a").with_from(ymd(2024, 1, 1));
        let once = filter.apply(&rows());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut data = vec![
            Row { id: 1, date: "", name: "a", dept: None },
            Row { id: 2, date: "2024-05-01", name: "b", dept: None },
            Row { id: 3, date: "", name: "c", dept: None },
            Row { id: 4, date: "2024-05-01", name: "d", dept: None },
        ];
        sort_newest_first(&mut data);
        assert_eq!(ids(&data), vec![2, 4, 1, 3]);
    }
}
