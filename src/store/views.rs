//! Read-side views over the store: paginated listing and chart payloads.

use super::models::ArrivalRow;
use super::repository::ArrivalStore;
use serde::Serialize;

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub number: usize,
    pub num_pages: usize,
    pub per_page: usize,
    pub total: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

/// Slice `items` into a page.
///
/// A missing or non-integer page number yields the first page; a number
/// outside `1..=num_pages` yields the last page. An empty listing still has
/// one (empty) page.
pub fn paginate<T: Clone>(items: &[T], per_page: usize, page: Option<&str>) -> Page<T> {
    let per_page = per_page.max(1);
    let num_pages = items.len().div_ceil(per_page).max(1);

    let number = match page.map(|p| p.trim().parse::<i64>()) {
        None | Some(Err(_)) => 1,
        Some(Ok(n)) if n >= 1 && (n as usize) <= num_pages => n as usize,
        Some(Ok(_)) => num_pages,
    };

    let start = (number - 1) * per_page;
    let end = (start + per_page).min(items.len());
    Page {
        number,
        num_pages,
        per_page,
        total: items.len(),
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
    }
}

pub fn arrivals_paginated(store: &ArrivalStore, per_page: usize, page: Option<&str>) -> Page<ArrivalRow> {
    paginate(&store.rows(), per_page, page)
}

/// Line-chart payload for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub country_name: String,
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

/// Labels are "<Month> <Year>"; the `Total` pseudo-country yields no points.
pub fn country_arrivals(store: &ArrivalStore, country: &str) -> ChartData {
    let rows = store.rows_for_country(country);
    ChartData {
        country_name: country.to_string(),
        labels: rows.iter().map(|r| format!("{} {}", r.month, r.year)).collect(),
        data: rows.iter().map(|r| r.passengers).collect(),
    }
}

pub fn all_arrivals(store: &ArrivalStore) -> Vec<ArrivalRow> {
    store.rows()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Month;
    use crate::store::NewCountryStat;

    #[test]
    fn pagination_edge_cases() {
        let items: Vec<u32> = (1..=25).collect();

        let first = paginate(&items, 10, None);
        assert_eq!(first.number, 1);
        assert_eq!(first.num_pages, 3);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert!(first.has_next());
        assert!(!first.has_previous());

        let last = paginate(&items, 10, Some("3"));
        assert_eq!(last.items, vec![21, 22, 23, 24, 25]);
        assert!(!last.has_next());

        assert_eq!(paginate(&items, 10, Some("abc")).number, 1);
        assert_eq!(paginate(&items, 10, Some("99")).number, 3);
        assert_eq!(paginate(&items, 10, Some("0")).number, 3);
        assert_eq!(paginate(&items, 10, Some("-2")).number, 3);
    }

    #[test]
    fn empty_listing_has_one_page() {
        let page = paginate::<u32>(&[], 10, Some("4"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn chart_data_for_country() {
        let mut store = ArrivalStore::in_memory();
        store.insert_stat(NewCountryStat::new("India", 2020, Month::January, 5)).unwrap();
        store.insert_stat(NewCountryStat::new("India", 2019, Month::December, 7)).unwrap();
        store.insert_stat(NewCountryStat::new("Total", 2019, Month::December, 70)).unwrap();

        let chart = country_arrivals(&store, "India");
        assert_eq!(chart.labels, vec!["December 2019", "January 2020"]);
        assert_eq!(chart.data, vec![7, 5]);

        let total = country_arrivals(&store, "Total");
        assert!(total.labels.is_empty());
        assert_eq!(all_arrivals(&store).len(), 3);
    }
}
