//! Pure filter/sort/search functions over in-memory event lists.
//!
//! Every function here is total: no filter panics on empty input, events
//! missing an optional field simply do not match filters that need it, and
//! inputs are never mutated. Handlers compose these through [`EventQuery`]
//! so the one ordering rule (date filtering runs before sort) is enforced
//! in a single place.

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use serde::Deserialize;

use crate::models::{Event, EventStatus, EventWithDistance};

/// Earth radius used by the Haversine formula, km.
const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_LAT: f64 = 35.6812;
pub const DEFAULT_LNG: f64 = 139.7671;
pub const DEFAULT_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Weekend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceFilter {
    #[default]
    All,
    Free,
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateAsc,
    DateDesc,
    Newest,
}

/// Today in UTC, normalized to midnight. The engine takes the date as an
/// argument so tests stay deterministic.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Date-range filter. An exact `date` wins over `range`; `week` is the
/// inclusive window `[today, today+7]`; `weekend` keeps today-or-later
/// events falling on a Saturday or Sunday.
pub fn filter_by_date_range(
    events: &[Event],
    range: DateRange,
    exact: Option<&str>,
    today: NaiveDate,
) -> Vec<Event> {
    if let Some(d) = exact {
        return events.iter().filter(|e| e.date == d).cloned().collect();
    }
    let today_str = today.to_string();
    match range {
        DateRange::All => events.to_vec(),
        DateRange::Today => events.iter().filter(|e| e.date == today_str).cloned().collect(),
        DateRange::Week => {
            let week_end = today
                .checked_add_days(Days::new(7))
                .map(|d| d.to_string())
                .unwrap_or_else(|| "9999-12-31".to_string());
            events
                .iter()
                .filter(|e| e.date >= today_str && e.date <= week_end)
                .cloned()
                .collect()
        }
        DateRange::Weekend => events
            .iter()
            .filter(|e| e.date >= today_str && falls_on_weekend(&e.date))
            .cloned()
            .collect(),
    }
}

fn falls_on_weekend(date: &str) -> bool {
    // Unparsable dates never match.
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .unwrap_or(false)
}

/// Keeps events matching the given prefecture and/or city. Absent or empty
/// arguments are no-ops; both together are ANDed.
pub fn filter_by_region(
    events: &[Event],
    prefecture: Option<&str>,
    city: Option<&str>,
) -> Vec<Event> {
    events
        .iter()
        .filter(|e| match prefecture {
            Some(p) if !p.is_empty() => e.prefecture == p,
            _ => true,
        })
        .filter(|e| match city {
            Some(c) if !c.is_empty() => e.city == c,
            _ => true,
        })
        .cloned()
        .collect()
}

/// AND semantics: an event passes only if it carries every requested tag.
/// An empty request is a no-op.
pub fn filter_by_tags(events: &[Event], tags: &[String]) -> Vec<Event> {
    if tags.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| tags.iter().all(|t| e.tags.contains(t)))
        .cloned()
        .collect()
}

pub fn filter_by_price(events: &[Event], filter: PriceFilter) -> Vec<Event> {
    match filter {
        PriceFilter::All => events.to_vec(),
        PriceFilter::Free => events.iter().filter(|e| e.price == 0).cloned().collect(),
        PriceFilter::Paid => events.iter().filter(|e| e.price > 0).cloned().collect(),
    }
}

pub fn filter_by_child_friendly(events: &[Event], child_friendly: bool) -> Vec<Event> {
    if !child_friendly {
        return events.to_vec();
    }
    events.iter().filter(|e| e.child_friendly).cloned().collect()
}

pub fn filter_available_only(events: &[Event], on: bool, today: NaiveDate) -> Vec<Event> {
    if !on {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| e.status(today) == EventStatus::Available)
        .cloned()
        .collect()
}

/// Case-insensitive substring search over title, description, organizer
/// name and location (OR across fields). Blank queries return the input.
pub fn search_events(events: &[Event], query: &str) -> Vec<Event> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return events.to_vec();
    }
    events
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&q)
                || e.description.to_lowercase().contains(&q)
                || e.organizer_name.to_lowercase().contains(&q)
                || e.location.to_lowercase().contains(&q)
        })
        .cloned()
        .collect()
}

/// Stable, non-destructive sort. Date orders tiebreak on start time;
/// `newest` orders by creation timestamp descending.
pub fn sort_events(events: &[Event], order: SortOrder) -> Vec<Event> {
    let mut v = events.to_vec();
    match order {
        SortOrder::DateAsc => {
            v.sort_by(|a, b| (a.date.as_str(), a.start_time.as_str()).cmp(&(b.date.as_str(), b.start_time.as_str())))
        }
        SortOrder::DateDesc => {
            v.sort_by(|a, b| (b.date.as_str(), b.start_time.as_str()).cmp(&(a.date.as_str(), a.start_time.as_str())))
        }
        SortOrder::Newest => v.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
    v
}

/// Great-circle distance in km (Haversine).
pub fn calc_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Annotates every event that has coordinates with its distance from the
/// center and sorts ascending by it. Events without coordinates are dropped.
pub fn annotate_distance(events: &[Event], lat: f64, lng: f64) -> Vec<EventWithDistance> {
    let mut v: Vec<EventWithDistance> = events
        .iter()
        .filter_map(|e| match (e.latitude, e.longitude) {
            (Some(elat), Some(elng)) => Some(EventWithDistance {
                distance_km: calc_distance_km(lat, lng, elat, elng),
                event: e.clone(),
            }),
            _ => None,
        })
        .collect();
    v.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    v
}

/// Radius search: [`annotate_distance`] then keep distance <= `radius_km`.
pub fn filter_by_radius(
    events: &[Event],
    lat: f64,
    lng: f64,
    radius_km: f64,
) -> Vec<EventWithDistance> {
    annotate_distance(events, lat, lng)
        .into_iter()
        .filter(|e| e.distance_km <= radius_km)
        .collect()
}

/// Explicit date window used by the map endpoint: missing start defaults to
/// today, missing end to the far future; both missing is a no-op.
pub fn filter_by_date_window(
    events: &[Event],
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Vec<Event> {
    if start.is_none() && end.is_none() {
        return events.to_vec();
    }
    let today_str = today.to_string();
    let start = start.unwrap_or(&today_str);
    let end = end.unwrap_or("9999-12-31");
    events
        .iter()
        .filter(|e| e.date.as_str() >= start && e.date.as_str() <= end)
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub has_more: bool,
}

/// Slice `[offset, offset+limit)` of `items`, with the total count taken
/// before slicing. `limit` is capped at [`MAX_LIMIT`].
pub fn paginate<T: Clone>(items: &[T], limit: usize, offset: usize) -> Page<T> {
    let limit = limit.min(MAX_LIMIT);
    let total = items.len();
    let start = offset.min(total);
    let end = offset.saturating_add(limit).min(total);
    Page {
        items: items[start..end].to_vec(),
        total,
        has_more: offset.saturating_add(limit) < total,
    }
}

/// Declared filter pipeline for the listing endpoint. Fields left at their
/// defaults are no-ops, so handlers can deserialize straight from the query
/// string and hand the whole thing to [`EventQuery::apply`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub range: DateRange,
    pub date: Option<String>,
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub tags: Vec<String>,
    pub price: PriceFilter,
    pub child_friendly: bool,
    pub available_only: bool,
    pub q: Option<String>,
    pub sort: SortOrder,
}

impl EventQuery {
    /// Runs every filter in the fixed order, date filtering first so the
    /// today/week/weekend windows are anchored before any reordering.
    pub fn apply(&self, events: &[Event], today: NaiveDate) -> Vec<Event> {
        let mut v = filter_by_date_range(events, self.range, self.date.as_deref(), today);
        v = filter_by_region(&v, self.prefecture.as_deref(), self.city.as_deref());
        v = filter_by_tags(&v, &self.tags);
        v = filter_by_price(&v, self.price);
        v = filter_by_child_friendly(&v, self.child_friendly);
        v = filter_available_only(&v, self.available_only, today);
        if let Some(q) = &self.q {
            v = search_events(&v, q);
        }
        sort_events(&v, self.sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_identity_and_symmetry() {
        assert_eq!(calc_distance_km(35.0, 139.0, 35.0, 139.0), 0.0);
        let d1 = calc_distance_km(35.6812, 139.7671, 34.7025, 135.4959);
        let d2 = calc_distance_km(34.7025, 135.4959, 35.6812, 139.7671);
        assert!((d1 - d2).abs() < 1e-9);
        // Tokyo Station to Osaka Station is roughly 400 km
        assert!(d1 > 390.0 && d1 < 410.0);
    }

    #[test]
    fn weekend_predicate() {
        assert!(falls_on_weekend("2025-02-15")); // Saturday
        assert!(falls_on_weekend("2025-02-16")); // Sunday
        assert!(!falls_on_weekend("2025-02-17")); // Monday
        assert!(!falls_on_weekend("not-a-date"));
    }

    #[test]
    fn paginate_bounds() {
        let items: Vec<i32> = (0..10).collect();
        let p = paginate(&items, 4, 8);
        assert_eq!(p.items, vec![8, 9]);
        assert_eq!(p.total, 10);
        assert!(!p.has_more);
        let p = paginate(&items, 4, 4);
        assert_eq!(p.items, vec![4, 5, 6, 7]);
        assert!(p.has_more);
        // offset past the end yields an empty page, never a panic
        let p = paginate(&items, 4, 100);
        assert!(p.items.is_empty());
        assert!(!p.has_more);
    }

    #[test]
    fn paginate_caps_limit() {
        let items: Vec<i32> = (0..500).collect();
        let p = paginate(&items, 10_000, 0);
        assert_eq!(p.items.len(), MAX_LIMIT);
        assert!(p.has_more);
    }
}
