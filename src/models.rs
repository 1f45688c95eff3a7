use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub type Id = String;

/// A scheduled community happening. `date` is a zero-padded `YYYY-MM-DD`
/// string and is always compared lexicographically.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub location: String,
    pub address: String,
    pub prefecture: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Yen; 0 = free.
    pub price: i64,
    pub price_note: Option<String>,
    /// Unset = unlimited.
    pub capacity: Option<i64>,
    pub child_friendly: bool,
    pub organizer_id: Id,
    pub organizer_name: String,
    pub rain_policy: Option<String>,
    #[serde(default)]
    pub items_to_bring: Vec<String>,
    pub access: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Computed classification, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Available,
    Full,
    Ended,
}

impl Event {
    pub fn status(&self, today: NaiveDate) -> EventStatus {
        if self.date.as_str() < today.to_string().as_str() {
            EventStatus::Ended
        } else if matches!(self.capacity, Some(c) if c <= 0) {
            EventStatus::Full
        } else {
            EventStatus::Available
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub location: String,
    pub address: String,
    pub prefecture: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: i64,
    pub price_note: Option<String>,
    pub capacity: Option<i64>,
    #[serde(default)]
    pub child_friendly: bool,
    pub organizer_name: String,
    pub rain_policy: Option<String>,
    #[serde(default)]
    pub items_to_bring: Vec<String>,
    pub access: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

/// Event annotated with great-circle distance from a search center.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventWithDistance {
    #[serde(flatten)]
    pub event: Event,
    pub distance_km: f64,
}

/// A staffing need attached to an event, open for application.
/// Date/time and location are human-readable strings, not structured dates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRole {
    pub id: Id,
    pub event_id: Id,
    pub role_type: String,
    pub title: String,
    pub description: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i64,
    pub skills: Option<String>,
    pub perks_text: Option<String>,
    pub has_transport_support: bool,
    pub has_honorarium: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewVolunteerRole {
    pub event_id: Id,
    pub role_type: String,
    pub title: String,
    pub description: String,
    pub date_time: String,
    pub location: String,
    pub capacity: i64,
    pub skills: Option<String>,
    pub perks_text: Option<String>,
    #[serde(default)]
    pub has_transport_support: bool,
    #[serde(default)]
    pub has_honorarium: bool,
}

/// A public call for help, optionally tied to an event. `recruitment_type`
/// is a free string (`volunteer`, `paid_spot`, `job`, ...) kept open-ended
/// like `VolunteerRole::role_type`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recruitment {
    pub id: Id,
    pub event_id: Option<Id>,
    pub organizer_id: Id,
    #[serde(rename = "type")]
    pub recruitment_type: String,
    pub title: String,
    pub description: String,
    pub time_slot: Option<String>,
    pub compensation_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRecruitment {
    pub event_id: Option<Id>,
    #[serde(rename = "type")]
    pub recruitment_type: String,
    pub title: String,
    pub description: String,
    pub time_slot: Option<String>,
    pub compensation_note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Id,
    pub volunteer_role_id: Id,
    pub volunteer_id: Id,
    pub status: ApplicationStatus,
    pub thread_id: Id,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Open,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ThreadKind {
    #[serde(rename = "VOLUNTEER_DM")]
    VolunteerDm,
}

/// 1:1 private channel between an organizer and a volunteer, spawned by an
/// application. Its two participants are exactly `organizer_id` and
/// `volunteer_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: ThreadKind,
    pub event_id: Id,
    pub volunteer_role_id: Id,
    pub organizer_id: Id,
    pub volunteer_id: Id,
    pub status: ThreadStatus,
    pub last_message_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// True iff `user_id` is one of the thread's two participants. This is the
/// sole authorization primitive; handlers must check it before exposing
/// thread contents or accepting a message.
pub fn can_access_thread(thread: &Thread, user_id: &str) -> bool {
    thread.organizer_id == user_id || thread.volunteer_id == user_id
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    pub thread_id: Id,
    pub sender_id: Id,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}
