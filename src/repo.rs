use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("internal: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Seed message appended to every freshly created DM thread, attributed to
/// the applying volunteer so no thread is ever empty.
pub const APPLICATION_SEED_MESSAGE: &str =
    "I have applied to this volunteer role. Looking forward to working with you.";

#[async_trait]
pub trait EventRepo: Send + Sync {
    async fn list_events(&self) -> RepoResult<Vec<Event>>;
    async fn get_event(&self, id: &str) -> RepoResult<Event>;
    /// Creates the event plus its default volunteer role.
    async fn create_event(&self, new: NewEvent, organizer_id: &str) -> RepoResult<Event>;
}

#[async_trait]
pub trait VolunteerRoleRepo: Send + Sync {
    async fn list_roles(&self, event_id: &str) -> RepoResult<Vec<VolunteerRole>>;
    /// Every role across all events, oldest first.
    async fn list_all_roles(&self) -> RepoResult<Vec<VolunteerRole>>;
    async fn get_role(&self, id: &str) -> RepoResult<VolunteerRole>;
    async fn create_role(&self, new: NewVolunteerRole) -> RepoResult<VolunteerRole>;
}

#[async_trait]
pub trait RecruitmentRepo: Send + Sync {
    /// Most recently posted first.
    async fn list_recruitments(&self) -> RepoResult<Vec<Recruitment>>;
    async fn create_recruitment(
        &self,
        new: NewRecruitment,
        organizer_id: &str,
    ) -> RepoResult<Recruitment>;
}

#[async_trait]
pub trait DmRepo: Send + Sync {
    /// Idempotent on the (role, volunteer, organizer) triple: re-applying
    /// returns the existing pair instead of creating duplicates.
    async fn create_application_and_thread(
        &self,
        role_id: &str,
        volunteer_id: &str,
        organizer_id: &str,
        event_id: &str,
    ) -> RepoResult<(Application, Thread)>;
    /// Plain lookup; callers authorize separately via `can_access_thread`.
    async fn get_thread(&self, id: &str) -> RepoResult<Thread>;
    async fn threads_for_organizer(&self, organizer_id: &str) -> RepoResult<Vec<Thread>>;
    async fn threads_for_volunteer(&self, volunteer_id: &str) -> RepoResult<Vec<Thread>>;
    async fn messages(&self, thread_id: &str) -> RepoResult<Vec<Message>>;
    /// Trims the body and bumps the thread's `last_message_at`. Does not
    /// reject empty bodies; the handler does that before calling.
    async fn add_message(&self, thread_id: &str, sender_id: &str, body: &str)
        -> RepoResult<Message>;
    /// open -> resolved and resolved -> open are both always permitted.
    async fn set_thread_status(&self, thread_id: &str, status: ThreadStatus) -> RepoResult<()>;
}

pub trait Repo: EventRepo + VolunteerRoleRepo + RecruitmentRepo + DmRepo {}

impl<T> Repo for T where T: EventRepo + VolunteerRoleRepo + RecruitmentRepo + DmRepo {}

fn new_id() -> Id {
    Uuid::new_v4().to_string()
}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_PATH: &str = "data/state.json";

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        events: HashMap<Id, Event>,
        roles: HashMap<Id, VolunteerRole>,
        // absent from pre-existing snapshots
        #[serde(default)]
        recruitments: HashMap<Id, Recruitment>,
        applications: HashMap<Id, Application>,
        threads: HashMap<Id, Thread>,
        messages: HashMap<Id, Vec<Message>>, // keyed by thread id
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Arc<PathBuf>,
    }

    impl InMemRepo {
        fn data_dir() -> PathBuf {
            std::env::var("TSUDOI_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data"))
        }

        fn snapshot_path() -> PathBuf {
            if std::env::var("TSUDOI_DATA_DIR").is_ok() {
                let mut p = Self::data_dir();
                p.push("state.json");
                p
            } else {
                PathBuf::from(SNAPSHOT_PATH)
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        log::info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        log::warn!(
                            "failed to parse snapshot '{}': {e}; starting empty",
                            path.display()
                        );
                        State::default()
                    }
                },
                Err(e) => {
                    log::info!("no snapshot at '{}': {e}; starting empty", path.display());
                    State::default()
                }
            }
        }

        fn persist(&self) {
            let path = self.snapshot_path.clone();
            if let Ok(s) = serde_json::to_vec_pretty(&*self.state.read().unwrap()) {
                if let Some(dir) = path.parent() {
                    let _ = std::fs::create_dir_all(dir);
                }
                if let Err(e) = std::fs::write(&*path, s) {
                    log::error!("failed to write snapshot '{}': {e}", path.display());
                }
            }
        }

        pub fn new() -> Self {
            let snapshot_path = Self::snapshot_path();
            let state = Self::load_state_from(&snapshot_path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Arc::new(snapshot_path),
            }
        }

        /// Default role attached to every newly created event, mirroring
        /// what organizers get without any explicit role setup.
        fn default_role_for(event: &Event) -> VolunteerRole {
            let date_time = match &event.end_time {
                Some(end) => format!("{} {}-{}", event.date, event.start_time, end),
                None => format!("{} {}-", event.date, event.start_time),
            };
            let description = if event.description.is_empty() {
                "Help out at this event.".to_string()
            } else {
                event.description.chars().take(100).collect()
            };
            VolunteerRole {
                id: new_id(),
                event_id: event.id.clone(),
                role_type: "operation".into(),
                title: "Event staff".into(),
                description,
                date_time,
                location: event.location.clone(),
                capacity: 5,
                skills: None,
                perks_text: Some("Honorarium and transport support vary by event.".into()),
                has_transport_support: false,
                has_honorarium: false,
                created_at: event.created_at,
            }
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    #[async_trait]
    impl EventRepo for InMemRepo {
        async fn list_events(&self) -> RepoResult<Vec<Event>> {
            let s = self.state.read().unwrap();
            Ok(s.events.values().cloned().collect())
        }

        async fn get_event(&self, id: &str) -> RepoResult<Event> {
            let s = self.state.read().unwrap();
            s.events.get(id).cloned().ok_or(RepoError::NotFound)
        }

        async fn create_event(&self, new: NewEvent, organizer_id: &str) -> RepoResult<Event> {
            let mut s = self.state.write().unwrap();
            let event = Event {
                id: new_id(),
                title: new.title,
                description: new.description,
                date: new.date,
                start_time: new.start_time,
                end_time: new.end_time,
                location: new.location,
                address: new.address,
                prefecture: new.prefecture,
                city: new.city,
                latitude: new.latitude,
                longitude: new.longitude,
                price: new.price,
                price_note: new.price_note,
                capacity: new.capacity,
                child_friendly: new.child_friendly,
                organizer_id: organizer_id.to_string(),
                organizer_name: new.organizer_name,
                rain_policy: new.rain_policy,
                items_to_bring: new.items_to_bring,
                access: new.access,
                tags: new.tags,
                created_at: Utc::now(),
            };
            let role = Self::default_role_for(&event);
            s.events.insert(event.id.clone(), event.clone());
            s.roles.insert(role.id.clone(), role);
            drop(s);
            self.persist();
            Ok(event)
        }
    }

    #[async_trait]
    impl VolunteerRoleRepo for InMemRepo {
        async fn list_roles(&self, event_id: &str) -> RepoResult<Vec<VolunteerRole>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .roles
                .values()
                .filter(|r| r.event_id == event_id)
                .cloned()
                .collect();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(v)
        }

        async fn list_all_roles(&self) -> RepoResult<Vec<VolunteerRole>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s.roles.values().cloned().collect();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            Ok(v)
        }

        async fn get_role(&self, id: &str) -> RepoResult<VolunteerRole> {
            let s = self.state.read().unwrap();
            s.roles.get(id).cloned().ok_or(RepoError::NotFound)
        }

        async fn create_role(&self, new: NewVolunteerRole) -> RepoResult<VolunteerRole> {
            let mut s = self.state.write().unwrap();
            if !s.events.contains_key(&new.event_id) {
                return Err(RepoError::NotFound);
            }
            let role = VolunteerRole {
                id: new_id(),
                event_id: new.event_id,
                role_type: new.role_type,
                title: new.title,
                description: new.description,
                date_time: new.date_time,
                location: new.location,
                capacity: new.capacity,
                skills: new.skills,
                perks_text: new.perks_text,
                has_transport_support: new.has_transport_support,
                has_honorarium: new.has_honorarium,
                created_at: Utc::now(),
            };
            s.roles.insert(role.id.clone(), role.clone());
            drop(s);
            self.persist();
            Ok(role)
        }
    }

    #[async_trait]
    impl RecruitmentRepo for InMemRepo {
        async fn list_recruitments(&self) -> RepoResult<Vec<Recruitment>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s.recruitments.values().cloned().collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(v)
        }

        async fn create_recruitment(
            &self,
            new: NewRecruitment,
            organizer_id: &str,
        ) -> RepoResult<Recruitment> {
            let mut s = self.state.write().unwrap();
            if let Some(event_id) = &new.event_id {
                if !s.events.contains_key(event_id) {
                    return Err(RepoError::NotFound);
                }
            }
            let recruitment = Recruitment {
                id: new_id(),
                event_id: new.event_id,
                organizer_id: organizer_id.to_string(),
                recruitment_type: new.recruitment_type,
                title: new.title,
                description: new.description,
                time_slot: new.time_slot,
                compensation_note: new.compensation_note,
                created_at: Utc::now(),
            };
            s.recruitments.insert(recruitment.id.clone(), recruitment.clone());
            drop(s);
            self.persist();
            Ok(recruitment)
        }
    }

    #[async_trait]
    impl DmRepo for InMemRepo {
        async fn create_application_and_thread(
            &self,
            role_id: &str,
            volunteer_id: &str,
            organizer_id: &str,
            event_id: &str,
        ) -> RepoResult<(Application, Thread)> {
            // The lookup and insert run under one write lock, so two racing
            // applies for the same triple cannot both create a thread.
            let mut s = self.state.write().unwrap();
            if let Some(existing) = s
                .threads
                .values()
                .find(|t| {
                    t.volunteer_role_id == role_id
                        && t.volunteer_id == volunteer_id
                        && t.organizer_id == organizer_id
                })
                .cloned()
            {
                let app = s
                    .applications
                    .values()
                    .find(|a| a.thread_id == existing.id)
                    .cloned()
                    .ok_or_else(|| {
                        RepoError::Internal(format!("thread {} has no application", existing.id))
                    })?;
                return Ok((app, existing));
            }

            let now = Utc::now();
            let thread = Thread {
                id: new_id(),
                kind: ThreadKind::VolunteerDm,
                event_id: event_id.to_string(),
                volunteer_role_id: role_id.to_string(),
                organizer_id: organizer_id.to_string(),
                volunteer_id: volunteer_id.to_string(),
                status: ThreadStatus::Open,
                last_message_at: now,
                created_at: now,
            };
            let application = Application {
                id: new_id(),
                volunteer_role_id: role_id.to_string(),
                volunteer_id: volunteer_id.to_string(),
                status: ApplicationStatus::Applied,
                thread_id: thread.id.clone(),
                created_at: now,
            };
            let seed = Message {
                id: new_id(),
                thread_id: thread.id.clone(),
                sender_id: volunteer_id.to_string(),
                body: APPLICATION_SEED_MESSAGE.to_string(),
                created_at: now,
                read_at: None,
            };
            s.threads.insert(thread.id.clone(), thread.clone());
            s.applications.insert(application.id.clone(), application.clone());
            s.messages.entry(thread.id.clone()).or_default().push(seed);
            drop(s);
            self.persist();
            Ok((application, thread))
        }

        async fn get_thread(&self, id: &str) -> RepoResult<Thread> {
            let s = self.state.read().unwrap();
            s.threads.get(id).cloned().ok_or(RepoError::NotFound)
        }

        async fn threads_for_organizer(&self, organizer_id: &str) -> RepoResult<Vec<Thread>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .threads
                .values()
                .filter(|t| t.organizer_id == organizer_id)
                .cloned()
                .collect();
            v.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at)); // most recent first
            Ok(v)
        }

        async fn threads_for_volunteer(&self, volunteer_id: &str) -> RepoResult<Vec<Thread>> {
            let s = self.state.read().unwrap();
            let mut v: Vec<_> = s
                .threads
                .values()
                .filter(|t| t.volunteer_id == volunteer_id)
                .cloned()
                .collect();
            v.sort_by(|a, b| b.last_message_at.cmp(&a.last_message_at));
            Ok(v)
        }

        async fn messages(&self, thread_id: &str) -> RepoResult<Vec<Message>> {
            let s = self.state.read().unwrap();
            let mut v = s.messages.get(thread_id).cloned().unwrap_or_default();
            v.sort_by(|a, b| a.created_at.cmp(&b.created_at)); // chat order
            Ok(v)
        }

        async fn add_message(
            &self,
            thread_id: &str,
            sender_id: &str,
            body: &str,
        ) -> RepoResult<Message> {
            let mut s = self.state.write().unwrap();
            if !s.threads.contains_key(thread_id) {
                return Err(RepoError::NotFound);
            }
            let now = Utc::now();
            let msg = Message {
                id: new_id(),
                thread_id: thread_id.to_string(),
                sender_id: sender_id.to_string(),
                body: body.trim().to_string(),
                created_at: now,
                read_at: None,
            };
            s.messages.entry(thread_id.to_string()).or_default().push(msg.clone());
            // sole mutation path for thread recency ordering
            if let Some(t) = s.threads.get_mut(thread_id) {
                t.last_message_at = now;
            }
            drop(s);
            self.persist();
            Ok(msg)
        }

        async fn set_thread_status(
            &self,
            thread_id: &str,
            status: ThreadStatus,
        ) -> RepoResult<()> {
            let mut s = self.state.write().unwrap();
            let thread = s.threads.get_mut(thread_id).ok_or(RepoError::NotFound)?;
            thread.status = status;
            drop(s);
            self.persist();
            Ok(())
        }
    }
}
