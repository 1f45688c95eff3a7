use std::collections::HashMap;
use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{Auth, Role};
use crate::error::ApiError;
use crate::models::*;
use crate::query::{
    self, DateRange, EventQuery, PriceFilter, SortOrder, DEFAULT_LAT, DEFAULT_LIMIT, DEFAULT_LNG,
    DEFAULT_RADIUS_KM,
};
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::resource("/events")
                    .route(web::get().to(list_events))
                    .route(web::post().to(create_event)),
            )
            .service(web::resource("/events/map").route(web::get().to(map_events)))
            .service(web::resource("/events/{id}").route(web::get().to(get_event)))
            .service(
                web::resource("/events/{id}/volunteer-roles")
                    .route(web::get().to(list_volunteer_roles))
                    .route(web::post().to(create_volunteer_role)),
            )
            .service(
                web::resource("/recruitments")
                    .route(web::get().to(list_recruitments))
                    .route(web::post().to(create_recruitment)),
            )
            .service(web::resource("/volunteer/roles").route(web::get().to(browse_volunteer_roles)))
            .service(web::resource("/volunteer/apply").route(web::post().to(volunteer_apply)))
            .service(web::resource("/dm/threads").route(web::get().to(list_dm_threads)))
            .service(
                web::resource("/dm/{threadId}")
                    .route(web::get().to(get_dm_thread))
                    .route(web::post().to(post_dm_thread)),
            )
            .service(web::resource("/auth/me").route(web::get().to(auth_me)))
            .service(web::resource("/auth/refresh").route(web::post().to(refresh_token))),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub rate_limiter: RateLimiterFacade,
}

// ---------------- query-string parsing -----------------------------
//
// All parameters are read as raw strings and parsed leniently: anything
// malformed falls back to its documented default instead of failing the
// request.

#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    pub prefecture: Option<String>,
    pub city: Option<String>,
    pub tags: Option<String>,
    pub price: Option<String>,
    pub child_friendly: Option<String>,
    pub available_only: Option<String>,
    pub q: Option<String>,
    pub range: Option<String>,
    pub date: Option<String>,
    pub sort: Option<String>,
}

fn parse_price(s: Option<&str>) -> PriceFilter {
    match s {
        Some("free") => PriceFilter::Free,
        Some("paid") => PriceFilter::Paid,
        _ => PriceFilter::All,
    }
}

fn parse_range(s: Option<&str>) -> DateRange {
    match s {
        Some("today") => DateRange::Today,
        Some("week") => DateRange::Week,
        Some("weekend") => DateRange::Weekend,
        _ => DateRange::All,
    }
}

fn parse_sort(s: Option<&str>) -> SortOrder {
    match s {
        Some("date_desc") => SortOrder::DateDesc,
        Some("newest") => SortOrder::Newest,
        _ => SortOrder::DateAsc,
    }
}

fn parse_flag(s: Option<&str>) -> bool {
    s == Some("true")
}

fn parse_tags(s: Option<&str>) -> Vec<String> {
    s.map(|t| t.split(',').filter(|p| !p.is_empty()).map(str::to_string).collect())
        .unwrap_or_default()
}

impl ListEventsParams {
    fn to_query(&self) -> EventQuery {
        EventQuery {
            range: parse_range(self.range.as_deref()),
            date: self.date.clone().filter(|d| !d.is_empty()),
            prefecture: self.prefecture.clone(),
            city: self.city.clone(),
            tags: parse_tags(self.tags.as_deref()),
            price: parse_price(self.price.as_deref()),
            child_friendly: parse_flag(self.child_friendly.as_deref()),
            available_only: parse_flag(self.available_only.as_deref()),
            q: self.q.clone(),
            sort: parse_sort(self.sort.as_deref()),
        }
    }
}

// ---------------- events --------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(
        ("prefecture" = Option<String>, Query, description = "Exact prefecture match"),
        ("city" = Option<String>, Query, description = "Exact city/area match"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags; event must carry all of them"),
        ("price" = Option<String>, Query, description = "all | free | paid"),
        ("child_friendly" = Option<String>, Query, description = "true keeps child-friendly events only"),
        ("available_only" = Option<String>, Query, description = "true keeps events with derived status available"),
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("range" = Option<String>, Query, description = "all | today | week | weekend"),
        ("date" = Option<String>, Query, description = "Exact YYYY-MM-DD date; overrides range"),
        ("sort" = Option<String>, Query, description = "date_asc | date_desc | newest"),
    ),
    responses((status = 200, description = "Filtered events", body = [Event]))
)]
pub async fn list_events(
    data: web::Data<AppState>,
    params: web::Query<ListEventsParams>,
) -> Result<HttpResponse, ApiError> {
    let events = data.repo.list_events().await?;
    let filtered = params.to_query().apply(&events, query::today_utc());
    Ok(HttpResponse::Ok().json(filtered))
}

#[derive(Debug, Deserialize)]
pub struct MapParams {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub price: Option<String>,
    pub child_friendly: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapResponse {
    pub events: Vec<EventWithDistance>,
    pub total: usize,
    pub has_more: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/events/map",
    params(
        ("lat" = Option<String>, Query, description = "Search center latitude"),
        ("lng" = Option<String>, Query, description = "Search center longitude"),
        ("radius" = Option<String>, Query, description = "Radius in km, capped at 50"),
        ("start" = Option<String>, Query, description = "Window start date, defaults to today"),
        ("end" = Option<String>, Query, description = "Window end date"),
        ("price" = Option<String>, Query, description = "all | free | paid"),
        ("child_friendly" = Option<String>, Query, description = "true keeps child-friendly events only"),
        ("limit" = Option<String>, Query, description = "Page size, capped at 200"),
        ("offset" = Option<String>, Query, description = "Page offset"),
    ),
    responses((status = 200, description = "Events near a point", body = MapResponse))
)]
pub async fn map_events(
    data: web::Data<AppState>,
    params: web::Query<MapParams>,
) -> Result<HttpResponse, ApiError> {
    let today = query::today_utc();
    let radius = params
        .radius
        .as_deref()
        .and_then(|r| r.parse::<f64>().ok())
        .unwrap_or(DEFAULT_RADIUS_KM)
        .min(DEFAULT_RADIUS_KM);
    let limit = params
        .limit
        .as_deref()
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(DEFAULT_LIMIT);
    let offset = params
        .offset
        .as_deref()
        .and_then(|o| o.parse::<usize>().ok())
        .unwrap_or(0);
    let lat = params.lat.as_deref().and_then(|v| v.parse::<f64>().ok());
    let lng = params.lng.as_deref().and_then(|v| v.parse::<f64>().ok());

    let mut events = data.repo.list_events().await?;
    events = query::filter_by_date_window(
        &events,
        params.start.as_deref(),
        params.end.as_deref(),
        today,
    );
    events = query::filter_by_price(&events, parse_price(params.price.as_deref()));
    events =
        query::filter_by_child_friendly(&events, parse_flag(params.child_friendly.as_deref()));

    // The radius cut only applies when the caller supplied a center; with
    // no center everything with coordinates is returned, distance-sorted
    // from the default center.
    let annotated = match (lat, lng) {
        (Some(lat), Some(lng)) => query::filter_by_radius(&events, lat, lng, radius),
        _ => query::annotate_distance(&events, DEFAULT_LAT, DEFAULT_LNG),
    };

    let page = query::paginate(&annotated, limit, offset);
    Ok(HttpResponse::Ok().json(MapResponse {
        events: page.items,
        total: page.total,
        has_more: page.has_more,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = NewEvent,
    responses(
        (status = 201, description = "Event created (with its default volunteer role)", body = Event),
        (status = 403, description = "Forbidden - organizers only"),
    )
)]
pub async fn create_event(
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<NewEvent>,
) -> Result<HttpResponse, ApiError> {
    if !auth.0.roles.iter().any(|r| matches!(r, Role::Organizer | Role::Admin)) {
        return Err(ApiError::Forbidden);
    }
    if !data.rate_limiter.allow_event(auth.user_id()) {
        return Ok(HttpResponse::TooManyRequests().finish());
    }
    let event = data.repo.create_event(payload.into_inner(), auth.user_id()).await?;
    metrics::increment_counter!("tsudoi_events_created_total");
    Ok(HttpResponse::Created().json(event))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 404, description = "Event not found"),
    )
)]
pub async fn get_event(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let event = data.repo.get_event(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(event))
}

// ---------------- volunteer roles -----------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/volunteer-roles",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Roles for the event", body = [VolunteerRole]),
        (status = 404, description = "Event not found"),
    )
)]
pub async fn list_volunteer_roles(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let event_id = path.into_inner();
    data.repo.get_event(&event_id).await?;
    let roles = data.repo.list_roles(&event_id).await?;
    Ok(HttpResponse::Ok().json(roles))
}

#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/volunteer-roles",
    request_body = NewVolunteerRole,
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 201, description = "Role created", body = VolunteerRole),
        (status = 403, description = "Forbidden - event organizer only"),
        (status = 404, description = "Event not found"),
    )
)]
pub async fn create_volunteer_role(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<NewVolunteerRole>,
) -> Result<HttpResponse, ApiError> {
    let event_id = path.into_inner();
    let event = data.repo.get_event(&event_id).await?;
    let is_admin = auth.0.roles.iter().any(|r| matches!(r, Role::Admin));
    if event.organizer_id != auth.user_id() && !is_admin {
        return Err(ApiError::Forbidden);
    }
    let mut new = payload.into_inner();
    new.event_id = event_id;
    let role = data.repo.create_role(new).await?;
    Ok(HttpResponse::Created().json(role))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBrowseParams {
    pub prefecture: Option<String>,
    pub role_type: Option<String>,
    pub event_id: Option<String>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub date: String,
    pub prefecture: String,
}

/// Role enriched with its event's headline data for browse listings.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleWithEvent {
    #[serde(flatten)]
    pub role: VolunteerRole,
    pub event: Option<EventSummary>,
    pub organizer_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/volunteer/roles",
    params(
        ("prefecture" = Option<String>, Query, description = "Keep roles whose event is in this prefecture"),
        ("roleType" = Option<String>, Query, description = "Exact role type match"),
        ("eventId" = Option<String>, Query, description = "Roles of a single event"),
    ),
    responses((status = 200, description = "Roles across all events, each with its event summary", body = [RoleWithEvent]))
)]
pub async fn browse_volunteer_roles(
    data: web::Data<AppState>,
    params: web::Query<RoleBrowseParams>,
) -> Result<HttpResponse, ApiError> {
    let events: HashMap<String, Event> = data
        .repo
        .list_events()
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
    let mut roles = data.repo.list_all_roles().await?;

    if let Some(event_id) = &params.event_id {
        roles.retain(|r| &r.event_id == event_id);
    }
    if let Some(role_type) = &params.role_type {
        roles.retain(|r| &r.role_type == role_type);
    }
    if let Some(prefecture) = &params.prefecture {
        // roles of vanished events have no prefecture and drop out
        roles.retain(|r| {
            events.get(&r.event_id).map(|e| &e.prefecture == prefecture).unwrap_or(false)
        });
    }

    let enriched: Vec<RoleWithEvent> = roles
        .into_iter()
        .map(|role| {
            let event = events.get(&role.event_id);
            RoleWithEvent {
                organizer_id: event.map(|e| e.organizer_id.clone()),
                event: event.map(|e| EventSummary {
                    id: e.id.clone(),
                    title: e.title.clone(),
                    date: e.date.clone(),
                    prefecture: e.prefecture.clone(),
                }),
                role,
            }
        })
        .collect();
    Ok(HttpResponse::Ok().json(enriched))
}

// ---------------- recruitments ---------------------------------------

#[derive(Debug, Deserialize)]
pub struct RecruitmentListParams {
    pub prefecture: Option<String>,
    pub tags: Option<String>,
    #[serde(rename = "type")]
    pub recruitment_type: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Recruitment joined with its event, when it has one.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecruitmentWithEvent {
    #[serde(flatten)]
    pub recruitment: Recruitment,
    pub event: Option<Event>,
}

#[utoipa::path(
    get,
    path = "/api/v1/recruitments",
    params(
        ("prefecture" = Option<String>, Query, description = "Keep recruitments whose event is in this prefecture"),
        ("tags" = Option<String>, Query, description = "Comma-separated tags; the event must carry all of them"),
        ("type" = Option<String>, Query, description = "Exact recruitment type match"),
        ("date_from" = Option<String>, Query, description = "Keep events on or after this date; eventless recruitments always pass"),
        ("date_to" = Option<String>, Query, description = "Keep events on or before this date; eventless recruitments always pass"),
    ),
    responses((status = 200, description = "Recruitments, most recently posted first", body = [RecruitmentWithEvent]))
)]
pub async fn list_recruitments(
    data: web::Data<AppState>,
    params: web::Query<RecruitmentListParams>,
) -> Result<HttpResponse, ApiError> {
    let events: HashMap<String, Event> = data
        .repo
        .list_events()
        .await?
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
    let tags = parse_tags(params.tags.as_deref());

    let mut list: Vec<RecruitmentWithEvent> = data
        .repo
        .list_recruitments()
        .await?
        .into_iter()
        .map(|recruitment| {
            let event =
                recruitment.event_id.as_ref().and_then(|id| events.get(id)).cloned();
            RecruitmentWithEvent { recruitment, event }
        })
        .collect();

    if let Some(prefecture) = &params.prefecture {
        list.retain(|r| r.event.as_ref().map(|e| &e.prefecture == prefecture).unwrap_or(false));
    }
    if !tags.is_empty() {
        list.retain(|r| {
            r.event
                .as_ref()
                .map(|e| tags.iter().all(|t| e.tags.contains(t)))
                .unwrap_or(false)
        });
    }
    if let Some(recruitment_type) = &params.recruitment_type {
        list.retain(|r| &r.recruitment.recruitment_type == recruitment_type);
    }
    if params.date_from.is_some() || params.date_to.is_some() {
        // recruitments without an event have no date and pass the window
        list.retain(|r| match &r.event {
            Some(e) => {
                params.date_from.as_deref().map(|from| e.date.as_str() >= from).unwrap_or(true)
                    && params.date_to.as_deref().map(|to| e.date.as_str() <= to).unwrap_or(true)
            }
            None => true,
        });
    }

    Ok(HttpResponse::Ok().json(list))
}

#[utoipa::path(
    post,
    path = "/api/v1/recruitments",
    request_body = NewRecruitment,
    responses(
        (status = 201, description = "Recruitment posted", body = Recruitment),
        (status = 403, description = "Forbidden - organizers only"),
        (status = 404, description = "Referenced event not found"),
    )
)]
pub async fn create_recruitment(
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<NewRecruitment>,
) -> Result<HttpResponse, ApiError> {
    if !auth.0.roles.iter().any(|r| matches!(r, Role::Organizer | Role::Admin)) {
        return Err(ApiError::Forbidden);
    }
    let recruitment = data.repo.create_recruitment(payload.into_inner(), auth.user_id()).await?;
    Ok(HttpResponse::Created().json(recruitment))
}

// ---------------- volunteer application -----------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub volunteer_role_id: Option<String>,
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    pub application_id: String,
    pub thread_id: String,
    pub redirect_url: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/volunteer/apply",
    request_body = ApplyRequest,
    responses(
        (status = 200, description = "Application created or already existed", body = ApplyResponse),
        (status = 400, description = "Missing volunteerRoleId"),
        (status = 404, description = "Role not found"),
    )
)]
pub async fn volunteer_apply(
    auth: Auth,
    data: web::Data<AppState>,
    payload: web::Json<ApplyRequest>,
) -> Result<HttpResponse, ApiError> {
    let role_id = payload
        .volunteer_role_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(ApiError::BadRequest)?;
    let role = data.repo.get_role(role_id).await?;
    let event = data.repo.get_event(&role.event_id).await.map_err(|_| {
        // role referencing a vanished event: organizer unknown
        ApiError::BadRequest
    })?;
    if !data.rate_limiter.allow_apply(auth.user_id()) {
        return Ok(HttpResponse::TooManyRequests().finish());
    }
    let (application, thread) = data
        .repo
        .create_application_and_thread(role_id, auth.user_id(), &event.organizer_id, &event.id)
        .await?;
    metrics::increment_counter!("tsudoi_applications_total");
    Ok(HttpResponse::Ok().json(ApplyResponse {
        redirect_url: format!("/dm/{}", thread.id),
        application_id: application.id,
        thread_id: thread.id,
    }))
}

// ---------------- DM threads -----------------------------------------

#[derive(Debug, Deserialize)]
pub struct ThreadListParams {
    #[serde(rename = "as")]
    pub side: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dm/threads",
    params(("as" = Option<String>, Query, description = "organizer | volunteer (default)")),
    responses(
        (status = 200, description = "Caller's threads, most recently active first", body = [Thread]),
        (status = 401, description = "Login required"),
    )
)]
pub async fn list_dm_threads(
    auth: Option<Auth>,
    data: web::Data<AppState>,
    params: web::Query<ThreadListParams>,
) -> Result<HttpResponse, ApiError> {
    let as_organizer = params.side.as_deref() == Some("organizer");
    if as_organizer {
        // organizer view degrades to an empty list when not logged in
        let threads = match &auth {
            Some(a) => data.repo.threads_for_organizer(a.user_id()).await?,
            None => Vec::new(),
        };
        return Ok(HttpResponse::Ok().json(threads));
    }
    let auth = auth.ok_or(ApiError::Unauthorized)?;
    let threads = data.repo.threads_for_volunteer(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(threads))
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ThreadWithMessages {
    pub thread: Thread,
    pub messages: Vec<Message>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dm/{threadId}",
    params(("threadId" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Thread with its messages in chat order", body = ThreadWithMessages),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Thread not found"),
    )
)]
pub async fn get_dm_thread(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let thread = data.repo.get_thread(&path.into_inner()).await?;
    if !can_access_thread(&thread, auth.user_id()) {
        return Err(ApiError::Forbidden);
    }
    let messages = data.repo.messages(&thread.id).await?;
    Ok(HttpResponse::Ok().json(ThreadWithMessages { thread, messages }))
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DmPostBody {
    /// When present, flips the thread status and nothing else.
    pub status: Option<String>,
    pub body: Option<String>,
    /// Accepted alias for `body`; `body` wins when both are sent.
    pub content: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/dm/{threadId}",
    request_body = DmPostBody,
    params(("threadId" = String, Path, description = "Thread id")),
    responses(
        (status = 200, description = "Message appended or status updated"),
        (status = 400, description = "Empty message body"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Thread not found"),
    )
)]
pub async fn post_dm_thread(
    auth: Auth,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<DmPostBody>,
) -> Result<HttpResponse, ApiError> {
    let thread = data.repo.get_thread(&path.into_inner()).await?;
    if !can_access_thread(&thread, auth.user_id()) {
        return Err(ApiError::Forbidden);
    }

    if let Some(raw) = &payload.status {
        // anything but "resolved" normalizes to open
        let status = if raw == "resolved" { ThreadStatus::Resolved } else { ThreadStatus::Open };
        data.repo.set_thread_status(&thread.id, status).await?;
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "status": status })));
    }

    let body = payload
        .body
        .as_deref()
        .or(payload.content.as_deref())
        .unwrap_or("")
        .trim()
        .to_string();
    if body.is_empty() {
        return Err(ApiError::BadRequest);
    }
    if !data.rate_limiter.allow_message(auth.user_id()) {
        return Ok(HttpResponse::TooManyRequests().finish());
    }
    let msg = data.repo.add_message(&thread.id, auth.user_id(), &body).await?;
    metrics::increment_counter!("tsudoi_dm_messages_total");
    Ok(HttpResponse::Ok().json(msg))
}

// ---------------- auth utility endpoints ------------------------------

#[derive(serde::Serialize)]
struct MeResponse {
    id: String,
    role: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user info"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn auth_me(auth: Auth) -> Result<HttpResponse, ApiError> {
    // highest privilege wins (admin > organizer > volunteer)
    let role = if auth.0.roles.iter().any(|r| matches!(r, Role::Admin)) {
        "admin"
    } else if auth.0.roles.iter().any(|r| matches!(r, Role::Organizer)) {
        "organizer"
    } else {
        "volunteer"
    };
    Ok(HttpResponse::Ok().json(MeResponse {
        id: auth.0.sub.clone(),
        role: role.to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    responses(
        (status = 200, description = "Fresh token"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn refresh_token(auth: Auth) -> Result<HttpResponse, ApiError> {
    let jwt = crate::auth::create_jwt(&auth.0.sub, auth.0.roles).map_err(|e| {
        log::error!("jwt encode failed: {e}");
        ApiError::Internal
    })?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "token": jwt })))
}
