use crate::models::{
    Application, ApplicationStatus, Event, EventStatus, EventWithDistance, Message, NewEvent,
    NewRecruitment, NewVolunteerRole, Recruitment, Thread, ThreadKind, ThreadStatus,
    VolunteerRole,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::list_events,
        crate::routes::map_events,
        crate::routes::create_event,
        crate::routes::get_event,
        crate::routes::list_volunteer_roles,
        crate::routes::create_volunteer_role,
        crate::routes::browse_volunteer_roles,
        crate::routes::list_recruitments,
        crate::routes::create_recruitment,
        crate::routes::volunteer_apply,
        crate::routes::list_dm_threads,
        crate::routes::get_dm_thread,
        crate::routes::post_dm_thread,
        crate::routes::auth_me,
        crate::routes::refresh_token,
    ),
    components(schemas(
        Event, NewEvent, EventStatus, EventWithDistance,
        VolunteerRole, NewVolunteerRole,
        Recruitment, NewRecruitment,
        Application, ApplicationStatus,
        crate::routes::RoleWithEvent, crate::routes::EventSummary,
        crate::routes::RecruitmentWithEvent,
        Thread, ThreadStatus, ThreadKind, Message,
        crate::routes::MapResponse,
        crate::routes::ApplyRequest, crate::routes::ApplyResponse,
        crate::routes::ThreadWithMessages, crate::routes::DmPostBody,
    )),
    tags(
        (name = "events", description = "Event listing, search and creation"),
        (name = "volunteer", description = "Volunteer roles and applications"),
        (name = "dm", description = "Organizer/volunteer direct-message threads"),
    )
)]
pub struct ApiDoc;
