use actix_web::{dev::Payload, test, FromRequest};
use std::env;
use tsudoi::{
    auth::{create_jwt, Auth, Claims, Role},
    require_role,
};

// Helper that guarantees a sufficiently long secret for tests.
fn set_secret() {
    env::set_var("JWT_SECRET", "test-secret-must-be-32-bytes-long!!");
}

#[actix_web::test]
async fn jwt_roundtrip_ok() {
    set_secret();
    let token = create_jwt("v42", vec![Role::Volunteer]).expect("token");
    // The Auth extractor is the public way to validate, so use it here.
    let req = test::TestRequest::default()
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_http_request();
    let mut pl = Payload::None;
    let auth = Auth::from_request(&req, &mut pl).await.expect("extract");
    assert_eq!(auth.user_id(), "v42");
    assert!(auth.0.roles.contains(&Role::Volunteer));
}

#[actix_web::test]
async fn extractor_rejects_invalid_token() {
    set_secret();
    let req = test::TestRequest::default()
        .insert_header(("Authorization", "Bearer notatoken"))
        .to_http_request();
    let mut pl = Payload::None;
    assert!(Auth::from_request(&req, &mut pl).await.is_err());
}

#[actix_web::test]
async fn extractor_rejects_missing_header() {
    set_secret();
    let req = test::TestRequest::default().to_http_request();
    let mut pl = Payload::None;
    assert!(Auth::from_request(&req, &mut pl).await.is_err());
}

#[actix_web::test]
async fn require_role_macro_enforces_roles() {
    // Build Auth instances manually with different roles.
    let organizer = Auth(Claims {
        sub: "o1".into(),
        exp: usize::MAX,
        roles: vec![Role::Organizer],
    });
    let volunteer = Auth(Claims {
        sub: "v1".into(),
        exp: usize::MAX,
        roles: vec![Role::Volunteer],
    });

    fn guarded(a: Auth) -> actix_web::Result<()> {
        require_role!(a, Role::Organizer | Role::Admin);
        Ok(())
    }
    assert!(guarded(organizer).is_ok());
    assert!(guarded(volunteer).is_err());
}
