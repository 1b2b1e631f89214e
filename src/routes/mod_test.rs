use super::*;
use crate::state::auth::Session;

fn signed_in() -> AuthState {
    AuthState::authenticated(Session {
        user_id: "u1".into(),
        name: "Admin".into(),
        email: "admin@example.com".into(),
        token: "tok123".into(),
    })
}

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn parses_public_routes() {
    assert_eq!(Route::parse("/"), Route::Home);
    assert_eq!(Route::parse(""), Route::Home);
    assert_eq!(Route::parse("/services"), Route::Services);
    assert_eq!(Route::parse("/services/abc123"), Route::ServiceDetail("abc123".into()));
    assert_eq!(Route::parse("/blog/p1"), Route::BlogPost("p1".into()));
    assert_eq!(Route::parse("/contact/"), Route::Contact);
}

#[test]
fn parses_hash_locations_and_ignores_query() {
    assert_eq!(Route::parse("#/dashboard"), Route::Dashboard);
    assert_eq!(Route::parse("/gallery?page=2"), Route::Gallery);
    assert_eq!(Route::parse("admin"), Route::AdminLogin);
}

#[test]
fn unknown_paths_are_not_found() {
    assert_eq!(Route::parse("/services/a/b"), Route::NotFound("/services/a/b".into()));
    assert_eq!(Route::parse("/reviews"), Route::NotFound("/reviews".into()));
}

#[test]
fn path_round_trips() {
    for route in [Route::Home, Route::ServiceDetail("s1".into()), Route::Dashboard, Route::BlogPost("p".into())] {
        assert_eq!(Route::parse(&route.path()), route);
    }
}

// =============================================================================
// Resolution
// =============================================================================

#[test]
fn dashboard_is_guarded() {
    assert_eq!(resolve(Route::Dashboard, &AuthState::default()), GuardDecision::Loading);
    assert_eq!(
        resolve(Route::Dashboard, &AuthState::anonymous()),
        GuardDecision::Redirect { to: Route::AdminLogin, replace: true }
    );
    assert_eq!(resolve(Route::Dashboard, &signed_in()), GuardDecision::Render(Route::Dashboard));
}

#[test]
fn public_routes_render_for_everyone() {
    assert_eq!(resolve(Route::Booking, &AuthState::anonymous()), GuardDecision::Render(Route::Booking));
    assert_eq!(resolve(Route::Blog, &AuthState::default()), GuardDecision::Render(Route::Blog));
}

#[test]
fn login_forwards_signed_in_operator() {
    assert_eq!(
        resolve(Route::AdminLogin, &signed_in()),
        GuardDecision::Redirect { to: Route::Dashboard, replace: false }
    );
    assert_eq!(resolve(Route::AdminLogin, &AuthState::anonymous()), GuardDecision::Render(Route::AdminLogin));
}
