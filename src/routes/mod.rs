//! Routing surface for the public site and the admin dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation layer parses a location into a [`Route`] and asks
//! [`resolve`] what to show. Only the dashboard is protected; the login view
//! forwards operators who are already signed in.

pub mod guard;

use std::fmt;

use crate::state::auth::AuthState;
pub use guard::{GuardDecision, guard, guard_state};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Services,
    ServiceDetail(String),
    Booking,
    Gallery,
    About,
    Blog,
    BlogPost(String),
    Contact,
    /// Operator login view (`/admin`).
    AdminLogin,
    /// Protected dashboard (`/dashboard`).
    Dashboard,
    NotFound(String),
}

impl Route {
    /// Parse a location such as `/services/abc`, `#/blog/1?ref=x` or `dashboard/`.
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["services"] => Self::Services,
            ["services", id] => Self::ServiceDetail((*id).to_owned()),
            ["booking"] => Self::Booking,
            ["gallery"] => Self::Gallery,
            ["about"] => Self::About,
            ["blog"] => Self::Blog,
            ["blog", id] => Self::BlogPost((*id).to_owned()),
            ["contact"] => Self::Contact,
            ["admin"] => Self::AdminLogin,
            ["dashboard"] => Self::Dashboard,
            _ => Self::NotFound(format!("/{}", segments.join("/"))),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_owned(),
            Self::Services => "/services".to_owned(),
            Self::ServiceDetail(id) => format!("/services/{id}"),
            Self::Booking => "/booking".to_owned(),
            Self::Gallery => "/gallery".to_owned(),
            Self::About => "/about".to_owned(),
            Self::Blog => "/blog".to_owned(),
            Self::BlogPost(id) => format!("/blog/{id}"),
            Self::Contact => "/contact".to_owned(),
            Self::AdminLogin => "/admin".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::NotFound(path) => path.clone(),
        }
    }

    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Decide what the navigation layer shows for `route` given the auth state.
#[must_use]
pub fn resolve(route: Route, state: &AuthState) -> GuardDecision<Route> {
    if route.is_protected() {
        return guard_state(state, || route);
    }
    if route == Route::AdminLogin && state.is_authenticated() {
        return GuardDecision::Redirect { to: Route::Dashboard, replace: false };
    }
    GuardDecision::Render(route)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
