//! Route guard for protected views.
//!
//! Pure decision logic over the session store's `(is_loading,
//! is_authenticated)` pair. It holds no state and never touches the network.

use super::Route;
use crate::state::auth::AuthState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision<T> {
    /// Rehydration still running: show a neutral placeholder, nothing else.
    Loading,
    /// Navigate to `to`; `replace` swaps the current history entry.
    Redirect { to: Route, replace: bool },
    Render(T),
}

impl<T> GuardDecision<T> {
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GuardDecision<U> {
        match self {
            Self::Loading => GuardDecision::Loading,
            Self::Redirect { to, replace } => GuardDecision::Redirect { to, replace },
            Self::Render(content) => GuardDecision::Render(f(content)),
        }
    }
}

/// Gate protected content. `content` is only built when it will be rendered.
pub fn guard<T>(is_loading: bool, is_authenticated: bool, content: impl FnOnce() -> T) -> GuardDecision<T> {
    if is_loading {
        return GuardDecision::Loading;
    }
    if !is_authenticated {
        return GuardDecision::Redirect { to: Route::AdminLogin, replace: true };
    }
    GuardDecision::Render(content())
}

pub fn guard_state<T>(state: &AuthState, content: impl FnOnce() -> T) -> GuardDecision<T> {
    guard(state.is_loading(), state.is_authenticated(), content)
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
