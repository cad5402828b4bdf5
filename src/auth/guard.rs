//! Request-level gate for page routes. It never looks at the datastore and
//! never gates `/api/`; API handlers enforce their own session and
//! ownership rules.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::extractors::resolve_session;
use crate::{config::GuardConfig, state::AppState};

const API_PREFIX: &str = "/api/";
const ASSET_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Pass,
    Redirect(String),
}

fn is_asset_or_api(path: &str) -> bool {
    path.starts_with(API_PREFIX)
        || ASSET_PREFIXES.iter().any(|p| path.starts_with(p))
        || path.contains('.')
}

/// `/blogs` matches `/blogs` and `/blogs/42`, not `/blogsroll`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// First matching rule wins: assets and API pass, protected paths need a
/// session, public-only paths bounce signed-in users, the rest passes.
pub fn decide(path: &str, has_session: bool, cfg: &GuardConfig) -> GuardDecision {
    if is_asset_or_api(path) {
        return GuardDecision::Pass;
    }
    if cfg.protected_prefixes.iter().any(|p| under_prefix(path, p)) && !has_session {
        return GuardDecision::Redirect(cfg.login_path.clone());
    }
    if cfg.public_only_prefixes.iter().any(|p| under_prefix(path, p)) && has_session {
        return GuardDecision::Redirect(cfg.landing_path.clone());
    }
    GuardDecision::Pass
}

pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let has_session =
        !is_asset_or_api(&path) && resolve_session(req.headers(), &state.sessions).is_some();
    match decide(&path, has_session, &state.config.guard) {
        GuardDecision::Pass => next.run(req).await,
        GuardDecision::Redirect(target) => {
            debug!(%path, %target, "route guard redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GuardConfig {
        GuardConfig::default()
    }

    #[test]
    fn assets_and_api_always_pass() {
        for path in ["/api/blogs", "/api/register", "/_next/app.js", "/static/x", "/favicon.ico"] {
            assert_eq!(decide(path, false, &cfg()), GuardDecision::Pass);
            assert_eq!(decide(path, true, &cfg()), GuardDecision::Pass);
        }
    }

    #[test]
    fn protected_without_session_redirects_to_login() {
        for path in ["/blogs", "/blogs/", "/blogs/abc/edit"] {
            assert_eq!(
                decide(path, false, &cfg()),
                GuardDecision::Redirect("/login".into())
            );
            assert_eq!(decide(path, true, &cfg()), GuardDecision::Pass);
        }
    }

    #[test]
    fn public_only_with_session_redirects_to_landing() {
        for path in ["/login", "/register"] {
            assert_eq!(
                decide(path, true, &cfg()),
                GuardDecision::Redirect("/blogs".into())
            );
            assert_eq!(decide(path, false, &cfg()), GuardDecision::Pass);
        }
    }

    #[test]
    fn unrelated_paths_pass() {
        for path in ["/", "/user/123", "/blogsroll", "/health"] {
            assert_eq!(decide(path, false, &cfg()), GuardDecision::Pass);
            assert_eq!(decide(path, true, &cfg()), GuardDecision::Pass);
        }
    }

    #[test]
    fn honours_configured_targets() {
        let custom = GuardConfig {
            login_path: "/signin".into(),
            landing_path: "/home".into(),
            protected_prefixes: vec!["/drafts/".into()],
            public_only_prefixes: vec!["/signin".into()],
        };
        assert_eq!(
            decide("/drafts/7", false, &custom),
            GuardDecision::Redirect("/signin".into())
        );
        assert_eq!(
            decide("/signin", true, &custom),
            GuardDecision::Redirect("/home".into())
        );
    }
}
