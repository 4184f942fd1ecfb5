//! Organizer authorization with the catalog service
//!
//! `/login` redirects to the accounts service with a random `state` kept in a
//! cookie; `/callback` checks it, exchanges the code and starts a fresh
//! session holding the token.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{redirect_with_notice, NoticeLevel};
use crate::credential::{
    clear_cookie, read_cookie, session_id, set_cookie, SESSION_COOKIE, STATE_COOKIE,
};
use crate::AppState;

/// Query parameters the accounts service sends back
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
}

/// GET /login
pub async fn login(State(state): State<AppState>) -> Response {
    let oauth_state = Uuid::new_v4().to_string();
    match state.auth_flow.authorize_url(&oauth_state) {
        Ok(url) => (
            [(header::SET_COOKIE, set_cookie(STATE_COOKIE, &oauth_state))],
            Redirect::to(&url),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Cannot start authorization");
            redirect_with_notice(
                "/admin",
                NoticeLevel::Error,
                "Spotify login is not configured on this server",
            )
            .into_response()
        }
    }
}

/// GET /callback
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error.as_deref() {
        warn!(error = %error, "Authorization denied");
        return redirect_with_notice("/admin", NoticeLevel::Error, "Spotify authorization was denied")
            .into_response();
    }

    let expected = read_cookie(&headers, STATE_COOKIE);
    if expected.is_none() || expected != params.state {
        warn!("Authorization callback with mismatched state");
        return redirect_with_notice(
            "/admin",
            NoticeLevel::Error,
            "Login expired or was tampered with, please try again",
        )
        .into_response();
    }

    let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
        return redirect_with_notice("/admin", NoticeLevel::Error, "Missing authorization code")
            .into_response();
    };

    let token = match state.auth_flow.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Authorization code exchange failed");
            return redirect_with_notice("/admin", NoticeLevel::Error, "Spotify login failed")
                .into_response();
        }
    };

    // A login always replaces whatever session the browser had.
    if let Some(old) = session_id(&headers) {
        state.sessions.end(old).await;
    }
    let session = state.sessions.start(token).await;
    info!("Organizer session started");

    (
        AppendHeaders([
            (header::SET_COOKIE, set_cookie(SESSION_COOKIE, &session.to_string())),
            (header::SET_COOKIE, clear_cookie(STATE_COOKIE)),
        ]),
        Redirect::to("/admin"),
    )
        .into_response()
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.end(id).await;
    }
    (
        [(header::SET_COOKIE, clear_cookie(SESSION_COOKIE))],
        Redirect::to("/admin"),
    )
        .into_response()
}
