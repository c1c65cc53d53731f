//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rytu_mitra_core::ports::PortError;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::RouteError;
use crate::web::auth::session_id_from;
use crate::web::state::AppState;

/// Validates the session cookie and puts the user id into the request
/// extensions. Missing, unknown and expired sessions get 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, RouteError> {
    let session_id = session_id_from(req.headers())
        .ok_or(RouteError::Unauthorized)?
        .to_string();

    let user_id = match state.db.validate_auth_session(&session_id).await {
        Ok(user_id) => user_id,
        Err(PortError::Unauthorized) | Err(PortError::NotFound(_)) => {
            debug!("Rejected an unknown or expired session.");
            return Err(RouteError::Unauthorized);
        }
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            return Err(e.into());
        }
    };

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
