//! Authentication rejection types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Why the gate rejected a request.
///
/// Every failure in the verification chain resolves to one of these at the
/// boundary. Callers only ever see the short stable message; token material
/// and internal errors never leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Neither token present in the header or cookies
    NoCredentials,
    /// Access token present but forged or malformed (not merely expired)
    InvalidToken,
    /// Access token expired and no refresh token available
    Unauthenticated,
    /// Refresh token invalid, expired, superseded, or principal unknown
    InvalidRefresh,
    /// Catch-all for unexpected faults during the flow
    AuthenticationFailed,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::NoCredentials | AuthError::InvalidToken | AuthError::InvalidRefresh => {
                StatusCode::FORBIDDEN
            }
            AuthError::Unauthenticated | AuthError::AuthenticationFailed => {
                StatusCode::UNAUTHORIZED
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthError::NoCredentials => "bad request no header provided",
            AuthError::InvalidToken => "Token is not valid",
            AuthError::Unauthenticated => "You are not authenticated",
            AuthError::InvalidRefresh => "Invalid refresh token",
            AuthError::AuthenticationFailed => "Authentication failed",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::NoCredentials.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::InvalidRefresh.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AuthenticationFailed.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_messages_are_stable() {
        // Clients key off these strings; changing them is a breaking change.
        assert_eq!(
            AuthError::NoCredentials.message(),
            "bad request no header provided"
        );
        assert_eq!(AuthError::InvalidRefresh.message(), "Invalid refresh token");
    }
}
