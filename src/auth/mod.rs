//! Request authentication: credential parsing, the auth gate extractor, and
//! refresh credential rotation.
//!
//! Dual-token scheme: short-lived access tokens (15 min, stateless) and
//! long-lived refresh tokens (7 days), of which exactly one per principal is
//! valid at a time - the one stored on the principal's record. An expired
//! access token is transparently refreshed when the presented refresh token
//! matches the stored one, rotating both credentials.

mod bearer;
mod errors;
mod extractors;
mod state;

pub use bearer::{ACCESS_COOKIE_NAME, Credentials, REFRESH_COOKIE_NAME, get_cookie};
pub use errors::AuthError;
pub use extractors::{
    Auth, AuthenticatedPrincipal, NEW_ACCESS_TOKEN_HEADER, NEW_REFRESH_TOKEN_HEADER,
    ROTATED_TOKENS, RotatedTokens, expose_rotated_tokens,
};
pub use state::HasAuthBackend;
