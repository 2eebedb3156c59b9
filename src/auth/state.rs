//! Authentication state traits and macro.

use crate::db::Database;
use crate::jwt::TokenKeys;

/// Trait for state types that provide the signing keys and principal store
/// the auth gate needs.
pub trait HasAuthBackend {
    fn keys(&self) -> &TokenKeys;
    fn db(&self) -> &Database;
}

/// Implement `HasAuthBackend` for state structs with the standard fields.
///
/// The struct must have these fields:
/// - `keys: Arc<TokenKeys>`
/// - `db: Database`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub db: Database,
///     pub keys: Arc<TokenKeys>,
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn keys(&self) -> &$crate::jwt::TokenKeys {
                &self.keys
            }
            fn db(&self) -> &$crate::db::Database {
                &self.db
            }
        }
    };
}
