//! The authenticated context passed to handlers.

use crate::auth::UserID;

/// The logged in user for the current request.
///
/// Inserted as a request extension by [crate::auth::auth_guard] and
/// [crate::auth::auth_guard_hx] once the auth cookie has been checked, so
/// protected handlers can take `Extension(session): Extension<Session>`.
/// A session lasts until the user logs out or the auth cookie expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserID,
}
