//! Accounts, log-in sessions and the profile page.
//!
//! Sessions live in an encrypted private cookie. The middleware checks the
//! cookie on every protected route and hands handlers a [Session].

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod password;
mod profile;
mod redirect;
mod register;
mod session;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use password::{PasswordHash, ValidatedPassword};
pub use profile::{get_profile_page, regenerate_logo_endpoint, update_profile_endpoint};
pub use register::{LOGO_UNAVAILABLE_NOTICE, get_register_page, register_user};
pub use session::Session;
pub use user::{
    Email, User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    set_display_image, update_profile,
};

#[cfg(test)]
pub(crate) use cookie::COOKIE_TOKEN;
