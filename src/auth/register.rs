//! The registration page and the handler that creates a new account.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    advice::{GenerativeService, LogoRequest},
    auth::{
        DEFAULT_COOKIE_DURATION, Email, PasswordHash, ValidatedPassword, create_user,
        log_in::email_input, set_auth_cookie, set_display_image,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, base, loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The query parameter added to the dashboard URL when the logo could not be generated.
pub const LOGO_UNAVAILABLE_NOTICE: &str = "logo-unavailable";

const IDENTICON_URL: &str = "https://api.dicebear.com/8.x/identicon/svg";

/// A generic avatar derived from the user's email.
pub(crate) fn identicon_url(email: &Email) -> String {
    let query = serde_urlencoded::to_string([("seed", email.as_str())]).unwrap_or_default();

    format!("{IDENTICON_URL}?{query}")
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }

    }
}

#[derive(Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, password: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #confirm-password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
    /// Generates the new user's logo.
    pub generative_service: Arc<dyn GenerativeService>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
            generative_service: state.generative_service.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Ask for a logo and store it as the user's display image.
///
/// Falls back to an identicon if the logo cannot be generated.
/// Returns whether the generated logo was used.
pub(crate) async fn assign_logo(
    user_id: crate::auth::UserID,
    email: &Email,
    generative_service: &dyn GenerativeService,
    db_connection: &Mutex<Connection>,
) -> Result<bool, Error> {
    let request = LogoRequest {
        email: email.as_str().to_owned(),
    };

    let (display_image, is_generated) = match generative_service.generate_logo(&request).await {
        Ok(logo) => (logo.logo_data_uri, true),
        Err(error) => {
            tracing::warn!("Could not generate a logo for user {user_id}: {error}");
            (identicon_url(email), false)
        }
    };

    let connection = db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;
    set_display_image(user_id, &display_image, &connection)?;

    Ok(is_generated)
}

/// Create a new account, log the user in and redirect them to the dashboard.
///
/// The logo is requested after the account exists. A failed logo request
/// never undoes the registration.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let email = match Email::new(&user_data.email) {
        Ok(email) => email,
        Err(error) => {
            return registration_form(
                &user_data.email,
                &user_data.password,
                RegistrationErrors {
                    email: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&user_data.password, &[email.as_str()])
    {
        Ok(password) => password,
        Err(error) => {
            return registration_form(
                &user_data.email,
                &user_data.password,
                RegistrationErrors {
                    password: Some(&error.to_string()),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if user_data.password != user_data.confirm_password {
        return registration_form(
            &user_data.email,
            &user_data.password,
            RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("an error occurred while hashing a password: {e}");

            return get_internal_server_error_redirect();
        }
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_response(),
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return get_internal_server_error_redirect();
            }
        };

        match create_user(email, password_hash, None, &connection) {
            Ok(user) => user,
            Err(Error::DuplicateEmail) => {
                return registration_form(
                    &user_data.email,
                    &user_data.password,
                    RegistrationErrors {
                        email: Some("An account with this email already exists."),
                        ..Default::default()
                    },
                )
                .into_response();
            }
            Err(e) => {
                tracing::error!("An unhandled error occurred while inserting a new user: {e}");

                return get_internal_server_error_redirect();
            }
        }
    };

    tracing::info!("Registered user {}", user.id);

    let redirect_url = match assign_logo(
        user.id,
        &user.email,
        state.generative_service.as_ref(),
        &state.db_connection,
    )
    .await
    {
        Ok(true) => endpoints::DASHBOARD_VIEW.to_owned(),
        Ok(false) => format!(
            "{}?notice={LOGO_UNAVAILABLE_NOTICE}",
            endpoints::DASHBOARD_VIEW
        ),
        Err(error) => {
            tracing::error!("Could not save the display image for user {}: {error}", user.id);
            format!(
                "{}?notice={LOGO_UNAVAILABLE_NOTICE}",
                endpoints::DASHBOARD_VIEW
            )
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_timezone) {
        Ok(jar) => (StatusCode::SEE_OTHER, HxRedirect(redirect_url), jar).into_response(),
        Err(e) => {
            tracing::error!("An error occurred while setting the auth cookie: {e}");

            get_internal_server_error_redirect()
        }
    }
}
