//! The profile page, where users change their email and display image.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    advice::{GenerativeService, LogoRequest},
    auth::{Email, Session, User, get_user_by_id, set_display_image, update_profile},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_CONTAINER_STYLE, FORM_ERROR_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner,
    },
    navigation::NavBar,
};

/// The state needed for the profile page and endpoints.
#[derive(Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub generative_service: Arc<dyn GenerativeService>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            generative_service: state.generative_service.clone(),
        }
    }
}

impl ProfileState {
    fn get_user(&self, session: Session) -> Result<User, Error> {
        let connection = self
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(session.user_id, &connection)
    }
}

fn display_image(image: Option<&str>) -> Markup {
    html! {
        div id="display-image" class="flex justify-center"
        {
            @if let Some(image) = image {
                img
                    src=(image)
                    alt="Your display image"
                    class="w-24 h-24 rounded-full border border-gray-300 dark:border-gray-600";
            } @else {
                div
                    class="w-24 h-24 rounded-full bg-gray-200 dark:bg-gray-700"
                    aria-label="No display image"
                {}
            }
        }
    }
}

fn profile_form(email: &str, image: Option<&str>, email_error: Option<&str>) -> Markup {
    html! {
        form
            hx-put=(endpoints::PROFILE_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="#profile-submit-button"
            class="w-full space-y-4"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    value=(email);

                @if let Some(error) = email_error {
                    p class=(FORM_ERROR_STYLE) { (error) }
                }
            }

            div
            {
                label for="display_image" class=(FORM_LABEL_STYLE) { "Display image URL" }

                input
                    type="url"
                    name="display_image"
                    id="display_image"
                    placeholder="https://example.com/me.png"
                    class=(FORM_TEXT_INPUT_STYLE)
                    value=[image.filter(|image| !image.starts_with("data:"))];
            }

            button type="submit" id="profile-submit-button" class=(BUTTON_PRIMARY_STYLE)
            {
                "Save Profile"
            }
        }
    }
}

fn profile_view(user: &User) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let image = user.display_image.as_deref();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            div class="w-full max-w-md space-y-6"
            {
                h1 class="text-xl font-bold" { "Profile" }

                (display_image(image))

                button
                    hx-post=(endpoints::PROFILE_LOGO)
                    hx-target="#display-image"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    hx-indicator="#logo-indicator"
                    hx-disabled-elt="this"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    span id="logo-indicator" class="inline htmx-indicator" { (loading_spinner()) }
                    "Generate New Logo"
                }

                (profile_form(user.email.as_str(), image, None))
            }
        }
    };

    base("Profile", &[], &content)
}

/// Display the profile page for the logged in user.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
) -> Result<Response, Error> {
    let user = state.get_user(session)?;

    Ok(profile_view(&user).into_response())
}

/// The form data for updating a profile.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    pub email: String,
    /// A blank value keeps the current image.
    #[serde(default)]
    pub display_image: String,
}

/// Change the email and display image of the logged in user.
///
/// An invalid or taken email is shown under the email field.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
    Form(form): Form<ProfileForm>,
) -> Response {
    let display_image = form.display_image.trim();

    let email = match Email::new(&form.email) {
        Ok(email) => email,
        Err(error) => {
            return profile_form(&form.email, Some(display_image), Some(&error.to_string()))
                .into_response();
        }
    };

    let result = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            let current = get_user_by_id(session.user_id, &connection)?;
            let display_image = if display_image.is_empty() {
                current.display_image
            } else {
                Some(display_image.to_owned())
            };

            update_profile(session.user_id, &email, display_image.as_deref(), &connection)
        });

    match result {
        Ok(user) => {
            tracing::info!("User {} updated their profile", user.id);
            (
                HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(Error::DuplicateEmail) => profile_form(
            &form.email,
            Some(display_image),
            Some("An account with this email already exists."),
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Generate a new logo for the logged in user and return the updated image.
///
/// On failure the current image is kept and an alert is returned.
pub async fn regenerate_logo_endpoint(
    State(state): State<ProfileState>,
    Extension(session): Extension<Session>,
) -> Response {
    let user = match state.get_user(session) {
        Ok(user) => user,
        Err(error) => return error.into_alert_response(),
    };

    let request = LogoRequest {
        email: user.email.as_str().to_owned(),
    };

    let logo = match state.generative_service.generate_logo(&request).await {
        Ok(logo) => logo,
        Err(error) => return Error::from(error).into_alert_response(),
    };

    let saved = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
        .and_then(|connection| {
            set_display_image(session.user_id, &logo.logo_data_uri, &connection)
        });

    match saved {
        Ok(()) => display_image(Some(&logo.logo_data_uri)).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        advice::LogoStub,
        auth::{Email, PasswordHash, Session, create_user, get_user_by_id},
        budget_goal::get_connection_with_user,
        endpoints,
        test_utils::{
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
    };

    use super::{
        ProfileForm, ProfileState, get_profile_page, regenerate_logo_endpoint,
        update_profile_endpoint,
    };

    fn get_state(logo: Option<&str>) -> (ProfileState, Session) {
        let (connection, user) = get_connection_with_user();
        let state = ProfileState {
            db_connection: Arc::new(Mutex::new(connection)),
            generative_service: Arc::new(LogoStub {
                logo: logo.map(str::to_owned),
            }),
        };

        (state, Session { user_id: user.id })
    }

    fn form(email: &str, display_image: &str) -> ProfileForm {
        ProfileForm {
            email: email.to_owned(),
            display_image: display_image.to_owned(),
        }
    }

    #[tokio::test]
    async fn profile_page_shows_email_and_logo_button() {
        let (state, session) = get_state(None);

        let response = get_profile_page(State(state), Extension(session))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-put");
        let email = form
            .select(&Selector::parse("input#email").unwrap())
            .next()
            .unwrap();
        assert_eq!(email.value().attr("value"), Some("test@example.com"));

        let logo_button = document
            .select(&Selector::parse("button[hx-post]").unwrap())
            .next()
            .unwrap();
        assert_hx_endpoint(&logo_button, endpoints::PROFILE_LOGO, "hx-post");
    }

    #[tokio::test]
    async fn update_profile_changes_email_and_image() {
        let (state, session) = get_state(None);

        let response = update_profile_endpoint(
            State(state.clone()),
            Extension(session),
            Form(form("New@Example.com", "https://example.com/me.png")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PROFILE_VIEW);
        let user = get_user_by_id(session.user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.email.as_str(), "new@example.com");
        assert_eq!(
            user.display_image.as_deref(),
            Some("https://example.com/me.png")
        );
    }

    #[tokio::test]
    async fn blank_image_keeps_current_image() {
        let (state, session) = get_state(None);
        crate::auth::set_display_image(
            session.user_id,
            "data:image/png;base64,AAAA",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        update_profile_endpoint(
            State(state.clone()),
            Extension(session),
            Form(form("test@example.com", "  ")),
        )
        .await;

        let user = get_user_by_id(session.user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(
            user.display_image.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[tokio::test]
    async fn taken_email_shows_inline_error() {
        let (state, session) = get_state(None);
        create_user(
            Email::new("other@example.com").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            None,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = update_profile_endpoint(
            State(state.clone()),
            Extension(session),
            Form(form("other@example.com", "")),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        let error = document
            .select(&Selector::parse("input#email + p").unwrap())
            .next()
            .expect("want error under the email input");
        assert_eq!(
            error.text().collect::<String>(),
            "An account with this email already exists."
        );
        let user = get_user_by_id(session.user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(user.email.as_str(), "test@example.com");
    }

    #[tokio::test]
    async fn regenerate_logo_replaces_image() {
        let (state, session) = get_state(Some("data:image/png;base64,BBBB"));

        let response = regenerate_logo_endpoint(State(state.clone()), Extension(session)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let document = parse_html_fragment(response).await;
        let image = document
            .select(&Selector::parse("#display-image img").unwrap())
            .next()
            .unwrap();
        assert_eq!(image.value().attr("src"), Some("data:image/png;base64,BBBB"));
        let user = get_user_by_id(session.user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(
            user.display_image.as_deref(),
            Some("data:image/png;base64,BBBB")
        );
    }

    #[tokio::test]
    async fn failed_logo_keeps_current_image() {
        let (state, session) = get_state(None);
        crate::auth::set_display_image(
            session.user_id,
            "https://example.com/old.png",
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = regenerate_logo_endpoint(State(state.clone()), Extension(session)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let user = get_user_by_id(session.user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(
            user.display_image.as_deref(),
            Some("https://example.com/old.png")
        );
    }
}
