//! User registration page and endpoint.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{
        PasswordHash, ValidatedPassword, create_user, password::MINIMUM_PASSWORD_LENGTH,
        set_auth_cookie,
    },
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        log_in_register, password_input},
};

/// The state needed for registering a user.
#[derive(Clone)]
pub struct RegisterState {
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

/// Form data for registering a user.
#[derive(Debug, Deserialize)]
pub struct RegisterFormData {
    /// The email address to register with.
    pub email: String,
    /// The user's chosen password.
    pub password: String,
    /// The user's chosen password, typed again.
    pub confirm_password: String,
}

/// Render the registration page.
pub async fn get_register_page() -> Response {
    register_view().into_response()
}

/// Handle registration form submission.
///
/// Validates the email and password, creates the user, and logs them in by
/// setting the auth cookies.
pub async fn register_user(
    State(state): State<RegisterState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterFormData>,
) -> Response {
    if EmailAddress::from_str(&form.email).is_err() {
        return register_form_view(
            &form.email,
            Some(&format!("\"{}\" is not a valid email address.", form.email)),
        )
        .into_response();
    }

    if form.password != form.confirm_password {
        return register_form_view(&form.email, Some("Passwords do not match.")).into_response();
    }

    let password = match ValidatedPassword::new(&form.password) {
        Ok(password) => password,
        Err(Error::TooWeak(message)) => {
            return register_form_view(&form.email, Some(&format!("Password is too weak: {message}")))
                .into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while validating a password: {error}");
            return error.into_alert_response();
        }
    };

    let password_hash = match PasswordHash::new(password) {
        Ok(password_hash) => password_hash,
        Err(error) => {
            tracing::error!("Could not hash password: {error}");
            return error.into_alert_response();
        }
    };

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        create_user(&form.email, password_hash, &connection)
    };

    let user = match user {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            return register_form_view(
                &form.email,
                Some("A user with this email address already exists."),
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a user: {error}");
            return error.into_alert_response();
        }
    };

    let jar = match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not set auth cookie: {error}");
            return error.into_alert_response();
        }
    };

    (
        jar,
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

fn register_view() -> Markup {
    let form = register_form_view("", None);
    let content = log_in_register("Create an account", &form);

    base("Register", &[], &content)
}

fn register_form_view(email: &str, error_message: Option<&str>) -> Markup {
    let register_endpoint = endpoints::USERS;
    let log_in_link = link(endpoints::LOG_IN_VIEW, "Log in");

    html! {
        form
            hx-post=(register_endpoint)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="email"
                    class=(FORM_LABEL_STYLE)
                {
                    "Email"
                }

                input
                    id="email"
                    type="email"
                    name="email"
                    placeholder="you@example.com"
                    required
                    autofocus
                    value=(email)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (password_input("", MINIMUM_PASSWORD_LENGTH, None))

            div
            {
                label
                    for="confirm_password"
                    class=(FORM_LABEL_STYLE)
                {
                    "Confirm Password"
                }

                input
                    type="password"
                    name="confirm_password"
                    id="confirm_password"
                    placeholder="••••••••"
                    required
                    minlength=(MINIMUM_PASSWORD_LENGTH)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create account" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? " (log_in_link)
            }
        }
    }
}


#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Form, extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use rusqlite::Connection;
    use sha2::{Digest, Sha512};
    use time::Duration;

    use crate::{
        auth::{create_user_table, get_user_by_email},
        endpoints,
        test_utils::{assert_form_error_message, assert_valid_html, get_header, must_get_form,
            parse_html_fragment},
    };

    use super::{RegisterFormData, RegisterState, register_user};

    const TEST_PASSWORD: &str = "averysecretandsecurepassword";

    fn get_register_state() -> RegisterState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        create_user_table(&connection).expect("Could not create user table");

        RegisterState {
            db_connection: Arc::new(Mutex::new(connection)),
            cookie_duration: Duration::minutes(5),
        }
    }

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        PrivateCookieJar::new(Key::from(&hash))
    }

    #[tokio::test]
    async fn can_register_user() {
        let state = get_register_state();
        let form = RegisterFormData {
            email: "test@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: TEST_PASSWORD.to_string(),
        };

        let response = register_user(State(state.clone()), get_jar(), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(get_header(&response, "hx-redirect"), endpoints::DASHBOARD_VIEW);

        let user = get_user_by_email("test@test.com", &state.db_connection.lock().unwrap());
        assert!(user.is_ok(), "expected user to be created, got {user:?}");
    }

    #[tokio::test]
    async fn register_fails_on_invalid_email() {
        let state = get_register_state();
        let form = RegisterFormData {
            email: "not-an-email".to_string(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: TEST_PASSWORD.to_string(),
        };

        let response = register_user(State(state), get_jar(), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "\"not-an-email\" is not a valid email address.");
    }

    #[tokio::test]
    async fn register_fails_on_mismatched_passwords() {
        let state = get_register_state();
        let form = RegisterFormData {
            email: "test@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: "somethingelseentirely".to_string(),
        };

        let response = register_user(State(state), get_jar(), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Passwords do not match.");
    }

    #[tokio::test]
    async fn register_fails_on_weak_password() {
        let state = get_register_state();
        let form = RegisterFormData {
            email: "test@test.com".to_string(),
            password: "password123".to_string(),
            confirm_password: "password123".to_string(),
        };

        let response = register_user(State(state), get_jar(), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Password is too weak"));
    }

    #[tokio::test]
    async fn register_fails_on_duplicate_email() {
        let state = get_register_state();
        let form = RegisterFormData {
            email: "test@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: TEST_PASSWORD.to_string(),
        };
        register_user(State(state.clone()), get_jar(), Form(form))
            .await
            .into_response();

        let duplicate_form = RegisterFormData {
            email: "test@test.com".to_string(),
            password: TEST_PASSWORD.to_string(),
            confirm_password: TEST_PASSWORD.to_string(),
        };
        let response = register_user(State(state), get_jar(), Form(duplicate_form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "A user with this email address already exists.");
    }
}
