//! Log in page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, endpoints,
    auth::{get_user_by_email, password::MINIMUM_PASSWORD_LENGTH, set_auth_cookie},
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, link,
        log_in_register, password_input},
};

/// The state needed for logging in a user.
#[derive(Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

/// The query parameters accepted by the log in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInQuery {
    /// Where to redirect the client after a successful log in.
    pub redirect_url: Option<String>,
}

/// Form data for logging in.
#[derive(Debug, Deserialize)]
pub struct LogInFormData {
    /// The email address the user registered with.
    pub email: String,
    /// The user's password.
    pub password: String,
    /// Where to redirect the client after a successful log in.
    pub redirect_url: Option<String>,
}

/// Render the log in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    log_in_view(query.redirect_url.as_deref()).into_response()
}

/// Handle log in form submission.
///
/// Checks the email and password against the user table and sets the auth
/// cookies on success.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInFormData>,
) -> Response {
    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        get_user_by_email(&form.email, &connection)
    };

    let credentials = user.and_then(|user| {
        user.password_hash.verify(&form.password)?;
        Ok(user)
    });

    let user = match credentials {
        Ok(user) => user,
        Err(Error::NotFound) | Err(Error::InvalidCredentials) => {
            return log_in_form_view(
                &form.email,
                form.redirect_url.as_deref(),
                Some("Incorrect email or password."),
            )
            .into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while logging in: {error}");
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

    let target = form
        .redirect_url
        .unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

    (jar, HxRedirect(target), StatusCode::SEE_OTHER).into_response()
}

fn log_in_view(redirect_url: Option<&str>) -> Markup {
    let form = log_in_form_view("", redirect_url, None);
    let content = log_in_register("Sign in to your account", &form);

    base("Log In", &[], &content)
}

fn log_in_form_view(email: &str, redirect_url: Option<&str>, error_message: Option<&str>) -> Markup {
    let log_in_endpoint = endpoints::LOG_IN_API;
    let register_link = link(endpoints::REGISTER_VIEW, "Sign up");

    html! {
        form
            hx-post=(log_in_endpoint)
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

            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            @if let Some(error_message) = error_message {
                p class="text-red-600 dark:text-red-400" { (error_message) }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Log in" }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account yet? " (register_link)
            }
        }
    }
}
