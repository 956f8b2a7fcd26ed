use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

/// The copy shown on the internal server error page.
pub struct InternalServerErrorPage<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerErrorPage<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

pub async fn get_internal_server_error_page() -> Response {
    render_internal_server_error(Default::default())
}

pub fn render_internal_server_error(page: InternalServerErrorPage) -> Response {
    let page = error_view("Error", "500", page.description, page.fix);

    (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
}
