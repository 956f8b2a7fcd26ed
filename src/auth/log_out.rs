//! Log out endpoint.

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use crate::{auth::invalidate_auth_cookie, endpoints};

/// Invalidate the auth cookies and redirect the client to the log in page.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_auth_cookie(jar);

    (jar, Redirect::to(endpoints::LOG_IN_VIEW)).into_response()
}

#[cfg(test)]
mod log_out_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{COOKIE_USER_ID, DEFAULT_COOKIE_DURATION, UserId, set_auth_cookie},
        endpoints,
    };

    use super::get_log_out;

    #[tokio::test]
    async fn log_out_invalidates_cookie_and_redirects() {
        let hash = Sha512::digest(b"foobar");
        let jar = PrivateCookieJar::new(Key::from(&hash));
        let jar = set_auth_cookie(jar, UserId::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let response = get_log_out(jar).await.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let cookies: Vec<_> = response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|value| value.to_str().unwrap().to_owned())
            .collect();
        assert!(
            cookies
                .iter()
                .any(|cookie| cookie.starts_with(COOKIE_USER_ID) && cookie.contains("Max-Age=0")),
            "expected auth cookie to be deleted, got {cookies:?}"
        );
    }
}
