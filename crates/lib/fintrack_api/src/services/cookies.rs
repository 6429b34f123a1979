//! Cookie service — build and clear the httpOnly session cookie.
//!
//! Domain, `Secure` and `SameSite` come from [`CookieConfig`]; nothing
//! environment specific is hardcoded here.

use axum_extra::extract::cookie::Cookie;
use time::Duration;

use crate::config::CookieConfig;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "fintrack_session";

fn build(value: String, max_age: Duration, config: &CookieConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE.to_string(), value))
        .http_only(true)
        .secure(config.secure)
        .same_site(config.same_site)
        .path("/".to_string())
        .max_age(max_age)
        .build();
    if let Some(domain) = &config.domain {
        cookie.set_domain(domain.clone());
    }
    cookie
}

/// Build the session cookie carrying `token`, expiring with it.
pub fn session_cookie(token: &str, max_age_secs: i64, config: &CookieConfig) -> Cookie<'static> {
    build(token.to_string(), Duration::seconds(max_age_secs), config)
}

/// Build an expired session cookie with the same attributes, so the
/// browser drops the one set at login.
pub fn clear_session_cookie(config: &CookieConfig) -> Cookie<'static> {
    build(String::new(), Duration::ZERO, config)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::cookie::SameSite;

    use super::*;

    #[test]
    fn session_cookie_follows_config() {
        let config = CookieConfig {
            domain: Some("api.fintrack.test".into()),
            secure: true,
            same_site: SameSite::None,
        };
        let cookie = session_cookie("tok", 86_400, &config);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.domain(), Some("api.fintrack.test"));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));
    }

    #[test]
    fn host_only_cookie_has_no_domain() {
        let cookie = session_cookie("tok", 60, &CookieConfig::default());
        assert_eq!(cookie.domain(), None);
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
    }

    #[test]
    fn clear_cookie_expires_immediately_with_same_attributes() {
        let config = CookieConfig {
            domain: Some("api.fintrack.test".into()),
            secure: false,
            same_site: SameSite::Strict,
        };
        let cookie = clear_session_cookie(&config);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.domain(), Some("api.fintrack.test"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.http_only(), Some(true));
    }
}
