//! Remember-me cookie handling

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::state::WebSettings;

/// Read a cookie value from the request headers
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// Whether the request carries a cookie with this name at all
pub fn present(headers: &HeaderMap, name: &str) -> bool {
    read(headers, name).is_some_and(|v| !v.is_empty())
}

/// `Set-Cookie` value carrying a remember-me token
pub fn remember_me(settings: &WebSettings, value: String, max_age_secs: i64) -> Option<HeaderValue> {
    let cookie = Cookie::build((settings.remember_me_cookie.clone(), value))
        .path("/")
        .http_only(true)
        .secure(settings.remember_me_secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .build();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// `Set-Cookie` value that clears the remember-me cookie
pub fn clear_remember_me(settings: &WebSettings) -> Option<HeaderValue> {
    remember_me(settings, String::new(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("rolegate.sid=abc; remember_me=s:v"),
        );
        assert_eq!(read(&headers, "remember_me").as_deref(), Some("s:v"));
        assert_eq!(read(&headers, "rolegate.sid").as_deref(), Some("abc"));
        assert!(read(&headers, "missing").is_none());
        assert!(present(&headers, "rolegate.sid"));
    }

    #[test]
    fn test_remember_me_cookie_attributes() {
        let settings = WebSettings::default();
        let value = remember_me(&settings, "s:v".to_string(), 86400).unwrap();
        let value = value.to_str().unwrap();

        assert!(value.starts_with("remember_me=s:v"));
        assert!(value.contains("Max-Age=86400"));
        assert!(value.contains("Secure"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn test_clear_cookie() {
        let settings = WebSettings::default();
        let value = clear_remember_me(&settings).unwrap();
        assert!(value.to_str().unwrap().contains("Max-Age=0"));
    }
}
