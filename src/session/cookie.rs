use axum::http::header;

/// Cookie name for the access token (short-lived)
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived)
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Cookie attributes shared by every Set-Cookie header the service emits
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Append the Secure attribute (disabled for plain-HTTP development)
    pub secure: bool,
    /// Max-Age for the access cookie, seconds
    pub access_max_age: i64,
    /// Max-Age for the refresh cookie, seconds
    pub refresh_max_age: i64,
}

impl CookieConfig {
    fn set(&self, name: &str, value: &str, max_age: i64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
            name, value, max_age, secure
        )
    }

    pub fn access(&self, token: &str) -> String {
        self.set(ACCESS_COOKIE_NAME, token, self.access_max_age)
    }

    pub fn refresh(&self, token: &str) -> String {
        self.set(REFRESH_COOKIE_NAME, token, self.refresh_max_age)
    }

    pub fn clear_access(&self) -> String {
        self.set(ACCESS_COOKIE_NAME, "", 0)
    }

    pub fn clear_refresh(&self) -> String {
        self.set(REFRESH_COOKIE_NAME, "", 0)
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn test_config() -> CookieConfig {
        CookieConfig {
            secure: true,
            access_max_age: 900,
            refresh_max_age: 604800,
        }
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookie = test_config().access("abc123");

        assert_eq!(
            cookie,
            "access_token=abc123; HttpOnly; SameSite=Strict; Path=/; Max-Age=900; Secure"
        );
    }

    #[test]
    fn test_insecure_config_drops_secure_attribute() {
        let config = CookieConfig {
            secure: false,
            ..test_config()
        };

        assert!(!config.refresh("xyz").contains("Secure"));
        assert!(config.refresh("xyz").contains("Max-Age=604800"));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cookie = test_config().clear_refresh();

        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_get_cookie_simple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=abc123"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
    }

    #[test]
    fn test_get_cookie_multiple() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; access_token=abc123; refresh_token=xyz789"),
        );

        assert_eq!(get_cookie(&headers, "access_token"), Some("abc123"));
        assert_eq!(get_cookie(&headers, "refresh_token"), Some("xyz789"));
        assert_eq!(get_cookie(&headers, "foo"), Some("bar"));
    }

    #[test]
    fn test_get_cookie_not_found() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("foo=bar"));

        assert_eq!(get_cookie(&headers, "access_token"), None);
        assert_eq!(get_cookie(&axum::http::HeaderMap::new(), "access_token"), None);
    }
}
