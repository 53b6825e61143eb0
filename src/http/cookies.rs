//! Set-Cookie header parsing

use crate::models::{CookieFlags, SetCookie};
use reqwest::header::{HeaderMap, SET_COOKIE};

/// Parses every `Set-Cookie` header of a response.
/// Headers without a cookie name are skipped.
pub fn parse_set_cookies(headers: &HeaderMap) -> Vec<SetCookie> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(parse_set_cookie)
        .collect()
}

/// Parses a single `Set-Cookie` value: `name=value; Attr; Attr=x`
pub fn parse_set_cookie(raw: &str) -> Option<SetCookie> {
    let mut parts = raw.split(';');
    let pair = parts.next()?;
    let name = pair.split('=').next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }

    let mut flags = CookieFlags::default();
    for attr in parts {
        let key = attr.split('=').next().unwrap_or("").trim();
        if key.eq_ignore_ascii_case("secure") {
            flags.secure = true;
        } else if key.eq_ignore_ascii_case("httponly") {
            flags.http_only = true;
        }
    }

    Some(SetCookie {
        name: name.to_string(),
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_plain_cookie_has_no_flags() {
        let cookie = parse_set_cookie("session=abc").expect("cookie");
        assert_eq!(cookie.name, "session");
        assert!(!cookie.flags.secure);
        assert!(!cookie.flags.http_only);
    }

    #[test]
    fn test_flags_are_case_insensitive() {
        let cookie = parse_set_cookie("id=1; Path=/; SECURE; httpOnly").expect("cookie");
        assert!(cookie.flags.secure);
        assert!(cookie.flags.http_only);
    }

    #[test]
    fn test_flag_words_inside_values_do_not_count() {
        let cookie = parse_set_cookie("pref=secure; Path=/httponly").expect("cookie");
        assert!(!cookie.flags.secure);
        assert!(!cookie.flags.http_only);
    }

    #[test]
    fn test_nameless_cookie_is_skipped() {
        assert!(parse_set_cookie("=abc; Secure").is_none());
        assert!(parse_set_cookie("").is_none());
    }

    #[test]
    fn test_parse_all_headers() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Secure"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; HttpOnly"));
        let cookies = parse_set_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "a");
        assert!(cookies[1].flags.http_only);
    }
}
