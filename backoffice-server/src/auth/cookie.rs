//! 会话 Cookie 编解码

use http::HeaderMap;
use http::header::COOKIE;

use crate::core::config::SessionConfig;

/// Session token from the `Cookie` header(s), if present and non-empty
pub fn read_token(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value issuing a session token
///
/// Cross-site deployments (production) need `SameSite=None; Secure` for the
/// browser to send the cookie with credentialed requests.
pub fn session_cookie(config: &SessionConfig, token: &str, production: bool) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; {}",
        config.cookie_name,
        token,
        config.ttl.as_secs(),
        same_site(production)
    )
}

/// `Set-Cookie` value removing the session cookie
pub fn clear_cookie(config: &SessionConfig, production: bool) -> String {
    format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; {}",
        config.cookie_name,
        same_site(production)
    )
}

fn same_site(production: bool) -> &'static str {
    if production {
        "SameSite=None; Secure"
    } else {
        "SameSite=Lax"
    }
}
