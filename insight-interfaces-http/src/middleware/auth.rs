use axum::http::HeaderMap;

use insight_domain::RuntimeConfig;

/// True when no api token is configured or the bearer token matches it.
pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    match &config.api_token {
        Some(api_token) => extract_bearer(headers)
            .map(|token| token == *api_token)
            .unwrap_or(false),
        None => true,
    }
}

/// Websocket clients in browsers cannot set headers, so a `token` query value is also accepted.
pub fn authorize_with_query(
    config: &RuntimeConfig,
    headers: &HeaderMap,
    token: Option<&str>,
) -> bool {
    if authorize(config, headers) {
        return true;
    }
    match (&config.api_token, token) {
        (Some(api_token), Some(token)) => token.trim() == api_token,
        _ => false,
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            api_token: token.map(ToString::to_string),
            ..RuntimeConfig::default()
        }
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(value).expect("header value"),
        );
        headers
    }

    #[test]
    fn open_when_no_token_configured() {
        assert!(authorize(&config(None), &HeaderMap::new()));
    }

    #[test]
    fn requires_matching_bearer() {
        let cfg = config(Some("secret"));
        assert!(authorize(&cfg, &bearer("Bearer secret")));
        assert!(!authorize(&cfg, &bearer("Bearer other")));
        assert!(!authorize(&cfg, &bearer("secret")));
        assert!(!authorize(&cfg, &HeaderMap::new()));
    }

    #[test]
    fn query_token_is_accepted_for_websockets() {
        let cfg = config(Some("secret"));
        assert!(authorize_with_query(&cfg, &HeaderMap::new(), Some("secret")));
        assert!(!authorize_with_query(&cfg, &HeaderMap::new(), Some("nope")));
        assert!(!authorize_with_query(&cfg, &HeaderMap::new(), None));
    }
}
