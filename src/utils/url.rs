//! URL utility functions.
//!
//! Derivation of health-check URLs from service endpoints, and masking of
//! sensitive information when URLs appear in logs.

/// Path suffix appended to a service endpoint to form its health-check URL.
pub const HEALTH_CHECK_PATH: &str = "health_check";

/// Derives the health-check URL for a service endpoint.
///
/// Probing happens against this derived URL, and it is the correlation key
/// used when classifying probe results back to their endpoints.
///
/// # Examples
/// - `https://service.example.com` → `https://service.example.com/health_check`
/// - `https://service.example.com/` → `https://service.example.com/health_check`
pub fn health_check_url(endpoint: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), HEALTH_CHECK_PATH)
}

/// Masks a URL by showing only the scheme and host, hiding the path and query
/// parameters.
///
/// Used to safely display service URLs in logs without exposing API keys that
/// are sometimes embedded in the URL path or query string.
///
/// # Examples
/// - `https://node.example.com/v2/abc123` → `https://node.example.com/***`
/// - `http://localhost:8545` → `http://localhost:8545` (no path to mask)
/// - `invalid-url` → `***` (fallback for unparseable URLs)
pub fn mask_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        // No valid scheme, mask entirely for safety
        return "***".to_string();
    };

    let host_start = scheme_end + 3;
    let rest = &url[host_start..];

    if let Some(path_start) = rest.find('/') {
        let path_and_beyond = &rest[path_start..];
        if path_and_beyond.len() > 1 || url.contains('?') {
            let host_end = host_start + path_start;
            format!("{}/***", &url[..host_end])
        } else {
            // Just a trailing "/" with no real path content
            url.to_string()
        }
    } else if url.contains('?') {
        let query_start = url.find('?').unwrap();
        format!("{}?***", &url[..query_start])
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_url_plain_endpoint() {
        assert_eq!(
            health_check_url("https://service.example.com"),
            "https://service.example.com/health_check"
        );
    }

    #[test]
    fn test_health_check_url_trailing_slash() {
        assert_eq!(
            health_check_url("https://service.example.com/"),
            "https://service.example.com/health_check"
        );
    }

    #[test]
    fn test_health_check_url_with_port() {
        assert_eq!(
            health_check_url("http://localhost:8080"),
            "http://localhost:8080/health_check"
        );
    }

    #[test]
    fn test_mask_url_with_api_key_path() {
        let masked = mask_url("https://node.example.com/v2/abc123xyz");
        assert_eq!(masked, "https://node.example.com/***");
    }

    #[test]
    fn test_mask_url_localhost_no_path() {
        let masked = mask_url("http://localhost:8545");
        assert_eq!(masked, "http://localhost:8545");
    }

    #[test]
    fn test_mask_url_trailing_slash_only() {
        let masked = mask_url("http://localhost:8545/");
        assert_eq!(masked, "http://localhost:8545/");
    }

    #[test]
    fn test_mask_url_with_query_params() {
        let masked = mask_url("https://node.example.com/v1?api_key=secret");
        assert_eq!(masked, "https://node.example.com/***");
    }

    #[test]
    fn test_mask_url_query_params_no_path() {
        let masked = mask_url("https://node.example.com?api_key=secret");
        assert_eq!(masked, "https://node.example.com?***");
    }

    #[test]
    fn test_mask_url_invalid_no_scheme() {
        assert_eq!(mask_url("invalid-url"), "***");
        assert_eq!(mask_url(""), "***");
    }
}
