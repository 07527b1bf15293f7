// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use axum::http::{request::Parts, HeaderName, HeaderValue, Method};
use lazy_static::lazy_static;
use tower_http::cors::{AllowOrigin, CorsLayer};

lazy_static! {
    // Fixed dev origins plus whatever FRONTEND_ORIGIN points at in a
    // deployed environment.
    static ref ALLOWED_ORIGINS: Vec<String> = {
        let mut origins = vec![
            "http://localhost:5173".to_string(),
            "http://127.0.0.1:5173".to_string(),
        ];
        if let Ok(extra) = std::env::var("FRONTEND_ORIGIN") {
            if !extra.trim().is_empty() {
                origins.push(extra);
            }
        }
        origins
    };
}

/// Exact allow-list match, or a Vercel preview deployment. Previews get a
/// fresh subdomain per branch, so they cannot be listed ahead of time.
fn origin_allowed(origin: &str) -> bool {
    if ALLOWED_ORIGINS.iter().any(|o| o == origin) {
        return true;
    }
    origin.starts_with("https://") && origin.ends_with(".vercel.app")
}

/// CORS layer for the whole router.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // Explicit list of headers the frontend sends. No token auth here,
        // so 'authorization' is not needed.
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
        ])
        .allow_origin(AllowOrigin::predicate(
            |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().map(origin_allowed).unwrap_or(false)
            },
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_origins_allowed() {
        assert!(origin_allowed("http://localhost:5173"));
        assert!(origin_allowed("http://127.0.0.1:5173"));
    }

    #[test]
    fn test_preview_subdomains_allowed() {
        assert!(origin_allowed("https://clientsync-git-main.vercel.app"));
        assert!(origin_allowed("https://anything.vercel.app"));
    }

    #[test]
    fn test_other_origins_rejected() {
        assert!(!origin_allowed("http://localhost:3000"));
        assert!(!origin_allowed("https://example.com"));
        // Plain-http previews and lookalike hosts don't pass.
        assert!(!origin_allowed("http://foo.vercel.app"));
        assert!(!origin_allowed("https://foo.vercel.app.evil.com"));
    }
}
