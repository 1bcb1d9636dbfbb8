//! Exclusion rules deciding whether a request counts as a pageview.

use axum::http::StatusCode;
use regex::Regex;
use std::sync::LazyLock;

use crate::domain::policy::RelayPolicy;

/// Extensions of stylesheets, scripts, images, media, fonts and source maps.
pub const STATIC_ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "bmp", "tiff", "mp3", "mp4",
    "avi", "mov", "webm", "ogg", "wav", "flac", "woff", "woff2", "ttf", "map",
];

static STATIC_ASSET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\.({})$", STATIC_ASSET_EXTENSIONS.join("|"))).unwrap()
});

/// Why a request was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ErrorStatus(StatusCode),
    StaticAsset,
}

/// Returns `true` if `path` ends in a static-asset extension.
///
/// Matching is case-sensitive and expects a path without query string.
pub fn is_static_asset(path: &str) -> bool {
    STATIC_ASSET_REGEX.is_match(path)
}

/// Returns `true` for client and server error statuses.
pub fn is_error_status(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Applies the exclusion rules enabled in `policy`.
///
/// `status` is `None` when the event is dispatched before the response is
/// known; the status rule is then skipped.
pub fn check(policy: &RelayPolicy, path: &str, status: Option<StatusCode>) -> Option<SkipReason> {
    if policy.filter_error_status
        && let Some(status) = status
        && is_error_status(status)
    {
        return Some(SkipReason::ErrorStatus(status));
    }

    if policy.filter_static_assets && is_static_asset(path) {
        return Some(SkipReason::StaticAsset);
    }

    None
}
