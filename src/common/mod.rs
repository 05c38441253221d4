use std::time::Duration;

/// Extensions the resize pipeline accepts. Anything else is rejected
/// before any remote call is made.
pub const VALID_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Key prefix for the derived thumbnail copy of a photo.
pub const RESIZED_PREFIX: &str = "resized-";

/// Larger dimension of a derived thumbnail.
pub const THUMBNAIL_MAX_DIMENSION: u32 = 300;

/// Bounds for every outbound adapter call. A timed-out call is reported
/// like any other failed step instead of hanging the request.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifetime of a freshly minted row-store token.
pub const DB_TOKEN_TTL_SECS: u64 = 60;

pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
