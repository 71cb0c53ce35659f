//! Thumbnail URL resolution.
//!
//! Providers hand back thumbnails in three shapes: absolute URLs,
//! protocol-relative URLs (`//host/path`) and size templates
//! (`.../{width}x{height}/img.jpg`, also `%{width}`). Records only ever store
//! the absolute form.

/// Width substituted into templated thumbnail URLs.
pub const THUMBNAIL_WIDTH: u32 = 640;
/// Height substituted into templated thumbnail URLs.
pub const THUMBNAIL_HEIGHT: u32 = 360;

/// Resolves a raw provider thumbnail URL into an absolute URL with no
/// remaining size placeholders.
pub fn resolve_thumbnail_url(raw: &str) -> String {
    let width = THUMBNAIL_WIDTH.to_string();
    let height = THUMBNAIL_HEIGHT.to_string();

    let filled = raw
        .trim()
        .replace("%{width}", &width)
        .replace("%{height}", &height)
        .replace("{width}", &width)
        .replace("{height}", &height);

    if filled.starts_with("//") {
        format!("https:{filled}")
    } else {
        filled
    }
}
