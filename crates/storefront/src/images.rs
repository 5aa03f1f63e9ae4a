//! Image URL resolution for backend-served assets.
//!
//! The API stores uploads as paths relative to the backend host
//! (`/uploads/bag.jpg`), while the API itself lives under `/api`.

/// Shown when a product has no image.
pub const PLACEHOLDER_IMAGE: &str = "/assets/images/logo.png";

/// The backend origin: the API base URL with its `/api` suffix removed.
#[must_use]
pub fn backend_origin(api_base_url: &str) -> &str {
    let trimmed = api_base_url.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed)
}

/// Resolve an image path from the API into a URL a client can load.
///
/// - missing or blank: [`PLACEHOLDER_IMAGE`]
/// - absolute `http(s)` URL: unchanged
/// - anything else: joined to the backend origin with a leading `/`
#[must_use]
pub fn resolve_image_url(api_base_url: &str, path: Option<&str>) -> String {
    let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let origin = backend_origin(api_base_url);
    if path.starts_with('/') {
        format!("{origin}{path}")
    } else {
        format!("{origin}/{path}")
    }
}

/// Resolve a gallery of image paths.
#[must_use]
pub fn resolve_image_urls(api_base_url: &str, paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .map(|p| resolve_image_url(api_base_url, Some(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const API: &str = "http://localhost:5000/api";

    #[test]
    fn test_placeholder_for_missing_path() {
        assert_eq!(resolve_image_url(API, None), PLACEHOLDER_IMAGE);
        assert_eq!(resolve_image_url(API, Some("  ")), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_absolute_urls_unchanged() {
        let cdn = "https://cdn.example.com/bag.jpg";
        assert_eq!(resolve_image_url(API, Some(cdn)), cdn);
        assert_eq!(
            resolve_image_url(API, Some("http://img.example.com/a.png")),
            "http://img.example.com/a.png"
        );
    }

    #[test]
    fn test_relative_paths_join_backend_origin() {
        assert_eq!(
            resolve_image_url(API, Some("/uploads/bag.jpg")),
            "http://localhost:5000/uploads/bag.jpg"
        );
        assert_eq!(
            resolve_image_url(API, Some("uploads/bag.jpg")),
            "http://localhost:5000/uploads/bag.jpg"
        );
    }

    #[test]
    fn test_backend_origin() {
        assert_eq!(backend_origin("http://localhost:5000/api"), "http://localhost:5000");
        assert_eq!(backend_origin("https://api.shop.pk/api/"), "https://api.shop.pk");
        assert_eq!(backend_origin("https://shop.pk"), "https://shop.pk");
    }

    #[test]
    fn test_gallery() {
        let paths = vec!["a.jpg".to_string(), "https://x.pk/b.jpg".to_string()];
        assert_eq!(
            resolve_image_urls(API, &paths),
            vec!["http://localhost:5000/a.jpg", "https://x.pk/b.jpg"]
        );
    }
}
