//! Small shared helpers for URL handling

use url::Url;

/// Normalize an extracted link target against the site base URL.
///
/// Absolute http(s) URLs pass through untouched; relative targets are
/// joined against `base`. Empty targets and bare fragments yield `None`.
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.parts-unlimited.com";

    #[test]
    fn relative_path_is_joined() {
        assert_eq!(
            absolutize(BASE, "/product/20101555").as_deref(),
            Some("https://www.parts-unlimited.com/product/20101555")
        );
    }

    #[test]
    fn bare_path_is_joined() {
        assert_eq!(
            absolutize(BASE, "product/20101555").as_deref(),
            Some("https://www.parts-unlimited.com/product/20101555")
        );
    }

    #[test]
    fn absolute_url_passes_through() {
        assert_eq!(
            absolutize(BASE, "https://cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
    }

    #[test]
    fn fragments_and_blanks_are_dropped() {
        assert_eq!(absolutize(BASE, "#"), None);
        assert_eq!(absolutize(BASE, "   "), None);
    }
}
