//! Output format negotiation (spec.md §4.H).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Avif,
    WebP,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Avif => "avif",
            ImageFormat::WebP => "webp",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Avif => "image/avif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn from_query_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "avif" => Some(ImageFormat::Avif),
            "webp" => Some(ImageFormat::WebP),
            "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Picks the first of AVIF > WebP > JPEG the client's `Accept` header
    /// claims to support; JPEG is the universal fallback, per spec.md
    /// §4.H.
    pub fn negotiate(accept_hint: Option<&str>) -> Self {
        let hint = accept_hint.unwrap_or_default();
        if hint.contains("image/avif") {
            ImageFormat::Avif
        } else if hint.contains("image/webp") {
            ImageFormat::WebP
        } else {
            ImageFormat::Jpeg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_avif_when_accepted() {
        assert_eq!(ImageFormat::negotiate(Some("image/avif,image/webp,*/*")), ImageFormat::Avif);
    }

    #[test]
    fn falls_back_to_webp_then_jpeg() {
        assert_eq!(ImageFormat::negotiate(Some("image/webp,*/*")), ImageFormat::WebP);
        assert_eq!(ImageFormat::negotiate(Some("text/html")), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::negotiate(None), ImageFormat::Jpeg);
    }

    #[test]
    fn explicit_format_param_overrides_negotiation() {
        assert_eq!(ImageFormat::from_query_param("WEBP"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_query_param("bogus"), None);
    }
}
