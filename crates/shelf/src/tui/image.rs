//! Terminal image support

use image::DynamicImage;

/// Set to `0` to never draw images, or `1` to try even on unknown terminals.
const IMAGES_ENV: &str = "SHELF_IMAGES";

/// Whether the terminal supports image display
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageProtocol {
    Supported,
    None,
}

impl ImageProtocol {
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var(IMAGES_ENV).ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
            std::env::var("TERM_PROGRAM").ok().as_deref(),
        )
    }

    fn from_env(forced: Option<&str>, term: Option<&str>, program: Option<&str>) -> Self {
        match forced {
            Some("0") => return ImageProtocol::None,
            Some("1") => return ImageProtocol::Supported,
            _ => {}
        }

        let term = term.unwrap_or_default();
        if term.contains("kitty") || term.contains("ghostty") {
            return ImageProtocol::Supported;
        }
        let program = program.unwrap_or_default().to_lowercase();
        if ["ghostty", "wezterm", "iterm"]
            .iter()
            .any(|p| program.contains(p))
        {
            return ImageProtocol::Supported;
        }
        ImageProtocol::None
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ImageProtocol::Supported)
    }
}

/// Decode PNG/JPEG/WebP bytes.
pub fn decode_image(bytes: &[u8]) -> Option<DynamicImage> {
    image::load_from_memory(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_terminals() {
        assert!(ImageProtocol::from_env(None, Some("xterm-kitty"), None).is_supported());
        assert!(ImageProtocol::from_env(None, Some("xterm-256color"), Some("ghostty")).is_supported());
        assert!(ImageProtocol::from_env(None, None, Some("WezTerm")).is_supported());
        assert!(!ImageProtocol::from_env(None, Some("xterm-256color"), Some("Apple_Terminal")).is_supported());
    }

    #[test]
    fn test_env_override() {
        assert!(!ImageProtocol::from_env(Some("0"), Some("xterm-kitty"), None).is_supported());
        assert!(ImageProtocol::from_env(Some("1"), Some("dumb"), None).is_supported());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"not an image").is_none());
    }
}
