//! Filename derivation for fetched images.

use image::ImageFormat;
use url::Url;

use crate::fetcher::Digest;

/// Extension used when the declared content type maps to no known image format.
const DEFAULT_EXTENSION: &str = "jpg";

/// Prefix of names synthesized for URLs whose path carries no usable file name.
const SYNTHESIZED_PREFIX: &str = "downloaded_image_";

/// Derives the on-disk file name for a fetched image.
///
/// Two different URLs can resolve to the same name; the later write replaces
/// the earlier file.
#[derive(Debug, Default, Clone, Copy)]
pub struct FilenameResolver;

impl FilenameResolver {
    /// Resolve a safe file name from the URL path, falling back to a name
    /// synthesized from the URL digest and the declared content type.
    ///
    /// # Arguments
    ///
    /// * `url`: The URL the image was fetched from.
    /// * `content_type`: The `Content-Type` header value of the response.
    ///
    /// returns: String
    pub fn resolve(url: &str, content_type: &str) -> String {
        let candidate = Self::base_name(url)
            .filter(|name| name.contains('.'))
            .map(|name| sanitize_filename(&name))
            .filter(|name| !name.chars().all(|c| c == '.'));

        match candidate {
            Some(name) => name,
            None => sanitize_filename(&Self::synthesize(url, content_type)),
        }
    }

    /// Last segment of the percent-decoded URL path, if any.
    fn base_name(url: &str) -> Option<String> {
        let parsed = Url::parse(url).ok()?;
        let decoded = urlencoding::decode_binary(parsed.path().as_bytes());
        let path = String::from_utf8_lossy(&decoded);
        let name = path.rsplit('/').next()?;
        if name.is_empty() {
            return None;
        }
        Some(name.to_string())
    }

    fn synthesize(url: &str, content_type: &str) -> String {
        let digest = Digest::of(url.as_bytes()).to_hex();
        format!(
            "{}{}.{}",
            SYNTHESIZED_PREFIX,
            &digest[..8],
            extension_for_content_type(content_type)
        )
    }
}

/// Map a declared content type to a file extension (without the dot).
///
/// Parameters such as `; charset=binary` are ignored. `jpe` and `jpeg` are
/// normalized to `jpg`.
pub fn extension_for_content_type(content_type: &str) -> &'static str {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let extension = ImageFormat::from_mime_type(&media_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(DEFAULT_EXTENSION);

    match extension {
        "jpe" | "jpeg" => "jpg",
        other => other,
    }
}

/// Strip every character that is not alphanumeric, `-`, `_` or `.`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect::<String>()
        .trim_end()
        .to_string()
}
