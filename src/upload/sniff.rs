//! Content-type detection from file bytes
//!
//! The declared multipart content type is never trusted; only the leading
//! bytes decide what gets stored.

/// How far into a text file we look for an `<svg` root
const SVG_SNIFF_WINDOW: usize = 1024;

/// Detect an allow-listed format from magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }

    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(b"%PDF-") {
        return Some("application/pdf");
    }
    if looks_like_svg(bytes) {
        return Some("image/svg+xml");
    }

    None
}

/// Best description of the content, used in rejection messages
pub fn describe_mime(bytes: &[u8]) -> &'static str {
    if let Some(mime) = sniff_mime(bytes) {
        return mime;
    }
    if bytes.is_empty() {
        return "application/x-empty";
    }
    let window = &bytes[..bytes.len().min(SVG_SNIFF_WINDOW)];
    match std::str::from_utf8(window) {
        Ok(_) => "text/plain",
        // A multibyte sequence cut by the window is still text
        Err(e) if e.error_len().is_none() => "text/plain",
        Err(_) => "application/octet-stream",
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SVG_SNIFF_WINDOW)];
    let text = String::from_utf8_lossy(window);
    let head = text.trim_start_matches('\u{feff}').trim_start();

    let starts_as_markup =
        head.starts_with("<?xml") || head.starts_with("<svg") || head.starts_with("<!DOCTYPE svg");
    starts_as_markup && head.contains("<svg")
}
