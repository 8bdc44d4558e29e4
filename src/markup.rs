//! Text-to-markup helpers. Wrapping tags are trusted; text never is.

/// Escape text for insertion into HTML content or attribute values.
///
/// Ampersands go first so entities produced by the later substitutions are
/// not escaped twice.
pub fn escape_html(unsafe_text: &str) -> String {
    unsafe_text
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Human-readable byte count: repeated division by 1024, one decimal place,
/// a trailing `.0` dropped.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.1}");
    let trimmed = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", trimmed, UNITS[unit])
}
