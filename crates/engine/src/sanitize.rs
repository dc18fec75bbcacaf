//! Turning catalog titles into file names.
//!
//! The result is always a single path component: path separators become
//! dashes, so `Show/Episode` stays readable as `Show-Episode`, and characters
//! that are invalid on Windows are replaced with underscores.

const PATH_SEPARATORS: &[char] = &['/', '\\'];

const WINDOWS_INVALID_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const FALLBACK_NAME: &str = "unnamed";

/// Sanitize a video title for use as a base file name (no extension).
///
/// ```
/// use canalplus_engine::sanitize::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Show/Title...  "), "Show-Title");
/// assert_eq!(sanitize_filename("what?"), "what_");
/// assert_eq!(sanitize_filename("CON"), "_CON");
/// ```
pub fn sanitize_filename(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut last_was_replacement = false;

    for c in title.chars() {
        if PATH_SEPARATORS.contains(&c) {
            result.push('-');
            last_was_replacement = false;
        } else if c.is_control() || WINDOWS_INVALID_CHARS.contains(&c) {
            if !last_was_replacement {
                result.push('_');
                last_was_replacement = true;
            }
        } else {
            result.push(c);
            last_was_replacement = false;
        }
    }

    let trimmed = result.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    let upper = trimmed.to_uppercase();
    let stem = upper.split('.').next().unwrap_or(&upper);
    if WINDOWS_RESERVED_NAMES.contains(&stem) {
        return format!("_{trimmed}");
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_and_trailing_dots() {
        let name = sanitize_filename("Show/Title...  ");
        assert_eq!(name, "Show-Title");
        assert!(!name.contains('/'));
        assert!(!name.ends_with('.') && !name.ends_with(' '));
    }

    #[test]
    fn test_no_parent_directory_escape() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "-..-etc-passwd");
        assert_eq!(sanitize_filename("a\\b"), "a-b");
        assert_eq!(sanitize_filename(".."), FALLBACK_NAME);
    }

    #[test]
    fn test_invalid_characters_collapse() {
        assert_eq!(
            sanitize_filename("Zapping: l'essentiel?"),
            "Zapping_ l'essentiel_"
        );
        assert_eq!(sanitize_filename("a<>:\"b"), "a_b");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(sanitize_filename("con"), "_con");
        assert_eq!(sanitize_filename("NUL.ts"), "_NUL.ts");
        assert_eq!(sanitize_filename("Console"), "Console");
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(sanitize_filename(""), FALLBACK_NAME);
        assert_eq!(sanitize_filename(" . . "), FALLBACK_NAME);
    }

    #[test]
    fn test_accents_preserved_and_idempotent() {
        let once = sanitize_filename("L'Émission d'après / Épisode 3 ");
        assert_eq!(once, "L'Émission d'après - Épisode 3");
        assert_eq!(sanitize_filename(&once), once);
    }
}
