pub const MAX_STEM: usize = 32;

/// Reduce a display name to a filesystem-safe locator stem.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM)
        .collect();
    if stem.is_empty() {
        "file".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_unsafe_chars() {
        assert_eq!(file_stem("my notes.txt"), "my_notes_txt");
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
        assert_eq!(file_stem("año"), "a_o");
    }

    #[test]
    fn empty_and_long_names() {
        assert_eq!(file_stem("   "), "file");
        assert_eq!(file_stem(&"x".repeat(100)).len(), MAX_STEM);
    }
}
