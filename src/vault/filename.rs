//! File name sanitization
//!
//! Reduces an untrusted file name to a safe basename: no directory
//! components, ASCII alphanumerics plus `.`, `-` and `_` only.

/// Name used when nothing usable survives sanitization
pub const FALLBACK_FILE_NAME: &str = "file";

/// Sanitize an untrusted file name
pub fn sanitize_file_name(name: &str) -> String {
    let basename = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default();

    let cleaned: String = basename
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let trimmed = cleaned.trim_matches(|c: char| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("n"), "n");
        assert_eq!(sanitize_file_name("archive.tar.gz"), "archive.tar.gz");
    }

    #[test]
    fn test_directories_are_stripped() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\notes.txt"), "notes.txt");
    }

    #[test]
    fn test_whitespace_and_symbols() {
        assert_eq!(sanitize_file_name("my secret file.txt"), "my_secret_file.txt");
        assert_eq!(sanitize_file_name("résumé (v2).doc"), "rsum_v2.doc");
    }

    #[test]
    fn test_hidden_and_empty_names() {
        assert_eq!(sanitize_file_name(".bashrc"), "bashrc");
        assert_eq!(sanitize_file_name(".."), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("dir/"), FALLBACK_FILE_NAME);
    }
}
