//! Artifact extraction
//!
//! Pure transform from a fetched [`DetailRecord`] to the `(name, payload)`
//! pair the sink persists. No I/O; the only failure mode is a record too
//! malformed to derive a file name from.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ExtractError;
use crate::types::{Artifact, DetailRecord};

/// Characters that must never appear in an artifact file name: path
/// separators and reserved punctuation, quotes, whitespace of any kind, and
/// ASCII control characters.
#[allow(clippy::expect_used)]
static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[\\/*?:"'<>|\s\x00-\x1F\x7F]"#).expect("character class is a valid pattern")
});

/// Replace every filesystem-unsafe character with a single underscore
///
/// Idempotent: a name that is already safe comes back unchanged.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_CHARS.replace_all(title, "_").into_owned()
}

/// Derive the artifact for one fetched page
///
/// The file name is the sanitized title plus `extension`; the payload is the
/// serialized reference list (newline-joined, no trailing newline).
///
/// # Errors
///
/// Returns [`ExtractError::BlankTitle`] when the title is empty or
/// whitespace-only, since the sanitized name would carry no information.
pub fn extract(record: &DetailRecord, extension: &str) -> Result<Artifact, ExtractError> {
    if record.title.trim().is_empty() {
        return Err(ExtractError::BlankTitle);
    }

    Ok(Artifact {
        file_name: format!("{}.{}", sanitize_title(&record.title), extension),
        payload: record.references.to_text(),
    })
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;

    fn record(title: &str, references: &[&str]) -> DetailRecord {
        DetailRecord {
            title: title.to_string(),
            references: Payload::Sequence(references.iter().map(|r| r.to_string()).collect()),
        }
    }

    #[test]
    fn sanitize_replaces_every_reserved_character() {
        let sanitized = sanitize_title(r#"a\b/c*d?e:f"g'h<i>j|k"#);
        assert_eq!(sanitized, "a_b_c_d_e_f_g_h_i_j_k");
    }

    #[test]
    fn sanitize_replaces_whitespace_and_control_characters() {
        assert_eq!(sanitize_title("two words"), "two_words");
        assert_eq!(sanitize_title("tab\there"), "tab_here");
        assert_eq!(sanitize_title("line\nbreak"), "line_break");
        assert_eq!(sanitize_title("nul\x00byte"), "nul_byte");
        assert_eq!(sanitize_title("del\x7fchar"), "del_char");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let once = sanitize_title(r#"C++: A/B?"#);
        let twice = sanitize_title(&once);
        assert_eq!(once, twice, "sanitizing a sanitized name must be a no-op");
    }

    #[test]
    fn sanitize_keeps_safe_punctuation() {
        // '+', '.', '-', '(' and ')' are fine in file names and survive
        assert_eq!(sanitize_title("C++ (language)"), "C++_(language)");
        assert_eq!(sanitize_title("Web 2.0"), "Web_2.0");
    }

    #[test]
    fn sanitize_keeps_non_ascii_titles() {
        assert_eq!(sanitize_title("Łódź"), "Łódź");
        assert_eq!(sanitize_title("数学 (学科)"), "数学_(学科)");
    }

    #[test]
    fn extract_cpp_scenario() {
        let artifact = extract(&record("C++: A/B?", &[]), "txt").unwrap();
        assert_eq!(artifact.file_name, "C++__A_B_.txt");
    }

    #[test]
    fn extract_appends_extension_to_sanitized_title() {
        let artifact = extract(&record("Alpha", &["r1", "r2"]), "txt").unwrap();
        assert_eq!(artifact.file_name, "Alpha.txt");
        assert_eq!(artifact.payload, "r1\nr2");
    }

    #[test]
    fn extract_empty_reference_list_yields_empty_payload() {
        let artifact = extract(&record("Gamma", &[]), "txt").unwrap();
        assert_eq!(artifact.payload, "");
    }

    #[test]
    fn extract_single_reference_has_no_trailing_newline() {
        let artifact = extract(&record("Beta", &["only"]), "txt").unwrap();
        assert_eq!(artifact.payload, "only");
    }

    #[test]
    fn extract_scalar_payload_is_stringified_directly() {
        let rec = DetailRecord {
            title: "Answer".into(),
            references: Payload::Scalar("42".into()),
        };
        let artifact = extract(&rec, "txt").unwrap();
        assert_eq!(artifact.payload, "42");
    }

    #[test]
    fn extract_rejects_blank_title() {
        assert!(matches!(
            extract(&record("", &["r1"]), "txt"),
            Err(ExtractError::BlankTitle)
        ));
        assert!(matches!(
            extract(&record("  \t ", &["r1"]), "txt"),
            Err(ExtractError::BlankTitle)
        ));
    }

    #[test]
    fn produced_names_contain_no_forbidden_characters() {
        let nasty = "Mixed: \\ / * ? \" ' < > | \t title";
        let artifact = extract(&record(nasty, &[]), "txt").unwrap();
        let stem = artifact.file_name.trim_end_matches(".txt");
        for forbidden in ['\\', '/', '*', '?', ':', '"', '\'', '<', '>', '|', ' ', '\t'] {
            assert!(
                !stem.contains(forbidden),
                "{forbidden:?} survived sanitization in {stem:?}"
            );
        }
    }
}
