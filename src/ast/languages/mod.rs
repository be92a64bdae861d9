use tree_sitter::Language;

mod python;

/// Grammar labels accepted by [`resolve_language`].
pub const SUPPORTED_LANGUAGES: &[&str] = &["py", "python", "pyi"];

pub fn resolve_language(label: &str) -> Option<Language> {
    let normalized = label.trim().to_lowercase();
    python::resolve_language(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_python_labels_in_any_case() {
        assert!(resolve_language("python").is_some());
        assert!(resolve_language(" PY ").is_some());
    }

    #[test]
    fn every_listed_label_resolves() {
        for label in SUPPORTED_LANGUAGES {
            assert!(resolve_language(label).is_some(), "label {label}");
        }
    }

    #[test]
    fn rejects_unknown_labels() {
        assert!(resolve_language("typescript").is_none());
        assert!(resolve_language("").is_none());
    }
}
