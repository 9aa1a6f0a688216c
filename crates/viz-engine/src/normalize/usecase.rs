//! Use-case diagram repairs

use once_cell::sync::Lazy;
use regex::Regex;

/// A parenthesised label with no quotes or nested parentheses inside.
static BARE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\(\s*([^()"\s][^()"]*?)\s*\)"#).expect("valid label pattern"));

pub(super) fn normalize(source: &str) -> String {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| {
            if index == 0 {
                line.to_string()
            } else {
                BARE_LABEL.replace_all(line, "(\"$1\")").into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_bare_labels() {
        let source = "usecaseDiagram\n  actor User\n  User --> (Do Something)";
        assert_eq!(
            normalize(source),
            "usecaseDiagram\n  actor User\n  User --> (\"Do Something\")"
        );
    }

    #[test]
    fn test_quoted_labels_are_untouched() {
        let source = "usecaseDiagram\n  User --> (\"Log In\")\n  Admin --> ()";
        assert_eq!(normalize(source), source);
    }

    #[test]
    fn test_trims_padding_inside_parentheses() {
        assert_eq!(
            normalize("usecaseDiagram\nA --> ( Pay Bill ) & (Refund)"),
            "usecaseDiagram\nA --> (\"Pay Bill\") & (\"Refund\")"
        );
    }

    #[test]
    fn test_is_idempotent() {
        let once = normalize("usecaseDiagram\nUser --> (Browse)");
        assert_eq!(normalize(&once), once);
    }
}
