//! Class diagram repairs

use once_cell::sync::Lazy;
use regex::Regex;

static ENUM_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)enum\s+([A-Za-z_][\w~]*)\s*\{\s*$").expect("valid enum pattern")
});

static CLASS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*class\s+\S+.*\{\s*$").expect("valid class pattern"));

/// `A -> B` with an optional `: label`. The identifiers exclude `-` and `.`
/// so `-->`, `..>` and `<->` never match.
static BARE_ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)([A-Za-z_][\w~]*)\s*->\s*([A-Za-z_][\w~]*)\s*(:.*)?$")
        .expect("valid arrow pattern")
});

const VISIBILITY_MARKERS: [char; 4] = ['+', '-', '#', '~'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Class,
    Other,
}

pub(super) fn normalize(source: &str) -> String {
    let mut out: Vec<String> = Vec::with_capacity(source.lines().count());
    let mut blocks: Vec<Block> = Vec::new();

    for (index, line) in source.lines().enumerate() {
        if index == 0 {
            out.push(line.to_string());
            continue;
        }

        let trimmed = line.trim();

        if trimmed == "}" {
            blocks.pop();
            out.push(line.to_string());
            continue;
        }

        if let Some(caps) = ENUM_BLOCK.captures(line) {
            let indent = &caps[1];
            out.push(format!("{indent}class {} {{", &caps[2]));
            out.push(format!("{indent}  <<enumeration>>"));
            blocks.push(Block::Class);
            continue;
        }

        if CLASS_BLOCK.is_match(line) {
            blocks.push(Block::Class);
            out.push(line.to_string());
            continue;
        }

        if trimmed.ends_with('{') {
            blocks.push(Block::Other);
            out.push(line.to_string());
            continue;
        }

        if blocks.last() == Some(&Block::Class) {
            out.push(space_after_visibility(line));
            continue;
        }

        if let Some(caps) = BARE_ARROW.captures(line) {
            let label = caps
                .get(4)
                .map(|m| format!(" {}", m.as_str().trim_end()))
                .unwrap_or_default();
            out.push(format!("{}{} --|> {}{}", &caps[1], &caps[2], &caps[3], label));
            continue;
        }

        out.push(line.to_string());
    }

    out.join("\n")
}

/// `+name` → `+ name`; lines that already have the space, or that start
/// with something other than a single marker, are returned untouched.
fn space_after_visibility(line: &str) -> String {
    let trimmed = line.trim_start();
    let indent = &line[..line.len() - trimmed.len()];

    let mut chars = trimmed.chars();
    let (Some(marker), Some(next)) = (chars.next(), chars.next()) else {
        return line.to_string();
    };

    if !VISIBILITY_MARKERS.contains(&marker)
        || next.is_whitespace()
        || VISIBILITY_MARKERS.contains(&next)
        || next == '>'
    {
        return line.to_string();
    }

    format!("{indent}{marker} {}", &trimmed[marker.len_utf8()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_becomes_stereotyped_class() {
        let source = "classDiagram\n  enum Color {\n    RED\n    GREEN\n  }";
        let out = normalize(source);
        assert_eq!(
            out,
            "classDiagram\n  class Color {\n    <<enumeration>>\n    RED\n    GREEN\n  }"
        );
        assert!(!out.lines().any(|l| l.trim_start().starts_with("enum ")));
    }

    #[test]
    fn test_bare_arrow_becomes_generalization() {
        let source = "classDiagram\n  Dog -> Animal\n  Cat->Animal : is a";
        assert_eq!(
            normalize(source),
            "classDiagram\n  Dog --|> Animal\n  Cat --|> Animal : is a"
        );
    }

    #[test]
    fn test_valid_relations_are_untouched() {
        let source = "classDiagram\n  A --> B\n  C ..> D\n  E <|-- F\n  G-->H";
        assert_eq!(normalize(source), source);
    }

    #[test]
    fn test_visibility_marker_gets_space_inside_body() {
        let source = "classDiagram\n  class User {\n    +name\n    -String password\n    # id\n    +login() bool\n  }\n  -not a member";
        assert_eq!(
            normalize(source),
            "classDiagram\n  class User {\n    + name\n    - String password\n    # id\n    + login() bool\n  }\n  -not a member"
        );
    }

    #[test]
    fn test_enum_members_are_not_rewritten_as_arrows() {
        let source = "classDiagram\nenum Status {\nA\n}\nOrder -> Status";
        assert_eq!(
            normalize(source),
            "classDiagram\nclass Status {\n  <<enumeration>>\nA\n}\nOrder --|> Status"
        );
    }

    #[test]
    fn test_namespace_body_is_not_a_class_body() {
        let source = "classDiagram\nnamespace Shapes {\n  class Circle\n}";
        assert_eq!(normalize(source), source);
    }
}
