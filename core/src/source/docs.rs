//! # Doc Comments
//!
//! Reads `///` documentation attached to an item and turns it into annotations.

use crate::annotations::Annotations;
use ra_ap_syntax::{SyntaxKind, SyntaxNode};

/// Collects the `///` comment lines attached to `node`.
pub(crate) fn extract_doc_comment(node: &SyntaxNode) -> Option<String> {
    let mut lines = Vec::new();

    for child in node.children_with_tokens() {
        if child.kind() == SyntaxKind::COMMENT {
            let text = child.to_string();
            // `////` is a plain comment, not documentation.
            if text.starts_with("////") {
                continue;
            }
            if let Some(content) = text.strip_prefix("///") {
                lines.push(content.strip_prefix(' ').unwrap_or(content).to_owned());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n").trim().to_string())
    }
}

/// Parses the annotation block of `node`'s doc comment.
pub(crate) fn annotations_of(node: &SyntaxNode) -> Annotations {
    extract_doc_comment(node)
        .map(|doc| Annotations::parse(&doc))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ra_ap_edition::Edition;
    use ra_ap_syntax::{ast, AstNode, SourceFile};

    fn first_struct(code: &str) -> ast::Struct {
        let parse = SourceFile::parse(code, Edition::Edition2021);
        parse
            .tree()
            .syntax()
            .descendants()
            .find_map(ast::Struct::cast)
            .expect("struct missing")
    }

    #[test]
    fn test_doc_lines_joined() {
        let s = first_struct(
            r#"
            /// Manages users.
            ///
            /// Path: /users
            struct Users;
            "#,
        );
        assert_eq!(
            extract_doc_comment(s.syntax()).as_deref(),
            Some("Manages users.\n\nPath: /users")
        );
        assert_eq!(annotations_of(s.syntax()).get("path"), Some("/users"));
    }

    #[test]
    fn test_plain_comments_ignored() {
        let s = first_struct(
            r#"
            // Path: /hidden
            //// Path: /also-hidden
            struct Users;
            "#,
        );
        assert!(extract_doc_comment(s.syntax()).is_none());
        assert!(annotations_of(s.syntax()).is_empty());
    }
}
