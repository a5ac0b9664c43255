//! YARA rule set decoding via the `yara-x` parser.
//!
//! The source is parsed into an AST, not compiled: only grammar violations
//! are errors. Unused patterns, missing imports and repeated identifiers are
//! semantic concerns and pass through; rules come back in declaration order
//! with their identifier and tags.

use yara_x_parser::Parser;
use yara_x_parser::ast::AST;

use crate::ast::TaggedEntity;
use crate::error::{ParseError, Result};

/// Decode a YARA rule set into one entity per rule.
///
/// A source that contains no rules is valid and yields an empty vector.
/// Rules sharing an identifier are all returned; folding them into a
/// corpus keeps the last one.
pub fn parse_yara_rules(source: &[u8]) -> Result<Vec<TaggedEntity>> {
    let ast = AST::from(Parser::new(source));

    if let Some(error) = ast.errors().first() {
        return Err(ParseError::Yara(format!("{error:?}")));
    }

    Ok(ast
        .rules()
        .map(|rule| {
            let tags = rule
                .tags
                .iter()
                .flatten()
                .map(|tag| tag.name.to_string())
                .collect();
            TaggedEntity::new(rule.identifier.name, tags)
        })
        .collect())
}
