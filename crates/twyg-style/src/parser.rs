//! Selector parser using the `cssparser` crate.
//!
//! Grammar accepted:
//!
//! ```text
//! list      := selector ("," selector)*
//! selector  := compound (combinator compound)*
//! combinator:= whitespace | ">" | "+" | "~"
//! compound  := (type | "*")? ("#" id | "." class | "[" attr ("=" value)? "]" | ":" pseudo)*
//! pseudo    := first-child | last-child | only-child | empty
//!            | nth-child(An+B) | not(compound)
//! ```
//!
//! Anything else is rejected with [`StyleError::InvalidSelector`]; a template
//! with a malformed selector never silently matches nothing.

use std::str::FromStr;

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, SourceLocation, Token};

use crate::selector::{AttributeSelector, Combinator, NthExpr, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};
use crate::{Result, StyleError};

type SelectorParseError<'i> = ParseError<'i, String>;

/// Parse a comma-separated selector list.
///
/// # Example
///
/// ```
/// use twyg_style::parse_selector_list;
///
/// let list = parse_selector_list("*, .twyg").unwrap();
/// assert_eq!(list.len(), 2);
/// assert!(parse_selector_list("p >").is_err());
/// ```
pub fn parse_selector_list(input: &str) -> Result<SelectorList> {
    let mut parser_input = ParserInput::new(input);
    let mut parser = Parser::new(&mut parser_input);

    match parser.parse_comma_separated(parse_selector) {
        Ok(selectors) => Ok(SelectorList::new(selectors)),
        Err(error) => {
            let message = describe(error);
            tracing::debug!(target: "twyg_style::parser", selector = input, %message, "rejected selector");
            Err(StyleError::invalid_selector(input, message))
        }
    }
}

impl SelectorList {
    /// Parse a selector list. Same as [`parse_selector_list`].
    pub fn parse(input: &str) -> Result<Self> {
        parse_selector_list(input)
    }
}

impl FromStr for SelectorList {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self> {
        parse_selector_list(s)
    }
}

fn describe(error: SelectorParseError<'_>) -> String {
    let column = error.location.column;
    let message = match error.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => "unexpected end of input".to_string(),
        ParseErrorKind::Basic(other) => format!("{:?}", other),
    };
    format!("{} at column {}", message, column)
}

/// Parse one complex selector up to the next comma.
fn parse_selector<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<Selector, SelectorParseError<'i>> {
    let mut parts = Vec::new();
    let mut combinators = Vec::new();
    let mut current = SelectorPart::default();
    let mut pending: Option<Combinator> = None;
    let mut saw_whitespace = false;

    parser.skip_whitespace();

    loop {
        let location = parser.current_source_location();
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        let explicit = match &token {
            Token::WhiteSpace(_) => {
                saw_whitespace = true;
                continue;
            }
            Token::Delim('>') => Some(Combinator::Child),
            Token::Delim('+') => Some(Combinator::AdjacentSibling),
            Token::Delim('~') => Some(Combinator::GeneralSibling),
            _ => None,
        };

        if let Some(combinator) = explicit {
            if current.is_empty() {
                return Err(location.new_custom_error(format!("expected a selector before {:?}", token)));
            }
            parts.push(std::mem::take(&mut current));
            pending = Some(combinator);
            saw_whitespace = false;
            continue;
        }

        if current.is_empty() {
            if let Some(combinator) = pending.take() {
                combinators.push(combinator);
            }
        } else if saw_whitespace {
            parts.push(std::mem::take(&mut current));
            combinators.push(Combinator::Descendant);
        }
        saw_whitespace = false;

        apply_simple_token(parser, token, &mut current, location)?;
    }

    if pending.is_some() {
        return Err(parser.new_custom_error("selector ends with a combinator".to_string()));
    }
    if current.is_empty() {
        return Err(parser.new_custom_error("empty selector".to_string()));
    }
    parts.push(current);

    Ok(Selector { parts, combinators })
}

/// Add one simple selector, introduced by `token`, to `part`.
fn apply_simple_token<'i>(
    parser: &mut Parser<'i, '_>,
    token: Token<'i>,
    part: &mut SelectorPart,
    location: SourceLocation,
) -> std::result::Result<(), SelectorParseError<'i>> {
    match token {
        Token::Ident(name) => {
            if !part.is_empty() {
                return Err(location.new_custom_error(format!("type selector '{}' must come first", name)));
            }
            part.type_selector = Some(TypeSelector::Type(name.to_ascii_lowercase()));
        }
        Token::Delim('*') => {
            if !part.is_empty() {
                return Err(location.new_custom_error("'*' must come first".to_string()));
            }
            part.type_selector = Some(TypeSelector::Universal);
        }
        Token::Delim('.') => {
            let class = match parser.next_including_whitespace() {
                Ok(Token::Ident(class)) => class.to_string(),
                _ => return Err(location.new_custom_error("expected a class name after '.'".to_string())),
            };
            part.classes.push(class);
        }
        Token::IDHash(id) => {
            if part.id.is_some() {
                return Err(location.new_custom_error("only one id selector is allowed".to_string()));
            }
            part.id = Some(id.to_string());
        }
        Token::Hash(id) => {
            return Err(location.new_custom_error(format!("'#{}' is not a valid id", id)));
        }
        Token::SquareBracketBlock => {
            let attribute = parser.parse_nested_block(parse_attribute)?;
            part.attributes.push(attribute);
        }
        Token::Colon => {
            let pseudo = parse_pseudo_class(parser, location)?;
            part.pseudo_classes.push(pseudo);
        }
        other => return Err(location.new_unexpected_token_error(other)),
    }
    Ok(())
}

/// Parse the inside of `[name]` or `[name=value]`.
fn parse_attribute<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<AttributeSelector, SelectorParseError<'i>> {
    let name = parser.expect_ident()?.to_string();
    if parser.is_exhausted() {
        return Ok(AttributeSelector::present(name));
    }
    parser.expect_delim('=')?;
    let value = parser.expect_ident_or_string()?.to_string();
    Ok(AttributeSelector::equals(name, value))
}

/// Parse a pseudo-class after its ':'.
fn parse_pseudo_class<'i>(
    parser: &mut Parser<'i, '_>,
    location: SourceLocation,
) -> std::result::Result<PseudoClass, SelectorParseError<'i>> {
    let token = parser.next_including_whitespace()?.clone();
    match token {
        Token::Ident(name) => PseudoClass::from_css(&name)
            .ok_or_else(|| location.new_custom_error(format!("unknown pseudo-class ':{}'", name))),
        Token::Function(name) => match name.to_ascii_lowercase().as_str() {
            "nth-child" => {
                let (a, b) = parser.parse_nested_block(|p| cssparser::parse_nth(p).map_err(SelectorParseError::from))?;
                Ok(PseudoClass::NthChild(NthExpr::new(a, b)))
            }
            "not" => {
                let inner = parser.parse_nested_block(parse_compound)?;
                Ok(PseudoClass::Not(Box::new(inner)))
            }
            _ => Err(location.new_custom_error(format!("unknown pseudo-class ':{}()'", name))),
        },
        other => Err(location.new_unexpected_token_error(other)),
    }
}

/// Parse a single compound selector (the argument of `:not()`).
fn parse_compound<'i>(parser: &mut Parser<'i, '_>) -> std::result::Result<SelectorPart, SelectorParseError<'i>> {
    let mut part = SelectorPart::default();
    parser.skip_whitespace();

    while !parser.is_exhausted() {
        let location = parser.current_source_location();
        let token = parser.next_including_whitespace()?.clone();
        if let Token::WhiteSpace(_) = token {
            if parser.is_exhausted() {
                break;
            }
            return Err(location.new_custom_error(":not() takes a single compound selector".to_string()));
        }
        apply_simple_token(parser, token, &mut part, location)?;
    }

    if part.is_empty() {
        return Err(parser.new_custom_error("empty :not() argument".to_string()));
    }
    Ok(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Selector {
        let list = parse_selector_list(input).unwrap();
        assert_eq!(list.len(), 1, "expected a single selector in {input:?}");
        list.selectors.into_iter().next().unwrap()
    }

    fn message(input: &str) -> String {
        match parse_selector_list(input) {
            Err(StyleError::InvalidSelector { selector, message }) => {
                assert_eq!(selector, input);
                message
            }
            Ok(list) => panic!("{input:?} parsed as {list}"),
        }
    }

    #[test]
    fn parse_default_list() {
        let list = parse_selector_list("*, .twyg").unwrap();
        assert_eq!(list.selectors[0], Selector::universal());
        assert_eq!(list.selectors[1], Selector::class("twyg"));
        assert_eq!(list.to_string(), "*, .twyg");
    }

    #[test]
    fn parse_compound_selector() {
        let sel = parse_one("DIV#room.chat-room.wide[data-twyg-init]");
        let part = &sel.parts[0];
        assert_eq!(part.type_selector, Some(TypeSelector::Type("div".to_string())));
        assert_eq!(part.id.as_deref(), Some("room"));
        assert_eq!(part.classes, vec!["chat-room", "wide"]);
        assert_eq!(part.attributes, vec![AttributeSelector::present("data-twyg-init")]);
    }

    #[test]
    fn parse_attribute_values() {
        let sel = parse_one("[data-kind=row][title=\"two words\"]");
        assert_eq!(
            sel.parts[0].attributes,
            vec![
                AttributeSelector::equals("data-kind", "row"),
                AttributeSelector::equals("title", "two words"),
            ]
        );
    }

    #[test]
    fn parse_combinators() {
        let sel = parse_one(".chat-room  .chat-input>p + p ~ span");
        assert_eq!(sel.parts.len(), 5);
        assert_eq!(
            sel.combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::AdjacentSibling,
                Combinator::GeneralSibling,
            ]
        );
        assert_eq!(sel.to_string(), ".chat-room .chat-input > p + p ~ span");
    }

    #[test]
    fn parse_pseudo_classes() {
        let sel = parse_one("p:first-child:nth-child(2n+1):not(.twyg-edit):empty");
        assert_eq!(
            sel.parts[0].pseudo_classes,
            vec![
                PseudoClass::FirstChild,
                PseudoClass::NthChild(NthExpr::odd()),
                PseudoClass::Not(Box::new(SelectorPart::class_only("twyg-edit"))),
                PseudoClass::Empty,
            ]
        );

        let sel = parse_one("li:nth-child(3)");
        assert_eq!(sel.parts[0].pseudo_classes, vec![PseudoClass::NthChild(NthExpr::new(0, 3))]);
    }

    #[test]
    fn reject_malformed() {
        assert!(message("").contains("empty selector"));
        assert!(message("p,").contains("empty selector"));
        assert!(message("p >").contains("combinator"));
        assert!(message("> p").contains("expected a selector"));
        assert!(message(":hover").contains("unknown pseudo-class"));
        assert!(message("p:not(a b)").contains("single compound"));
        assert!(message(".").contains("class name"));
        assert!(message("p { }").contains("unexpected token"));
        assert!(parse_selector_list("[data-x~=y]").is_err());
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: SelectorList = "ul.twyg-list > li".parse().unwrap();
        assert_eq!(parsed, SelectorList::parse("ul.twyg-list > li").unwrap());
    }
}
