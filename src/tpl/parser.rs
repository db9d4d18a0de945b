use crate::tpl::ast::{BlockKind, Token};

const LEGACY_OPEN: &str = "<!--";
const LEGACY_CLOSE: &str = "-->";

/// A hand-written scanner turning a template body into a flat token stream.
///
/// It recognizes:
/// - Element references: `{NAME}`, `{NAME.lb}`
/// - Block markers: `{BLOCK name}`, `{IF name}`, `{IF NOT name}`, `{ELSE}`, `{/BLOCK}`, `{/IF}`
/// - With `legacy` set, the same block markers written as `<!-- BLOCK name -->`
///
/// Everything else is literal text. Nesting is not checked here; that is the resolver's job.
struct Parser<'a> {
    template: &'a str,
    pos: usize,
    legacy: bool,
    tokens: Vec<Token>,
}

impl<'a> Parser<'a> {
    fn new(template: &'a str, legacy: bool) -> Self {
        Self {
            template,
            pos: 0,
            legacy,
            tokens: Vec::new(),
        }
    }

    fn parse(mut self) -> Vec<Token> {
        while self.pos < self.template.len() {
            if self.try_parse_tag() || (self.legacy && self.try_parse_legacy()) {
                continue;
            }
            self.parse_text();
        }
        self.tokens
    }

    /// Try to parse a `{...}` tag at the current position.
    fn try_parse_tag(&mut self) -> bool {
        let remaining = &self.template[self.pos..];
        if !remaining.starts_with('{') {
            return false;
        }
        let Some(end) = remaining.find('}') else {
            return false;
        };
        let inner = &remaining[1..end];
        if inner.contains(['{', '\n']) {
            return false;
        }

        let token = parse_block_marker(inner).or_else(|| parse_element_ref(inner));
        match token {
            Some(token) => {
                self.tokens.push(token);
                self.pos += end + 1;
                true
            }
            None => false,
        }
    }

    /// Try to parse a `<!-- BLOCK name -->` style marker.
    fn try_parse_legacy(&mut self) -> bool {
        let remaining = &self.template[self.pos..];
        if !remaining.starts_with(LEGACY_OPEN) {
            return false;
        }
        let Some(end) = remaining.find(LEGACY_CLOSE) else {
            return false;
        };
        let inner = remaining[LEGACY_OPEN.len()..end].trim();
        match parse_block_marker(inner) {
            Some(token) => {
                self.tokens.push(token);
                self.pos += end + LEGACY_CLOSE.len();
                true
            }
            None => false,
        }
    }

    /// Consume text until the next possible tag start.
    fn parse_text(&mut self) {
        let remaining = &self.template[self.pos..];
        // skip the first char: we only get here when no tag matched at `pos`
        let first_len = remaining.chars().next().map_or(0, char::len_utf8);
        let rest = &remaining[first_len..];
        let next_tag = rest.find('{').unwrap_or(rest.len());
        let next_legacy = if self.legacy {
            rest.find(LEGACY_OPEN).unwrap_or(rest.len())
        } else {
            rest.len()
        };
        let next_stop = first_len + next_tag.min(next_legacy);

        self.append_text(&remaining[..next_stop]);
        self.pos += next_stop;
    }

    /// Append text, merging with the previous text token when possible.
    fn append_text(&mut self, text: &str) {
        if let Some(Token::Text(last)) = self.tokens.last_mut() {
            last.push_str(text);
        } else {
            self.tokens.push(Token::Text(text.to_string()));
        }
    }
}

/// Parses the inside of a block marker: `BLOCK name`, `IF name`, `IF NOT name`, `ELSE`,
/// `/BLOCK`, `/IF`.
fn parse_block_marker(inner: &str) -> Option<Token> {
    let words: Vec<&str> = inner.split_whitespace().collect();
    match words.as_slice() {
        ["/BLOCK"] => Some(Token::BlockClose {
            kind: BlockKind::Block,
        }),
        ["/IF"] => Some(Token::BlockClose { kind: BlockKind::If }),
        ["ELSE"] => Some(Token::Else),
        ["BLOCK", name] if is_ident(name) => Some(Token::BlockOpen {
            name: name.to_string(),
            kind: BlockKind::Block,
        }),
        ["IF", "NOT", name] if is_ident(name) => Some(Token::BlockOpen {
            name: name.to_string(),
            kind: BlockKind::IfNot,
        }),
        ["IF", name] if is_ident(name) => Some(Token::BlockOpen {
            name: name.to_string(),
            kind: BlockKind::If,
        }),
        _ => None,
    }
}

/// Parses `id` or `id.sub`.
fn parse_element_ref(inner: &str) -> Option<Token> {
    match inner.split_once('.') {
        Some((id, sub)) if is_ident(id) && is_ident(sub) => Some(Token::Element {
            id: id.to_string(),
            sub: Some(sub.to_string()),
        }),
        None if is_ident(inner) => Some(Token::Element {
            id: inner.to_string(),
            sub: None,
        }),
        _ => None,
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Main entry point: tokenize a template body.
pub fn tokenize(body: &str, legacy: bool) -> Vec<Token> {
    Parser::new(body, legacy).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    fn elem(id: &str, sub: Option<&str>) -> Token {
        Token::Element {
            id: id.to_string(),
            sub: sub.map(str::to_string),
        }
    }

    #[test]
    fn test_text_and_refs() {
        let tokens = tokenize("Hello {NAME}! {NAME.lb}", false);
        assert_eq!(
            tokens,
            vec![
                text("Hello "),
                elem("NAME", None),
                text("! "),
                elem("NAME", Some("lb")),
            ]
        );
    }

    #[test]
    fn test_block_markers() {
        let tokens = tokenize("{BLOCK items}x{/BLOCK}{IF a}y{ELSE}z{/IF}{IF NOT b}{/IF}", false);
        assert_eq!(
            tokens,
            vec![
                Token::BlockOpen {
                    name: "items".to_string(),
                    kind: BlockKind::Block
                },
                text("x"),
                Token::BlockClose {
                    kind: BlockKind::Block
                },
                Token::BlockOpen {
                    name: "a".to_string(),
                    kind: BlockKind::If
                },
                text("y"),
                Token::Else,
                text("z"),
                Token::BlockClose { kind: BlockKind::If },
                Token::BlockOpen {
                    name: "b".to_string(),
                    kind: BlockKind::IfNot
                },
                Token::BlockClose { kind: BlockKind::If },
            ]
        );
    }

    #[test]
    fn test_non_tags_stay_literal() {
        let tokens = tokenize("a { b } {x-y} {} {a.b.c} function() { return 1; } {", false);
        assert_eq!(
            tokens,
            vec![text("a { b } {x-y} {} {a.b.c} function() { return 1; } {")]
        );
    }

    #[test]
    fn test_multibyte_text() {
        let tokens = tokenize("žluťoučký {KŮŇ} {X}", false);
        assert_eq!(tokens, vec![text("žluťoučký {KŮŇ} "), elem("X", None)]);
    }

    #[test]
    fn test_legacy_markers_need_flag() {
        let src = "<!-- BLOCK rows -->{A}<!-- /BLOCK --><!-- plain comment -->";
        assert_eq!(tokenize(src, false)[0], text("<!-- BLOCK rows -->"));

        let tokens = tokenize(src, true);
        assert_eq!(
            tokens,
            vec![
                Token::BlockOpen {
                    name: "rows".to_string(),
                    kind: BlockKind::Block
                },
                elem("A", None),
                Token::BlockClose {
                    kind: BlockKind::Block
                },
                text("<!-- plain comment -->"),
            ]
        );
    }
}
