//! Parser for element definition lines: `TYPE ID [ATTR ["VALUE"]]...`.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, TplError};
use crate::tpl::ast::{AttrValue, Element, HtmlAttrs};

const HTML_PREFIX: &str = "html_";

/// A single parsed element line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementLine {
    pub kind: String,
    pub id: String,
    pub attrs: BTreeMap<String, AttrValue>,
    pub html: HtmlAttrs,
}

impl ElementLine {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_str)
    }

    pub fn into_element(self) -> Element {
        let mut element = Element::new(self.id, self.kind);
        element.attrs = self.attrs;
        element.html = self.html;
        element
    }
}

impl fmt::Display for ElementLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)?;
        for (name, value) in &self.attrs {
            write_attr(f, name, value.as_str())?;
        }
        for (name, value) in &self.html.attrs {
            write_attr(f, &format!("{}{}", HTML_PREFIX, name), Some(value.as_str()))?;
        }
        for name in &self.html.flags {
            write!(f, " {}{}", HTML_PREFIX, name)?;
        }
        Ok(())
    }
}

fn write_attr(f: &mut fmt::Formatter<'_>, name: &str, value: Option<&str>) -> fmt::Result {
    match value {
        Some(v) => write!(f, " {} \"{}\"", name, v.replace('"', "\\\"")),
        None => write!(f, " {}", name),
    }
}

#[derive(Debug)]
enum Word {
    Bare(String),
    Quoted(String),
}

/// Parses one element line. `line_no` is only used in error messages.
pub fn parse_line(line: &str, line_no: usize) -> Result<ElementLine> {
    let mut words = split_words(line, line_no)?.into_iter().peekable();

    let kind = match words.next() {
        Some(Word::Bare(k)) => k,
        _ => return Err(TplError::syntax(line_no, "expected element type")),
    };
    let id = match words.next() {
        Some(Word::Bare(id)) => id,
        _ => {
            return Err(TplError::syntax(
                line_no,
                format!("missing id for element of type '{}'", kind),
            ));
        }
    };

    let mut attrs = BTreeMap::new();
    let mut html = HtmlAttrs::default();

    while let Some(word) = words.next() {
        let name = match word {
            Word::Bare(name) => name,
            Word::Quoted(v) => {
                return Err(TplError::syntax(
                    line_no,
                    format!("value \"{}\" has no attribute name", v),
                ));
            }
        };
        let value = match words.next_if(|w| matches!(w, Word::Quoted(_))) {
            Some(Word::Quoted(v)) => AttrValue::Text(v),
            _ => AttrValue::Flag,
        };

        match name.strip_prefix(HTML_PREFIX) {
            Some(key) if !key.is_empty() => match value {
                AttrValue::Text(v) => {
                    html.attrs.insert(key.to_string(), v);
                }
                AttrValue::Flag => {
                    if !html.flags.iter().any(|f| f == key) {
                        html.flags.push(key.to_string());
                    }
                }
            },
            _ => {
                attrs.insert(name, value);
            }
        }
    }

    Ok(ElementLine {
        kind,
        id,
        attrs,
        html,
    })
}

/// Splits on whitespace, keeping `"..."` values (with `\"` escapes) intact.
fn split_words(line: &str, line_no: usize) -> Result<Vec<Word>> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' if chars.peek() == Some(&'"') => {
                        chars.next();
                        value.push('"');
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    _ => value.push(c),
                }
            }
            if !closed {
                return Err(TplError::UnterminatedQuote { line: line_no });
            }
            words.push(Word::Quoted(value));
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
            words.push(Word::Bare(word));
        }
    }

    Ok(words)
}
