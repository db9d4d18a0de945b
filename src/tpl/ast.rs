use std::collections::BTreeMap;
use std::fmt;

/// Id of the synthetic block spanning the whole token stream.
pub const DOCUMENT_BLOCK: &str = "pcl_document";

pub const BLOCK_TYPE: &str = "block";
pub const STRING_TYPE: &str = "string";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Block,
    If,
    IfNot,
}

impl BlockKind {
    /// `{/IF}` closes both `{IF}` and `{IF NOT}`.
    pub fn closes(self, open: BlockKind) -> bool {
        match self {
            BlockKind::Block => open == BlockKind::Block,
            BlockKind::If | BlockKind::IfNot => open != BlockKind::Block,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Block => "BLOCK",
            BlockKind::If => "IF",
            BlockKind::IfNot => "IF NOT",
        })
    }
}

/// One cell of the body token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    /// `{id}` or `{id.sub}`
    Element { id: String, sub: Option<String> },
    /// Unresolved block opening as produced by the tokenizer.
    BlockOpen { name: String, kind: BlockKind },
    /// Block opening after resolution, carrying the block element id.
    Block(String),
    BlockClose { kind: BlockKind },
    Else,
    /// A cell consumed by the resolver; prints nothing.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    If(String),
    IfNot(String),
}

impl Condition {
    pub fn target(&self) -> &str {
        match self {
            Condition::If(id) | Condition::IfNot(id) => id,
        }
    }

    pub fn holds(&self, truthy: bool) -> bool {
        match self {
            Condition::If(_) => truthy,
            Condition::IfNot(_) => !truthy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// Attribute given without a quoted value.
    Flag,
    Text(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Flag => None,
            AttrValue::Text(s) => Some(s),
        }
    }
}

/// `html_*` attributes folded out of an element line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlAttrs {
    pub attrs: BTreeMap<String, String>,
    pub flags: Vec<String>,
}

impl HtmlAttrs {
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.flags.is_empty()
    }
}

/// A named template slot. Blocks are elements of type `block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub id: String,
    pub kind: String,
    /// Enclosing block, set by the resolver when the element is first referenced.
    pub block: Option<String>,
    pub begin: Option<usize>,
    pub end: Option<usize>,
    pub else_at: Option<usize>,
    pub cond: Option<Condition>,
    pub attrs: BTreeMap<String, AttrValue>,
    pub html: HtmlAttrs,
    /// Registered from a body reference rather than declared.
    pub implicit: bool,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            block: None,
            begin: None,
            end: None,
            else_at: None,
            cond: None,
            attrs: BTreeMap::new(),
            html: HtmlAttrs::default(),
            implicit: false,
        }
    }

    pub fn is_block(&self) -> bool {
        self.kind == BLOCK_TYPE
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Token range printed when the block is shown.
    pub fn main_range(&self) -> std::ops::Range<usize> {
        let begin = self.begin.unwrap_or(0);
        let end = match self.else_at {
            // stop before the neutralized {ELSE} cell
            Some(e) => e.saturating_sub(1),
            None => self.end.unwrap_or(begin),
        };
        begin..end.max(begin)
    }

    /// Token range printed when the block is hidden, if it has an else branch.
    pub fn else_range(&self) -> Option<std::ops::Range<usize>> {
        let start = self.else_at?;
        Some(start..self.end.unwrap_or(start).max(start))
    }
}
