use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TplError {
    #[error("Syntax Error at line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("Unterminated quoted value at line {line}")]
    UnterminatedQuote { line: usize },
    #[error("Duplicate element id: '{0}'")]
    DuplicateElement(String),
    #[error("Duplicate block name: '{0}'")]
    DuplicateBlock(String),
    #[error("Block closed or split with no open block (token {index})")]
    UnopenedBlock { index: usize },
    #[error("Block '{0}' has more than one ELSE")]
    DuplicateElse(String),
    #[error("Block '{id}' opened as {opened} but closed as {closed}")]
    MismatchedBlock {
        id: String,
        opened: String,
        closed: String,
    },
    #[error("Attribute '{attribute}' required on element '{element}'")]
    AttributeRequired { element: String, attribute: String },
    #[error("Template file not found: {0}")]
    FileNotFound(String),
    #[error("Maximum include nesting level exceeded ({0})")]
    NestingTooDeep(usize),
    #[error("Unknown element referenced in template body: '{0}'")]
    UnknownElement(String),
    #[error("Unknown sub-tag '{sub}' on element '{id}'")]
    UnknownSubTag { id: String, sub: String },
    #[error("IO Error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid glob pattern: {0}")]
    Glob(String),
    #[error("Serialization Error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, TplError>;

impl TplError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        TplError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// True for errors raised while parsing a template, as opposed to
    /// structural errors surfaced while rendering.
    pub fn is_parse_error(&self) -> bool {
        !matches!(
            self,
            TplError::UnknownElement(_)
                | TplError::UnknownSubTag { .. }
                | TplError::Serialization(_)
        )
    }
}

impl serde::ser::Error for TplError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        TplError::Serialization(msg.to_string())
    }
}
