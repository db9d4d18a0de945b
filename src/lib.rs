//! A block/region template engine.
//!
//! A template source has an optional elements section declaring typed slots, followed
//! by a body that references them:
//!
//! ```
//! use blocktpl::{Template, Value};
//!
//! let tpl = Template::parse("<?elements\nstring NAME lb \"Name\"\n?>\nHello {NAME}!").unwrap();
//! let values: Value = [("NAME", "World")].into_iter().collect();
//! assert_eq!(tpl.render(&values).unwrap(), "Hello World!");
//! ```
//!
//! Bodies may contain `{BLOCK name}...{/BLOCK}` regions repeated once per row of a list
//! value, and `{IF name}...{ELSE}...{/IF}` / `{IF NOT name}...{/IF}` conditionals.
pub mod error;
pub mod options;
pub mod tpl;
pub mod value;

pub use error::{Result, TplError};
pub use options::Options;
pub use tpl::ast::{AttrValue, BlockKind, Condition, DOCUMENT_BLOCK, Element, HtmlAttrs, Token};
pub use tpl::engine::Engine;
pub use tpl::loader::{FsLoader, MemoryLoader, SourceLoader};
pub use tpl::template::Template;
pub use tpl::{ElementPrinter, HtmlPrinter, ValueSource};
pub use value::{ToValue, Value, to_value};
