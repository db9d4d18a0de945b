pub mod ast;
pub mod cache;
pub mod engine;
pub mod line;
pub mod loader;
pub mod parser;
mod printer;
mod render;
mod render_context;
pub mod resolver;
pub mod splitter;
pub mod template;

pub use printer::{ElementPrinter, HtmlPrinter, escape_html};
pub use render_context::ValueSource;
