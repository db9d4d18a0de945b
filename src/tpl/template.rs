use log::debug;
use std::collections::HashMap;
use std::time::Instant;

use crate::error::{Result, TplError};
use crate::options::Options;
use crate::tpl::ast::{DOCUMENT_BLOCK, Element, Token};
use crate::tpl::loader::{FsLoader, SourceLoader};
use crate::tpl::parser::tokenize;
use crate::tpl::printer::{ElementPrinter, HtmlPrinter};
use crate::tpl::render::{self, RenderBuffer};
use crate::tpl::render_context::{Context, ValueSource};
use crate::tpl::resolver::{declare_elements, resolve};
use crate::tpl::splitter::split_with_includes;

/// A parsed template: the element map plus the resolved body token stream.
///
/// Parsing is all-or-nothing; any error aborts it and no partial template is returned.
/// A `Template` is immutable once parsed and can be rendered concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    elements: HashMap<String, Element>,
    tokens: Vec<Token>,
    escape_html: bool,
}

impl Template {
    /// Parses with default [`Options`], resolving includes relative to the working directory.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(source, &Options::default(), &FsLoader::default())
    }

    pub fn parse_with(source: &str, options: &Options, loader: &dyn SourceLoader) -> Result<Self> {
        let start = Instant::now();

        let split = split_with_includes(source, loader, options.max_include_depth)?;
        let mut elements = declare_elements(&split.elements)?;
        let mut tokens = tokenize(&split.body, options.legacy_blocks);
        resolve(&mut elements, &mut tokens, options.strict_elements)?;

        debug!(
            "Parse: elements={}, tokens={}, elapsed={}us",
            elements.len(),
            tokens.len(),
            start.elapsed().as_micros()
        );

        Ok(Self {
            elements,
            tokens,
            escape_html: options.escape_html,
        })
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn elements(&self) -> &HashMap<String, Element> {
        &self.elements
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Renders the whole document with the default [`HtmlPrinter`].
    pub fn render(&self, values: &dyn ValueSource) -> Result<String> {
        self.render_with(values, &HtmlPrinter::new(self.escape_html))
    }

    pub fn render_with(&self, values: &dyn ValueSource, printer: &dyn ElementPrinter) -> Result<String> {
        self.render_block(DOCUMENT_BLOCK, values, printer)
    }

    /// Renders only block `id`, e.g. to refresh one region of a page.
    pub fn render_block(
        &self,
        id: &str,
        values: &dyn ValueSource,
        printer: &dyn ElementPrinter,
    ) -> Result<String> {
        match self.element(id) {
            Some(e) if e.is_block() => {}
            _ => return Err(TplError::UnknownElement(id.to_string())),
        }

        let mut ctx = Context::new(values);
        let mut buf = RenderBuffer {
            out: String::new(),
            printer,
        };
        render::render_block(self, id, &mut ctx, &mut buf)?;
        Ok(buf.out)
    }
}
