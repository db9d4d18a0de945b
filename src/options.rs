pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Parse and render settings shared by every template an [`Engine`](crate::Engine) loads.
///
/// ```
/// use blocktpl::Options;
///
/// let options = Options::new().strict_elements(true).max_include_depth(4);
/// assert!(options.strict_elements);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// How many levels of `include` may nest before parsing fails.
    pub max_include_depth: usize,
    /// Fail rendering on body references to undeclared elements instead of
    /// treating them as implicit `string` elements.
    pub strict_elements: bool,
    /// Also recognize `<!-- BLOCK name -->` style block markers.
    pub legacy_blocks: bool,
    pub escape_html: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            strict_elements: false,
            legacy_blocks: false,
            escape_html: true,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn strict_elements(mut self, strict: bool) -> Self {
        self.strict_elements = strict;
        self
    }

    pub fn legacy_blocks(mut self, legacy: bool) -> Self {
        self.legacy_blocks = legacy;
        self
    }

    pub fn escape_html(mut self, escape: bool) -> Self {
        self.escape_html = escape;
        self
    }
}
