use log::debug;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::options::Options;
use crate::tpl::cache::TemplateCache;
use crate::tpl::loader::{FsLoader, SourceLoader};
use crate::tpl::template::Template;
use crate::value::to_value;

/// Owns everything templates need at parse and render time: options, the source
/// loader used for template names and `include` files, and the parsed-template cache.
///
/// Create one per application and pass it where templates are rendered.
pub struct Engine {
    options: Options,
    loader: Box<dyn SourceLoader>,
    cache: TemplateCache,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(FsLoader::default())
    }
}

impl Engine {
    pub fn new(loader: impl SourceLoader + 'static) -> Self {
        Self {
            options: Options::default(),
            loader: Box::new(loader),
            cache: TemplateCache::new(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Parses `source` without caching it.
    pub fn parse(&self, source: &str) -> Result<Template> {
        Template::parse_with(source, &self.options, self.loader.as_ref())
    }

    /// Returns the template `name`, loading and parsing it on first use.
    pub fn template(&self, name: &str) -> Result<Arc<Template>> {
        self.cache
            .get_or_parse(name, || self.parse(&self.loader.load(name)?))
    }

    /// Returns the template cached under `name`, parsing `source` on first use.
    pub fn template_str(&self, name: &str, source: &str) -> Result<Arc<Template>> {
        self.cache.get_or_parse(name, || self.parse(source))
    }

    /// Renders template `name` with `params` serialized into the value source.
    pub fn render<T: Serialize + ?Sized>(&self, name: &str, params: &T) -> Result<String> {
        let tpl = self.template(name)?;
        render_logged(name, &tpl, params)
    }

    /// Renders inline `source`, cached under `name`.
    pub fn render_str<T: Serialize + ?Sized>(
        &self,
        name: &str,
        source: &str,
        params: &T,
    ) -> Result<String> {
        let tpl = self.template_str(name, source)?;
        render_logged(name, &tpl, params)
    }

    /// Parses every template the loader lists for the glob `pattern` and caches each under
    /// its loader name, so later [`render`](Self::render) calls by that name hit the cache.
    /// Returns the number of templates loaded.
    pub fn load(&self, pattern: &str) -> Result<usize> {
        let names = self.loader.names(pattern)?;
        for name in &names {
            let tpl = self.parse(&self.loader.load(name)?)?;
            self.cache.insert(name.as_str(), tpl);
        }
        debug!("Loaded {} templates from '{}'", names.len(), pattern);
        Ok(names.len())
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.get(name).is_some()
    }

    pub fn remove(&self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}

fn render_logged<T: Serialize + ?Sized>(name: &str, tpl: &Template, params: &T) -> Result<String> {
    let start = Instant::now();
    let values = to_value(params)?;
    let result = tpl.render(&values);
    let elapsed = start.elapsed().as_micros();

    match &result {
        Ok(out) => debug!("Render: template={}, elapsed={}us, bytes={}", name, elapsed, out.len()),
        Err(e) => debug!("Render: template={}, elapsed={}us, error={:?}", name, elapsed, e),
    }

    result
}
