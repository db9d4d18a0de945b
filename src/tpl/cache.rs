use dashmap::DashMap;
use log::debug;
use std::sync::Arc;

use crate::error::Result;
use crate::tpl::template::Template;

/// Parsed templates keyed by name.
#[derive(Default)]
pub struct TemplateCache {
    templates: DashMap<String, Arc<Template>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.get(name).map(|t| t.value().clone())
    }

    /// Returns the cached template for `name`, parsing it with `parse` on a miss.
    ///
    /// A failed parse caches nothing.
    pub fn get_or_parse<F>(&self, name: &str, parse: F) -> Result<Arc<Template>>
    where
        F: FnOnce() -> Result<Template>,
    {
        if let Some(tpl) = self.get(name) {
            debug!("Template cache hit: {}", name);
            return Ok(tpl);
        }

        let tpl = Arc::new(parse()?);
        // a concurrent parse of the same name may have won; keep the first one stored
        let stored = self
            .templates
            .entry(name.to_string())
            .or_insert(tpl)
            .value()
            .clone();
        Ok(stored)
    }

    pub fn insert(&self, name: impl Into<String>, tpl: Template) -> Arc<Template> {
        let tpl = Arc::new(tpl);
        self.templates.insert(name.into(), tpl.clone());
        tpl
    }

    pub fn remove(&self, name: &str) -> Option<Arc<Template>> {
        self.templates.remove(name).map(|(_, t)| t)
    }

    pub fn clear(&self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
