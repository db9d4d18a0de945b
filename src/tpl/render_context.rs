use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// Supplies values for element and block ids at render time.
pub trait ValueSource {
    fn value(&self, id: &str) -> Option<&Value>;
}

impl ValueSource for Value {
    fn value(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

impl ValueSource for HashMap<String, Value> {
    fn value(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

impl ValueSource for BTreeMap<String, Value> {
    fn value(&self, id: &str) -> Option<&Value> {
        self.get(id)
    }
}

/// One row of a repeated block being rendered.
struct Scope<'a> {
    block: &'a str,
    row: &'a Value,
    rowno: usize,
}

/// Value lookup during a render pass: row scopes of enclosing blocks first
/// (innermost wins), then the root source.
pub struct Context<'a> {
    root: &'a dyn ValueSource,
    scopes: Vec<Scope<'a>>,
}

impl<'a> Context<'a> {
    pub fn new(root: &'a dyn ValueSource) -> Self {
        Self {
            root,
            scopes: Vec::new(),
        }
    }

    pub fn push(&mut self, block: &'a str, row: &'a Value, rowno: usize) {
        self.scopes.push(Scope { block, row, rowno });
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn lookup(&self, key: &str) -> &'a Value {
        for scope in self.scopes.iter().rev() {
            match scope.row {
                Value::Map(m) => {
                    if let Some(v) = m.get(key) {
                        return v;
                    }
                }
                // scalar rows are addressed by the block's own id
                row if scope.block == key => return row,
                _ => {}
            }
        }

        self.root.value(key).unwrap_or(&Value::Null)
    }

    /// 1-based number of the row currently rendered for `block`.
    pub fn rowno(&self, block: &str) -> Option<usize> {
        self.scopes
            .iter()
            .rev()
            .find(|s| s.block == block)
            .map(|s| s.rowno)
    }
}
