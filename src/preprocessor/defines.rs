//! Names bound by `@define`.

use indexmap::IndexMap;

use crate::lexer::Token;

/// Maps a defined name to the literal token it was bound to.
///
/// Redefining a name silently replaces the earlier value but keeps its
/// original position in iteration order.
#[derive(Debug, Clone, Default)]
pub struct DefineTable {
    entries: IndexMap<String, Token>,
}

impl DefineTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, value: Token) {
        self.entries.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Token> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.entries.iter().map(|(name, token)| (name.as_str(), token))
    }
}
