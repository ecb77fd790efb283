//! Symbol information supplied by the front end
//!
//! Instructions reference symbols by [`SymbolId`]; the semantic model of the
//! host compiler resolves them through a [`SymbolResolver`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable symbol identity assigned by the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a resolved symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Parameter,
    Local,
    Field,
    Property,
}

/// Declared nullability (attributes, `T?` annotations, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Nullability {
    #[default]
    Unknown,
    NotNull,
    Nullable,
}

/// Resolved symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub nullability: Nullability,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            is_static: false,
            type_name: None,
            nullability: Nullability::Unknown,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == SymbolKind::Parameter
    }
}

/// Symbol resolution facility of the front end
pub trait SymbolResolver: Send + Sync {
    /// Resolve a symbol id; `None` means the front end could not bind it
    fn resolve(&self, id: SymbolId) -> Option<&Symbol>;

    /// Display name, falling back to the raw id
    fn display_name(&self, id: SymbolId) -> String {
        self.resolve(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

/// In-memory symbol table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolTable {
    symbols: BTreeMap<SymbolId, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a symbol, replacing any previous binding of the same id
    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let id = symbol.id;
        self.symbols.insert(id, symbol);
        id
    }

    fn next_id(&self) -> SymbolId {
        SymbolId(self.symbols.keys().next_back().map_or(0, |id| id.0 + 1))
    }

    /// Declare a parameter with the next free id
    pub fn parameter(&mut self, name: &str, nullability: Nullability) -> SymbolId {
        let id = self.next_id();
        self.insert(Symbol::new(id, name, SymbolKind::Parameter).with_nullability(nullability))
    }

    /// Declare a local with the next free id
    pub fn local(&mut self, name: &str) -> SymbolId {
        let id = self.next_id();
        self.insert(Symbol::new(id, name, SymbolKind::Local))
    }

    /// Declare a field with the next free id
    pub fn field(&mut self, name: &str, is_static: bool) -> SymbolId {
        let id = self.next_id();
        self.insert(Symbol::new(id, name, SymbolKind::Field).with_static(is_static))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

impl SymbolResolver for SymbolTable {
    fn resolve(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }
}
