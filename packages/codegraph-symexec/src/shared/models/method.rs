//! Unit of analysis handed over by the front end

use super::cfg::ControlFlowGraph;
use super::symbol::{SymbolId, SymbolTable};
use serde::{Deserialize, Serialize};

/// Declared accessibility of the analyzed method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    #[default]
    Private,
}

impl Visibility {
    /// Callable from outside the assembly
    pub fn is_externally_visible(&self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }
}

/// What kind of member the body belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MethodKind {
    #[default]
    Ordinary,
    Constructor,
    /// Type initializer; never called with caller-supplied arguments
    StaticConstructor,
}

/// One method body: CFG plus the symbols it references
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodBody {
    pub name: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub kind: MethodKind,
    /// Parameter symbols in declaration order
    #[serde(default)]
    pub parameters: Vec<SymbolId>,
    pub cfg: ControlFlowGraph,
    #[serde(default)]
    pub symbols: SymbolTable,
}

impl MethodBody {
    pub fn new(name: impl Into<String>, cfg: ControlFlowGraph, symbols: SymbolTable) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Private,
            kind: MethodKind::Ordinary,
            parameters: Vec::new(),
            cfg,
            symbols,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<SymbolId>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_kind(mut self, kind: MethodKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parameters can be supplied by arbitrary callers
    pub fn accepts_external_arguments(&self) -> bool {
        self.visibility.is_externally_visible() && self.kind != MethodKind::StaticConstructor
    }

    /// Load a method body from its JSON form
    pub fn from_json(json: &str) -> crate::errors::Result<Self> {
        let method: MethodBody = serde_json::from_str(json)?;
        method.cfg.validate()?;
        Ok(method)
    }

    pub fn to_json(&self) -> crate::errors::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{CfgBuilder, Terminator};

    fn body() -> MethodBody {
        let mut b = CfgBuilder::new();
        b.block(vec![], Terminator::Exit);
        MethodBody::new("M", b.build().unwrap(), SymbolTable::new())
    }

    #[test]
    fn test_external_arguments() {
        let public = body().with_visibility(Visibility::Public);
        assert!(public.accepts_external_arguments());
        assert!(public.clone().with_kind(MethodKind::Constructor).accepts_external_arguments());
        assert!(!public.with_kind(MethodKind::StaticConstructor).accepts_external_arguments());
        assert!(!body().accepts_external_arguments());
    }

    #[test]
    fn test_kind_defaults_to_ordinary() {
        let json = body()
            .with_kind(MethodKind::Constructor)
            .to_json()
            .unwrap()
            .replace("\"kind\": \"Constructor\",", "");
        assert_eq!(MethodBody::from_json(&json).unwrap().kind, MethodKind::Ordinary);
    }
}
