//! Symbol Table / Scope Stack: a global table plus at most one active local
//! table.

use crate::ast::Type;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarScope {
    Global,
    Local,
    Param,
}

#[derive(Debug, Clone)]
pub struct VarRecord {
    pub ty: Type,
    pub address: i64,
    pub scope: VarScope,
    pub initialized: bool,
}

pub struct SymbolTable {
    global: HashMap<String, VarRecord>,
    local: Option<HashMap<String, VarRecord>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            global: HashMap::new(),
            local: None,
        }
    }

    pub fn declare_global(&mut self, name: &str, record: VarRecord) -> bool {
        if self.global.contains_key(name) {
            return false;
        }
        self.global.insert(name.to_string(), record);
        true
    }

    pub fn enter_function_scope(&mut self) {
        self.local = Some(HashMap::new());
    }

    pub fn exit_function_scope(&mut self) {
        self.local = None;
    }

    /// Declare a name in the current local tier. Fails (returns `false`) on
    /// a duplicate within that tier; shadowing a global is allowed.
    pub fn declare_local(&mut self, name: &str, record: VarRecord) -> bool {
        let local = self.local.get_or_insert_with(HashMap::new);
        if local.contains_key(name) {
            return false;
        }
        local.insert(name.to_string(), record);
        true
    }

    /// Lookup order: local tier first, then global.
    pub fn lookup(&self, name: &str) -> Option<&VarRecord> {
        if let Some(local) = &self.local {
            if let Some(rec) = local.get(name) {
                return Some(rec);
            }
        }
        self.global.get(name)
    }

    pub fn mark_initialized(&mut self, name: &str) {
        if let Some(local) = &mut self.local {
            if let Some(rec) = local.get_mut(name) {
                rec.initialized = true;
                return;
            }
        }
        if let Some(rec) = self.global.get_mut(name) {
            rec.initialized = true;
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
