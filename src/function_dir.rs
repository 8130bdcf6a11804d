//! Function Directory: registry of procedure signatures, entry points, and
//! local variable maps.

use crate::ast::Type;
use crate::error::CompileError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ParamInfo {
    pub name: String,
    pub ty: Type,
    pub address: i64,
}

#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub params: Vec<ParamInfo>,
    pub locals: HashMap<String, (Type, i64)>,
    pub start_quad: usize,
    pub end_quad: usize,
}

#[derive(Default)]
pub struct FunctionDirectory {
    functions: HashMap<String, FunctionInfo>,
}

impl FunctionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, params: Vec<ParamInfo>) -> Result<(), CompileError> {
        if self.functions.contains_key(name) {
            return Err(CompileError::DuplicateFunction(name.to_string()));
        }
        self.functions.insert(
            name.to_string(),
            FunctionInfo {
                params,
                locals: HashMap::new(),
                start_quad: 0,
                end_quad: 0,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FunctionInfo> {
        self.functions.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FunctionInfo> {
        self.functions.get_mut(name)
    }

    pub fn add_local(&mut self, func: &str, name: &str, ty: Type, address: i64) {
        if let Some(info) = self.functions.get_mut(func) {
            info.locals.insert(name.to_string(), (ty, address));
        }
    }

    pub fn set_start_quad(&mut self, func: &str, idx: usize) {
        if let Some(info) = self.functions.get_mut(func) {
            info.start_quad = idx;
        }
    }

    pub fn set_end_quad(&mut self, func: &str, idx: usize) {
        if let Some(info) = self.functions.get_mut(func) {
            info.end_quad = idx;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_function_rejected() {
        let mut fd = FunctionDirectory::new();
        fd.declare("f", vec![]).unwrap();
        assert!(matches!(
            fd.declare("f", vec![]),
            Err(CompileError::DuplicateFunction(n)) if n == "f"
        ));
    }

    #[test]
    fn start_end_quad_round_trip() {
        let mut fd = FunctionDirectory::new();
        fd.declare("f", vec![]).unwrap();
        fd.set_start_quad("f", 5);
        fd.set_end_quad("f", 9);
        let info = fd.get("f").unwrap();
        assert_eq!(info.start_quad, 5);
        assert_eq!(info.end_quad, 9);
    }
}
