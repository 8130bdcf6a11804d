//! Program Translator (PT): orchestrates global allocation, per-function
//! emission, `main` entry backpatching, and program termination.

use crate::ast::{Function, Program};
use crate::error::CompileError;
use crate::function_dir::{FunctionDirectory, ParamInfo};
use crate::memory::MemoryManager;
use crate::quad::{Op, Operand, Quad};
use crate::stmt_translator::StmtTranslator;
use crate::symtab::{SymbolTable, VarRecord, VarScope};
use std::collections::HashMap;

/// Everything the VM needs to execute: the quadruple vector, the function
/// directory, and a snapshot of the constant pool.
pub struct CompiledProgram {
    pub quads: Vec<Quad>,
    pub function_dir: FunctionDirectory,
    pub const_ints: HashMap<i64, i64>,
    pub const_floats: HashMap<i64, f64>,
}

pub struct ProgramTranslator {
    st: SymbolTable,
    mm: MemoryManager,
    fd: FunctionDirectory,
    quads: Vec<Quad>,
}

impl ProgramTranslator {
    pub fn new() -> Self {
        ProgramTranslator {
            st: SymbolTable::new(),
            mm: MemoryManager::new(),
            fd: FunctionDirectory::new(),
            quads: Vec::new(),
        }
    }

    pub fn translate(mut self, program: &Program) -> Result<CompiledProgram, CompileError> {
        // 1. Reserve quad 0 as MAIN_START, to be backpatched once main's
        // entry point is known.
        self.quads.push(Quad::new(
            Op::MainStart,
            Operand::None,
            Operand::None,
            Operand::None,
        ));

        // 2. Allocate all global variables.
        for decl in &program.globals {
            for name in &decl.names {
                let address = self.mm.alloc_global(name, decl.ty)?;
                if !self.st.declare_global(
                    name,
                    VarRecord {
                        ty: decl.ty,
                        address,
                        scope: VarScope::Global,
                        initialized: false,
                    },
                ) {
                    return Err(CompileError::DuplicateVariable(name.clone()));
                }
            }
        }

        // 3. Emit each procedure in source order.
        for func in &program.functions {
            self.process_function(func)?;
        }

        // 4. Backpatch MAIN_START to the current index.
        let main_start = self.quads.len();
        self.quads[0].dest = Operand::QuadIndex(main_start);

        // 5. Translate the main block as a top-level block in global scope:
        // the grammar gives main no var section of its own.
        {
            let mut sxt = StmtTranslator::new(&mut self.st, &mut self.mm, &mut self.fd, &mut self.quads);
            sxt.translate_block(&program.main)?;
            debug_assert!(sxt.jump_stack_is_empty());
        }

        // 6. Halt.
        self.quads.push(Quad::new(
            Op::EndProgram,
            Operand::None,
            Operand::None,
            Operand::None,
        ));

        let (const_ints, const_floats) = self.mm.constant_values();
        Ok(CompiledProgram {
            quads: self.quads,
            function_dir: self.fd,
            const_ints,
            const_floats,
        })
    }

    fn process_function(&mut self, func: &Function) -> Result<(), CompileError> {
        self.mm.reset_local();

        let mut params = Vec::with_capacity(func.params.len());
        for p in &func.params {
            let address = self.mm.alloc_param(&p.name, p.ty)?;
            params.push(ParamInfo {
                name: p.name.clone(),
                ty: p.ty,
                address,
            });
        }
        self.fd.declare(&func.name, params.clone())?;

        self.quads.push(Quad::new(
            Op::Func,
            Operand::FuncName(func.name.clone()),
            Operand::None,
            Operand::None,
        ));
        self.fd.set_start_quad(&func.name, self.quads.len());

        self.st.enter_function_scope();

        for param in &params {
            if !self.st.declare_local(
                &param.name,
                VarRecord {
                    ty: param.ty,
                    address: param.address,
                    scope: VarScope::Param,
                    initialized: true,
                },
            ) {
                self.st.exit_function_scope();
                return Err(CompileError::DuplicateVariable(param.name.clone()));
            }
            self.fd.add_local(&func.name, &param.name, param.ty, param.address);
        }

        for decl in &func.vars {
            for name in &decl.names {
                let address = self.mm.alloc_local(name, decl.ty)?;
                if !self.st.declare_local(
                    name,
                    VarRecord {
                        ty: decl.ty,
                        address,
                        scope: VarScope::Local,
                        initialized: false,
                    },
                ) {
                    self.st.exit_function_scope();
                    return Err(CompileError::DuplicateVariable(name.clone()));
                }
                self.fd.add_local(&func.name, name, decl.ty, address);
            }
        }

        {
            let mut sxt = StmtTranslator::new(&mut self.st, &mut self.mm, &mut self.fd, &mut self.quads);
            sxt.translate_block(&func.body)?;
            debug_assert!(sxt.jump_stack_is_empty());
        }

        self.st.exit_function_scope();

        self.quads.push(Quad::new(
            Op::EndFunc,
            Operand::FuncName(func.name.clone()),
            Operand::None,
            Operand::None,
        ));
        self.fd.set_end_quad(&func.name, self.quads.len() - 1);

        Ok(())
    }
}

impl Default for ProgramTranslator {
    fn default() -> Self {
        Self::new()
    }
}
