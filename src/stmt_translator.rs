//! Statement Translator (SXT): walks AST statements, driving the expression
//! translator and emitting control-flow quadruples with backpatching via a
//! jump stack.

use crate::ast::{Block, Expr, PrintItem, Stmt};
use crate::error::CompileError;
use crate::expr_translator::ExprTranslator;
use crate::function_dir::FunctionDirectory;
use crate::memory::{MemoryManager, ValueType};
use crate::quad::{Op, Operand, Quad};
use crate::symtab::SymbolTable;

pub struct StmtTranslator<'a> {
    pub st: &'a mut SymbolTable,
    pub mm: &'a mut MemoryManager,
    pub fd: &'a mut FunctionDirectory,
    pub quads: &'a mut Vec<Quad>,
    /// Backpatch stack for forward-jump quadruple indices.
    jump_stack: Vec<usize>,
}

impl<'a> StmtTranslator<'a> {
    pub fn new(
        st: &'a mut SymbolTable,
        mm: &'a mut MemoryManager,
        fd: &'a mut FunctionDirectory,
        quads: &'a mut Vec<Quad>,
    ) -> Self {
        StmtTranslator {
            st,
            mm,
            fd,
            quads,
            jump_stack: Vec::new(),
        }
    }

    pub fn jump_stack_is_empty(&self) -> bool {
        self.jump_stack.is_empty()
    }

    pub fn translate_block(&mut self, block: &Block) -> Result<(), CompileError> {
        for stmt in &block.statements {
            self.translate_stmt(stmt)?;
        }
        Ok(())
    }

    fn translate_expr(&mut self, expr: &Expr) -> Result<(i64, ValueType), CompileError> {
        let mut xt = ExprTranslator::new(self.mm, self.st);
        xt.translate(expr, self.quads)
    }

    fn translate_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Assign { target, value } => self.translate_assign(target, value),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => self.translate_if(cond, then_block, else_block.as_ref()),
            Stmt::While { cond, body } => self.translate_while(cond, body),
            Stmt::Print(items) => self.translate_print(items),
            Stmt::Call { name, args } => self.translate_call(name, args),
        }
    }

    fn translate_assign(&mut self, target: &str, value: &Expr) -> Result<(), CompileError> {
        let target_record = self
            .st
            .lookup(target)
            .ok_or_else(|| CompileError::UndeclaredIdentifier(target.to_string()))?
            .clone();

        let (rhs_addr, rhs_ty) = self.translate_expr(value)?;
        let target_ty: ValueType = target_record.ty.into();

        if target_ty != rhs_ty {
            // Widening exception: int -> float is accepted.
            let widens = target_ty == ValueType::Float && rhs_ty == ValueType::Int;
            if !widens {
                return Err(CompileError::AssignmentMismatch {
                    from: rhs_ty.name().to_string(),
                    to: target_ty.name().to_string(),
                });
            }
        }

        self.st.mark_initialized(target);
        self.quads.push(Quad::new(
            Op::Assign,
            Operand::Addr(rhs_addr),
            Operand::None,
            Operand::Addr(target_record.address),
        ));
        Ok(())
    }

    /// Emit `(GOTOF, cond_addr, _, _)` and push its index on the jump stack,
    /// returning that index so callers can backpatch it later.
    fn emit_gotof(&mut self, cond_addr: i64) -> usize {
        let idx = self.quads.len();
        self.quads
            .push(Quad::new(Op::Gotof, Operand::Addr(cond_addr), Operand::None, Operand::None));
        self.jump_stack.push(idx);
        idx
    }

    fn backpatch_dest(&mut self, idx: usize, target: usize) {
        self.quads[idx].dest = Operand::QuadIndex(target);
    }

    fn translate_if(
        &mut self,
        cond: &Expr,
        then_block: &Block,
        else_block: Option<&Block>,
    ) -> Result<(), CompileError> {
        let (cond_addr, cond_ty) = self.translate_expr(cond)?;
        if cond_ty != ValueType::Bool {
            return Err(CompileError::NonBoolCondition(cond_ty.name().to_string()));
        }

        let gotof_idx = self.emit_gotof(cond_addr);
        self.translate_block(then_block)?;

        if let Some(else_block) = else_block {
            let goto_idx = self.quads.len();
            self.quads
                .push(Quad::new(Op::Goto, Operand::None, Operand::None, Operand::None));
            self.jump_stack.push(goto_idx);

            self.backpatch_dest(gotof_idx, self.quads.len());
            self.jump_stack.pop();

            self.translate_block(else_block)?;

            self.backpatch_dest(goto_idx, self.quads.len());
            self.jump_stack.pop();
        } else {
            self.backpatch_dest(gotof_idx, self.quads.len());
            self.jump_stack.pop();
        }
        Ok(())
    }

    fn translate_while(&mut self, cond: &Expr, body: &Block) -> Result<(), CompileError> {
        let loop_start = self.quads.len();
        let (cond_addr, cond_ty) = self.translate_expr(cond)?;
        if cond_ty != ValueType::Bool {
            return Err(CompileError::NonBoolCondition(cond_ty.name().to_string()));
        }

        let gotof_idx = self.emit_gotof(cond_addr);
        self.translate_block(body)?;

        self.quads.push(Quad::new(
            Op::Goto,
            Operand::None,
            Operand::None,
            Operand::QuadIndex(loop_start),
        ));

        self.backpatch_dest(gotof_idx, self.quads.len());
        self.jump_stack.pop();
        Ok(())
    }

    fn translate_print(&mut self, items: &[PrintItem]) -> Result<(), CompileError> {
        for item in items {
            match item {
                PrintItem::Str(s) => {
                    self.quads.push(Quad::new(
                        Op::Print,
                        Operand::None,
                        Operand::None,
                        Operand::StrLiteral(s.clone()),
                    ));
                }
                PrintItem::Expr(expr) => {
                    let (addr, _) = self.translate_expr(expr)?;
                    self.quads.push(Quad::new(
                        Op::Print,
                        Operand::None,
                        Operand::None,
                        Operand::Addr(addr),
                    ));
                }
            }
        }
        Ok(())
    }

    fn translate_call(&mut self, name: &str, args: &[Expr]) -> Result<(), CompileError> {
        let info = self
            .fd
            .get(name)
            .ok_or_else(|| CompileError::UndeclaredFunction(name.to_string()))?
            .clone();

        self.quads.push(Quad::new(
            Op::Era,
            Operand::FuncName(name.to_string()),
            Operand::None,
            Operand::None,
        ));

        if args.len() != info.params.len() {
            return Err(CompileError::ArityMismatch {
                name: name.to_string(),
                expected: info.params.len(),
                found: args.len(),
            });
        }

        for (i, (arg, param)) in args.iter().zip(info.params.iter()).enumerate() {
            let (arg_addr, arg_ty) = self.translate_expr(arg)?;
            let param_ty: ValueType = param.ty.into();
            if arg_ty != param_ty {
                let widens = param_ty == ValueType::Float && arg_ty == ValueType::Int;
                if !widens {
                    return Err(CompileError::ArgumentTypeMismatch {
                        name: name.to_string(),
                        index: i + 1,
                        expected: param_ty.name().to_string(),
                        found: arg_ty.name().to_string(),
                    });
                }
            }
            self.quads.push(Quad::new(
                Op::Param,
                Operand::Addr(arg_addr),
                Operand::None,
                Operand::Addr(param.address),
            ));
        }

        self.quads.push(Quad::new(
            Op::Gosub,
            Operand::FuncName(name.to_string()),
            Operand::None,
            Operand::None,
        ));
        Ok(())
    }
}
