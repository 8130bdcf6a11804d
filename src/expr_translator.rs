//! Expression Translator (XT): the typed shunting-yard described in
//! the typed shunting-yard.
//!
//! The parser already shapes `Expr` trees with correct precedence and
//! associativity (grammar precedence climbing), so a left-to-right walk of
//! the tree performs exactly the same pushes/pops/reduces an explicit
//! operator-stack walk over a flat token stream would; this mirrors the
//! original Python `process_expression`, which is itself a recursive
//! walk rather than a literal token-stream shunting-yard. The operand/type
//! stacks are kept as explicit fields so "stacks empty after every
//! statement") is a real, checkable invariant rather than an implicit one.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::error::CompileError;
use crate::memory::{MemoryManager, ValueType};
use crate::quad::{Op, Operand, Quad};
use crate::semantic_cube::SemanticCube;
use crate::symtab::SymbolTable;

pub struct ExprTranslator<'a> {
    mm: &'a mut MemoryManager,
    st: &'a SymbolTable,
    operand_stack: Vec<i64>,
    type_stack: Vec<ValueType>,
}

impl<'a> ExprTranslator<'a> {
    pub fn new(mm: &'a mut MemoryManager, st: &'a SymbolTable) -> Self {
        ExprTranslator {
            mm,
            st,
            operand_stack: Vec::new(),
            type_stack: Vec::new(),
        }
    }

    /// Translate `expr`, appending quadruples to `quads`, and return the
    /// final result address and type. On return the operand/type stacks are
    /// empty.
    pub fn translate(
        &mut self,
        expr: &Expr,
        quads: &mut Vec<Quad>,
    ) -> Result<(i64, ValueType), CompileError> {
        self.walk(expr, quads)?;
        let ty = self.type_stack.pop().expect("walk always pushes a result");
        let addr = self.operand_stack.pop().expect("walk always pushes a result");
        debug_assert!(self.operand_stack.is_empty());
        debug_assert!(self.type_stack.is_empty());
        Ok((addr, ty))
    }

    fn walk(&mut self, expr: &Expr, quads: &mut Vec<Quad>) -> Result<(), CompileError> {
        match expr {
            Expr::IntLiteral(v) => {
                let addr = self.mm.intern_int(*v)?;
                self.operand_stack.push(addr);
                self.type_stack.push(ValueType::Int);
                Ok(())
            }
            Expr::FloatLiteral(v) => {
                let addr = self.mm.intern_float(*v)?;
                self.operand_stack.push(addr);
                self.type_stack.push(ValueType::Float);
                Ok(())
            }
            Expr::Var(name) => {
                let record = self
                    .st
                    .lookup(name)
                    .ok_or_else(|| CompileError::UndeclaredIdentifier(name.clone()))?;
                if !record.initialized {
                    return Err(CompileError::UseBeforeInit(name.clone()));
                }
                self.operand_stack.push(record.address);
                self.type_stack.push(record.ty.into());
                Ok(())
            }
            Expr::Unary(op, inner) => {
                // unary `-` is a binary subtract from interned
                // constant 0; unary `+` is a no-op.
                match op {
                    UnaryOp::Plus => self.walk(inner, quads),
                    UnaryOp::Minus => {
                        self.walk(inner, quads)?;
                        let right_ty = self.type_stack.pop().unwrap();
                        let right_addr = self.operand_stack.pop().unwrap();
                        let zero_addr = match right_ty {
                            ValueType::Float => self.mm.intern_float(0.0)?,
                            _ => self.mm.intern_int(0)?,
                        };
                        let result_ty = SemanticCube::check(
                            if matches!(right_ty, ValueType::Float) {
                                ValueType::Float
                            } else {
                                ValueType::Int
                            },
                            BinOp::Sub,
                            right_ty,
                        )
                        .ok_or_else(|| CompileError::InvalidOperation {
                            left: "int".to_string(),
                            op: "-".to_string(),
                            right: right_ty.name().to_string(),
                        })?;
                        let temp = self.mm.new_temp(result_ty)?;
                        quads.push(Quad::new(
                            Op::Sub,
                            Operand::Addr(zero_addr),
                            Operand::Addr(right_addr),
                            Operand::Addr(temp),
                        ));
                        self.operand_stack.push(temp);
                        self.type_stack.push(result_ty);
                        Ok(())
                    }
                }
            }
            Expr::Binary(left, op, right) => {
                self.walk(left, quads)?;
                self.walk(right, quads)?;
                let right_ty = self.type_stack.pop().unwrap();
                let right_addr = self.operand_stack.pop().unwrap();
                let left_ty = self.type_stack.pop().unwrap();
                let left_addr = self.operand_stack.pop().unwrap();

                let result_ty = SemanticCube::check(left_ty, *op, right_ty).ok_or_else(|| {
                    CompileError::InvalidOperation {
                        left: left_ty.name().to_string(),
                        op: op.symbol().to_string(),
                        right: right_ty.name().to_string(),
                    }
                })?;
                let temp = self.mm.new_temp(result_ty)?;
                quads.push(Quad::new(
                    Op::from(*op),
                    Operand::Addr(left_addr),
                    Operand::Addr(right_addr),
                    Operand::Addr(temp),
                ));
                self.operand_stack.push(temp);
                self.type_stack.push(result_ty);
                Ok(())
            }
        }
    }
}
