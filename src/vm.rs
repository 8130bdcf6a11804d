//! Virtual machine: a program-counter loop over the quadruple vector, with
//! global/local/temp/constant memory segments and a stack of activation
//! records so procedure calls (including recursive ones) each get their own
//! locals and temporaries.

use crate::error::RuntimeError;
use crate::function_dir::FunctionDirectory;
use crate::memory::{type_of_address, ValueType};
use crate::program_translator::CompiledProgram;
use crate::quad::{Op, Operand, Quad};
use log::trace;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    fn as_f64(self) -> f64 {
        match self {
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
            Value::Bool(b) => b as i64 as f64,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Value::Int(i) => i == 0,
            Value::Float(f) => f == 0.0,
            Value::Bool(_) => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Everything private to one activation: its locals and its temporaries,
/// both addressed in the 3000-3999/4000-4999/5000-7999 ranges.
#[derive(Default)]
struct Frame {
    cells: HashMap<i64, Value>,
}

pub struct Vm<'p> {
    quads: &'p [Quad],
    function_dir: &'p FunctionDirectory,
    global: HashMap<i64, Value>,
    constants: HashMap<i64, Value>,
    call_stack: Vec<usize>,
    frame_stack: Vec<Frame>,
    current: Frame,
    pending_frame: Option<(String, Frame)>,
    output: Vec<String>,
}

impl<'p> Vm<'p> {
    pub fn new(program: &'p CompiledProgram) -> Self {
        let mut constants = HashMap::new();
        for (&addr, &v) in &program.const_ints {
            constants.insert(addr, Value::Int(v));
        }
        for (&addr, &v) in &program.const_floats {
            constants.insert(addr, Value::Float(v));
        }
        Vm {
            quads: &program.quads,
            function_dir: &program.function_dir,
            global: HashMap::new(),
            constants,
            call_stack: Vec::new(),
            frame_stack: Vec::new(),
            current: Frame::default(),
            pending_frame: None,
            output: Vec::new(),
        }
    }

    fn read(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        let addr = match operand {
            Operand::Addr(a) => *a,
            other => panic!("attempted to read a non-address operand: {other:?}"),
        };
        if let Some(v) = self.constants.get(&addr) {
            return Ok(*v);
        }
        if addr < 3000 {
            return self
                .global
                .get(&addr)
                .copied()
                .ok_or(RuntimeError::AddressFault(addr));
        }
        self.current
            .cells
            .get(&addr)
            .copied()
            .ok_or(RuntimeError::AddressFault(addr))
    }

    fn write(&mut self, addr: i64, value: Value) {
        if addr < 3000 {
            self.global.insert(addr, value);
        } else {
            self.current.cells.insert(addr, value);
        }
    }

    fn dest_addr(operand: &Operand) -> i64 {
        match operand {
            Operand::Addr(a) => *a,
            other => panic!("expected an address operand, found {other:?}"),
        }
    }

    fn quad_index(operand: &Operand) -> Result<usize, RuntimeError> {
        match operand {
            Operand::QuadIndex(i) => Ok(*i),
            other => panic!("expected a quad index operand, found {other:?}"),
        }
    }

    fn func_name(operand: &Operand) -> &str {
        match operand {
            Operand::FuncName(n) => n,
            other => panic!("expected a function name operand, found {other:?}"),
        }
    }

    fn arith(&self, dest: i64, left: Value, right: Value, op: Op) -> Result<Value, RuntimeError> {
        let dest_ty = type_of_address(dest).ok_or(RuntimeError::AddressFault(dest))?;
        if matches!(op, Op::Div) && right.is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }
        let result = match dest_ty {
            ValueType::Float => {
                let (l, r) = (left.as_f64(), right.as_f64());
                Value::Float(match op {
                    Op::Add => l + r,
                    Op::Sub => l - r,
                    Op::Mul => l * r,
                    Op::Div => l / r,
                    _ => unreachable!(),
                })
            }
            ValueType::Int => {
                let l = match left {
                    Value::Int(i) => i,
                    other => panic!("int destination fed a non-int operand: {other:?}"),
                };
                let r = match right {
                    Value::Int(i) => i,
                    other => panic!("int destination fed a non-int operand: {other:?}"),
                };
                Value::Int(match op {
                    Op::Add => l + r,
                    Op::Sub => l - r,
                    Op::Mul => l * r,
                    Op::Div => l / r,
                    _ => unreachable!(),
                })
            }
            ValueType::Bool => unreachable!("arithmetic never targets the bool segment"),
        };
        Ok(result)
    }

    fn relational(&self, left: Value, right: Value, op: Op) -> Value {
        let (l, r) = (left.as_f64(), right.as_f64());
        Value::Bool(match op {
            Op::Lt => l < r,
            Op::Gt => l > r,
            Op::Ne => l != r,
            _ => unreachable!(),
        })
    }

    /// Run from `MAIN_START` to `ENDPROGRAM`, returning the program's stdout
    /// as a single buffered string. Print items are space-joined and the
    /// stream is terminated by exactly one trailing newline, matching how
    /// whole programs built of several print statements render as one line.
    pub fn run(&mut self) -> Result<String, RuntimeError> {
        let mut pc: usize = 0;
        loop {
            let quad = self
                .quads
                .get(pc)
                .ok_or(RuntimeError::BadJumpTarget(pc))?;
            trace!("pc={pc} {quad}");
            match quad.op {
                Op::MainStart => {
                    pc = Self::quad_index(&quad.dest)?;
                    continue;
                }
                Op::Func => {
                    pc += 1;
                    continue;
                }
                Op::Era => {
                    let name = Self::func_name(&quad.arg1).to_string();
                    self.pending_frame = Some((name, Frame::default()));
                    pc += 1;
                    continue;
                }
                Op::Param => {
                    let value = self.read(&quad.arg1)?;
                    let dest = Self::dest_addr(&quad.dest);
                    let (_, frame) = self
                        .pending_frame
                        .as_mut()
                        .expect("PARAM without a preceding ERA");
                    frame.cells.insert(dest, value);
                    pc += 1;
                    continue;
                }
                Op::Gosub => {
                    let name = Self::func_name(&quad.arg1);
                    let (era_name, mut frame) = self
                        .pending_frame
                        .take()
                        .expect("GOSUB without a preceding ERA");
                    debug_assert_eq!(era_name, name);
                    let info = self
                        .function_dir
                        .get(name)
                        .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
                    for &(ty, addr) in info.locals.values() {
                        frame.cells.entry(addr).or_insert(match ty.into() {
                            ValueType::Float => Value::Float(0.0),
                            _ => Value::Int(0),
                        });
                    }
                    let target = info.start_quad;
                    self.frame_stack.push(std::mem::replace(&mut self.current, frame));
                    self.call_stack.push(pc + 1);
                    pc = target;
                    continue;
                }
                Op::EndFunc => {
                    self.current = self
                        .frame_stack
                        .pop()
                        .expect("ENDFUNC without a matching activation on the frame stack");
                    pc = self
                        .call_stack
                        .pop()
                        .ok_or(RuntimeError::CallStackUnderflow)?;
                    continue;
                }
                Op::Assign => {
                    let value = self.read(&quad.arg1)?;
                    self.write(Self::dest_addr(&quad.dest), value);
                }
                Op::Add | Op::Sub | Op::Mul | Op::Div => {
                    let left = self.read(&quad.arg1)?;
                    let right = self.read(&quad.arg2)?;
                    let dest = Self::dest_addr(&quad.dest);
                    let result = self.arith(dest, left, right, quad.op)?;
                    self.write(dest, result);
                }
                Op::Lt | Op::Gt | Op::Ne => {
                    let left = self.read(&quad.arg1)?;
                    let right = self.read(&quad.arg2)?;
                    let result = self.relational(left, right, quad.op);
                    self.write(Self::dest_addr(&quad.dest), result);
                }
                Op::Gotof => {
                    let cond = self.read(&quad.arg1)?;
                    let target = Self::quad_index(&quad.dest)?;
                    pc = match cond {
                        Value::Bool(false) => target,
                        Value::Bool(true) => pc + 1,
                        other => panic!("GOTOF fed a non-bool condition: {other:?}"),
                    };
                    continue;
                }
                Op::Goto => {
                    pc = Self::quad_index(&quad.dest)?;
                    continue;
                }
                Op::Print => match &quad.dest {
                    Operand::StrLiteral(s) => self.output.push(s.clone()),
                    Operand::Addr(_) => {
                        let value = self.read(&quad.dest)?;
                        self.output.push(value.to_string());
                    }
                    other => panic!("PRINT with an unexpected operand: {other:?}"),
                },
                Op::EndProgram => {
                    return Ok(self.flush());
                }
            }
            pc += 1;
        }
    }

    fn flush(&mut self) -> String {
        if self.output.is_empty() {
            return String::new();
        }
        let mut s = self.output.join(" ");
        s.push('\n');
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_dir::{FunctionDirectory, ParamInfo};
    use crate::quad::{Op, Operand, Quad};
    use std::collections::HashMap;

    fn program(quads: Vec<Quad>, const_ints: HashMap<i64, i64>) -> CompiledProgram {
        CompiledProgram {
            quads,
            function_dir: FunctionDirectory::new(),
            const_ints,
            const_floats: HashMap::new(),
        }
    }

    #[test]
    fn arithmetic_and_print_round_trip() {
        let mut const_ints = HashMap::new();
        const_ints.insert(8000, 2);
        const_ints.insert(8001, 3);
        let quads = vec![
            Quad::new(Op::MainStart, Operand::None, Operand::None, Operand::QuadIndex(1)),
            Quad::new(
                Op::Add,
                Operand::Addr(8000),
                Operand::Addr(8001),
                Operand::Addr(5000),
            ),
            Quad::new(Op::Print, Operand::None, Operand::None, Operand::Addr(5000)),
            Quad::new(Op::EndProgram, Operand::None, Operand::None, Operand::None),
        ];
        let compiled = program(quads, const_ints);
        let mut vm = Vm::new(&compiled);
        assert_eq!(vm.run().unwrap(), "5\n");
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let mut const_ints = HashMap::new();
        const_ints.insert(8000, 4);
        const_ints.insert(8001, 0);
        let quads = vec![
            Quad::new(Op::MainStart, Operand::None, Operand::None, Operand::QuadIndex(1)),
            Quad::new(
                Op::Div,
                Operand::Addr(8000),
                Operand::Addr(8001),
                Operand::Addr(6000),
            ),
            Quad::new(Op::EndProgram, Operand::None, Operand::None, Operand::None),
        ];
        let compiled = program(quads, const_ints);
        let mut vm = Vm::new(&compiled);
        assert_eq!(vm.run().unwrap_err(), RuntimeError::DivisionByZero);
    }

    #[test]
    fn callee_frame_does_not_leak_into_caller_globals() {
        let mut fd = FunctionDirectory::new();
        fd.declare(
            "f",
            vec![ParamInfo {
                name: "n".to_string(),
                ty: crate::ast::Type::Int,
                address: 3000,
            }],
        )
        .unwrap();
        fd.add_local("f", "n", crate::ast::Type::Int, 3000);
        // Empty body: start_quad points straight at ENDFUNC.
        fd.set_start_quad("f", 8);

        let mut const_ints = HashMap::new();
        const_ints.insert(8000, 9);
        const_ints.insert(8001, 7);

        let quads = vec![
            Quad::new(Op::MainStart, Operand::None, Operand::None, Operand::QuadIndex(1)),
            Quad::new(Op::Assign, Operand::Addr(8000), Operand::None, Operand::Addr(1000)),
            Quad::new(Op::Era, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::Param, Operand::Addr(8001), Operand::None, Operand::Addr(3000)),
            Quad::new(Op::Gosub, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::Print, Operand::None, Operand::None, Operand::Addr(1000)),
            Quad::new(Op::EndProgram, Operand::None, Operand::None, Operand::None),
            Quad::new(Op::Func, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::EndFunc, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
        ];
        let compiled = CompiledProgram {
            quads,
            function_dir: fd,
            const_ints,
            const_floats: HashMap::new(),
        };
        let mut vm = Vm::new(&compiled);
        assert_eq!(vm.run().unwrap(), "9\n");
    }

    #[test]
    fn recursive_countdown_stacks_multiple_activations() {
        let mut fd = FunctionDirectory::new();
        fd.declare(
            "f",
            vec![ParamInfo {
                name: "k".to_string(),
                ty: crate::ast::Type::Int,
                address: 3000,
            }],
        )
        .unwrap();
        fd.add_local("f", "k", crate::ast::Type::Int, 3000);
        fd.set_start_quad("f", 7);

        let mut const_ints = HashMap::new();
        const_ints.insert(8000, 0);
        const_ints.insert(8001, 1);
        const_ints.insert(8002, 3);

        let quads = vec![
            Quad::new(Op::MainStart, Operand::None, Operand::None, Operand::QuadIndex(1)),
            Quad::new(Op::Assign, Operand::Addr(8002), Operand::None, Operand::Addr(1000)),
            Quad::new(Op::Era, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::Param, Operand::Addr(1000), Operand::None, Operand::Addr(3000)),
            Quad::new(Op::Gosub, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::EndProgram, Operand::None, Operand::None, Operand::None),
            Quad::new(Op::Func, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::Gt, Operand::Addr(3000), Operand::Addr(8000), Operand::Addr(7000)),
            Quad::new(Op::Gotof, Operand::Addr(7000), Operand::None, Operand::QuadIndex(14)),
            Quad::new(Op::Print, Operand::None, Operand::None, Operand::Addr(3000)),
            Quad::new(Op::Sub, Operand::Addr(3000), Operand::Addr(8001), Operand::Addr(5000)),
            Quad::new(Op::Era, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::Param, Operand::Addr(5000), Operand::None, Operand::Addr(3000)),
            Quad::new(Op::Gosub, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
            Quad::new(Op::EndFunc, Operand::FuncName("f".to_string()), Operand::None, Operand::None),
        ];
        let compiled = CompiledProgram {
            quads,
            function_dir: fd,
            const_ints,
            const_floats: HashMap::new(),
        };
        let mut vm = Vm::new(&compiled);
        // Four stacked activations of `f` (k = 3, 2, 1, 0); the deepest one
        // hits the k > 0 check false and returns without printing or
        // recursing further, unwinding one frame per shared ENDFUNC quad.
        assert_eq!(vm.run().unwrap(), "3 2 1\n");
    }
}
