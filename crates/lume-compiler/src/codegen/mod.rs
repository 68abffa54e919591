//! Tree-walking code generator: one pass over the (optimized) AST, fresh
//! result registers, and two-pass emit-then-patch jumps.

pub mod scope;

use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt, UnOp};
use crate::chunk::{Chunk, Value};
use crate::opcode::OpCode;
use scope::ScopeStack;
use std::fmt;

/// Code generation error. A grammar-conformant AST cannot trigger one.
#[derive(Clone, Debug, PartialEq)]
pub struct CodegenError {
    pub message: String,
    pub line: u32,
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.message)
    }
}

impl std::error::Error for CodegenError {}

/// Generate a chunk from a program.
pub fn generate(program: &Program) -> Result<Chunk, CodegenError> {
    let mut gen = CodeGen::new();
    for stmt in &program.statements {
        gen.gen_stmt(stmt)?;
    }
    Ok(gen.chunk)
}

struct CodeGen {
    chunk: Chunk,
    scope: ScopeStack,
    /// Monotonic register allocator; registers are never reused.
    next_reg: u32,
}

impl CodeGen {
    fn new() -> Self {
        CodeGen {
            chunk: Chunk::new(),
            scope: ScopeStack::new(),
            next_reg: 0,
        }
    }

    fn alloc_reg(&mut self) -> u32 {
        let reg = self.next_reg;
        self.next_reg += 1;
        reg
    }

    fn emit(&mut self, op: OpCode, a: i32, b: i32, c: i32, line: u32) -> usize {
        self.chunk.emit(op, a, b, c, line)
    }

    /// Emit a branch with a placeholder offset, to be patched later.
    fn emit_jump(&mut self, op: OpCode, test_reg: i32, line: u32) -> usize {
        self.emit(op, test_reg, 0, 0, line)
    }

    /// Point a previously emitted branch at the next instruction to come.
    fn patch_jump(&mut self, jump_pc: usize) {
        let target = self.chunk.code_len();
        self.patch_jump_to(jump_pc, target);
    }

    fn patch_jump_to(&mut self, jump_pc: usize, target: usize) {
        let offset = target as i32 - jump_pc as i32 - 1;
        self.chunk.get_mut(jump_pc).b = offset;
    }

    fn add_constant(&mut self, value: Value) -> i32 {
        self.chunk.add_constant(value) as i32
    }

    fn name_constant(&mut self, name: &str) -> i32 {
        self.add_constant(Value::Str(name.to_string()))
    }

    // ---- Statements ----

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Local { name, init, line } => {
                let reg = match init {
                    Some(expr) => self.gen_expr(expr)?,
                    None => {
                        let reg = self.alloc_reg();
                        self.emit(OpCode::LoadNil, reg as i32, 0, 0, *line);
                        reg
                    }
                };
                self.scope.add_local(name, reg);
                Ok(())
            }
            Stmt::Assign {
                target,
                value,
                line,
            } => {
                let Expr::Identifier { name, .. } = target else {
                    return Err(CodegenError {
                        message: "cannot assign to this expression".to_string(),
                        line: *line,
                    });
                };
                let value_reg = self.gen_expr(value)? as i32;
                match self.scope.resolve(name) {
                    Some(reg) => {
                        self.emit(OpCode::Move, reg as i32, value_reg, 0, *line);
                    }
                    None => {
                        let k = self.name_constant(name);
                        self.emit(OpCode::SetGlobal, value_reg, k, 0, *line);
                    }
                }
                Ok(())
            }
            Stmt::If {
                cond,
                consequent,
                alternate,
                line,
            } => self.gen_if(cond, consequent, alternate.as_deref(), *line),
            Stmt::While { cond, body, line } => self.gen_while(cond, body, *line),
            Stmt::For {
                var,
                start,
                stop,
                step,
                body,
                line,
            } => self.gen_for(var, start, stop, step.as_ref(), body, *line),
            Stmt::Function {
                name,
                params,
                body,
                line,
            } => self.gen_function(name, params, body, *line),
            Stmt::Return { value, line } => {
                match value {
                    Some(expr) => {
                        let reg = self.gen_expr(expr)? as i32;
                        self.emit(OpCode::Return, reg, 1, 0, *line);
                    }
                    None => {
                        self.emit(OpCode::Return, 0, 0, 0, *line);
                    }
                }
                Ok(())
            }
            Stmt::Expr { expr, .. } => {
                self.gen_expr(expr)?;
                Ok(())
            }
        }
    }

    fn gen_block(&mut self, statements: &[Stmt]) -> Result<(), CodegenError> {
        self.scope.enter_block();
        let result = statements.iter().try_for_each(|s| self.gen_stmt(s));
        self.scope.leave_block();
        result
    }

    fn gen_if(
        &mut self,
        cond: &Expr,
        consequent: &[Stmt],
        alternate: Option<&[Stmt]>,
        line: u32,
    ) -> Result<(), CodegenError> {
        let cond_reg = self.gen_expr(cond)? as i32;
        let skip = self.emit_jump(OpCode::JmpF, cond_reg, line);
        self.gen_block(consequent)?;
        match alternate {
            Some(alternate) => {
                let over_else = self.emit_jump(OpCode::Jmp, 0, line);
                self.patch_jump(skip);
                self.gen_block(alternate)?;
                self.patch_jump(over_else);
            }
            None => {
                self.patch_jump(skip);
            }
        }
        Ok(())
    }

    fn gen_while(&mut self, cond: &Expr, body: &[Stmt], line: u32) -> Result<(), CodegenError> {
        let header = self.chunk.code_len();
        let cond_reg = self.gen_expr(cond)? as i32;
        let exit = self.emit_jump(OpCode::JmpF, cond_reg, line);
        self.gen_block(body)?;
        // Backward jump, same offset formula, negative result.
        let back_pc = self.chunk.code_len();
        let offset = header as i32 - back_pc as i32 - 1;
        self.emit(OpCode::Jmp, 0, offset, 0, line);
        self.patch_jump(exit);
        Ok(())
    }

    fn gen_for(
        &mut self,
        var: &str,
        start: &Expr,
        stop: &Expr,
        step: Option<&Expr>,
        body: &[Stmt],
        line: u32,
    ) -> Result<(), CodegenError> {
        let start_reg = self.gen_expr(start)? as i32;
        let stop_reg = self.gen_expr(stop)? as i32;
        let step_reg = match step {
            Some(expr) => self.gen_expr(expr)? as i32,
            None => {
                // Step defaults to literal 1.
                let reg = self.alloc_reg() as i32;
                let k = self.add_constant(Value::Number(1.0));
                self.emit(OpCode::LoadK, reg, k, 0, line);
                reg
            }
        };

        // Contiguous control block: current, limit, step.
        let base = self.alloc_reg() as i32;
        let limit = self.alloc_reg() as i32;
        let step_slot = self.alloc_reg() as i32;
        self.emit(OpCode::Move, base, start_reg, 0, line);
        self.emit(OpCode::Move, limit, stop_reg, 0, line);
        self.emit(OpCode::Move, step_slot, step_reg, 0, line);

        // User-visible loop variable, separate from the control block.
        let var_reg = self.alloc_reg();

        self.scope.enter_block();
        self.scope.add_local(var, var_reg);
        let prep = self.emit(OpCode::ForPrep, base, 0, 0, line);
        let body_start = self.chunk.code_len();
        // Each iteration starts by copying the control register into the
        // user-visible variable.
        self.emit(OpCode::Move, var_reg as i32, base, 0, line);
        let result = body.iter().try_for_each(|s| self.gen_stmt(s));
        self.scope.leave_block();
        result?;

        let loop_pc = self.chunk.code_len();
        let offset = body_start as i32 - loop_pc as i32 - 1;
        self.emit(OpCode::ForLoop, base, offset, 0, line);
        self.patch_jump(prep);
        Ok(())
    }

    fn gen_function(
        &mut self,
        name: &str,
        params: &[String],
        body: &[Stmt],
        line: u32,
    ) -> Result<(), CodegenError> {
        // The body is emitted inline; a patched jump steps over it.
        let over_body = self.emit_jump(OpCode::Jmp, 0, line);
        let entry = self.chunk.code_len();

        self.scope.enter_function();
        for param in params {
            let reg = self.alloc_reg();
            self.scope.add_local(param, reg);
        }
        let result = body.iter().try_for_each(|s| self.gen_stmt(s));
        // Fall-through return for bodies that don't end in one.
        self.emit(OpCode::Return, 0, 0, 0, line);
        self.scope.leave_function();
        result?;

        self.patch_jump(over_body);

        // A function declaration is a closure bound to a global of the
        // same name; there are no first-class function values.
        let dest = self.alloc_reg() as i32;
        self.emit(OpCode::Closure, dest, entry as i32, 0, line);
        let k = self.name_constant(name);
        self.emit(OpCode::SetGlobal, dest, k, 0, line);
        Ok(())
    }

    // ---- Expressions ----

    /// Generate code for an expression; the result lands in a fresh
    /// register, which is returned.
    fn gen_expr(&mut self, expr: &Expr) -> Result<u32, CodegenError> {
        match expr {
            Expr::Literal { value, line } => {
                let dest = self.alloc_reg();
                self.gen_literal(value, dest as i32, *line);
                Ok(dest)
            }
            Expr::Identifier { name, line } => {
                let dest = self.alloc_reg();
                match self.scope.resolve(name) {
                    Some(reg) => {
                        self.emit(OpCode::Move, dest as i32, reg as i32, 0, *line);
                    }
                    None => {
                        // Unknown names are global lookups.
                        let k = self.name_constant(name);
                        self.emit(OpCode::GetGlobal, dest as i32, k, 0, *line);
                    }
                }
                Ok(dest)
            }
            Expr::Binary {
                op,
                left,
                right,
                line,
            } => self.gen_binary(*op, left, right, *line),
            Expr::Unary { op, operand, line } => {
                let dest = self.alloc_reg();
                let src = self.gen_expr(operand)? as i32;
                let opcode = match op {
                    UnOp::Neg => OpCode::Neg,
                    UnOp::Not => OpCode::Not,
                };
                self.emit(opcode, dest as i32, src, 0, *line);
                Ok(dest)
            }
            Expr::Call { callee, args, line } => self.gen_call(callee, args, *line),
            Expr::Table { elements, line } => {
                let dest = self.alloc_reg() as i32;
                self.emit(OpCode::NewTable, dest, elements.len() as i32, 0, *line);
                for (i, element) in elements.iter().enumerate() {
                    let value_reg = self.gen_expr(element)? as i32;
                    // 1-based element positions.
                    self.emit(OpCode::SetIndex, dest, i as i32 + 1, value_reg, *line);
                }
                Ok(dest as u32)
            }
        }
    }

    fn gen_literal(&mut self, value: &LiteralValue, dest: i32, line: u32) {
        match value {
            LiteralValue::Nil => {
                self.emit(OpCode::LoadNil, dest, 0, 0, line);
            }
            LiteralValue::Bool(true) => {
                self.emit(OpCode::LoadTrue, dest, 0, 0, line);
            }
            LiteralValue::Bool(false) => {
                self.emit(OpCode::LoadFalse, dest, 0, 0, line);
            }
            LiteralValue::Number(n) => {
                let k = self.add_constant(Value::Number(*n));
                self.emit(OpCode::LoadK, dest, k, 0, line);
            }
            LiteralValue::Str(s) => {
                let k = self.add_constant(Value::Str(s.clone()));
                self.emit(OpCode::LoadK, dest, k, 0, line);
            }
        }
    }

    fn gen_binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        line: u32,
    ) -> Result<u32, CodegenError> {
        // Short-circuit operators produce their result without a comparison
        // opcode: keep the left value or fall through into the right one.
        if op == BinOp::And || op == BinOp::Or {
            let dest = self.alloc_reg() as i32;
            let left_reg = self.gen_expr(left)? as i32;
            self.emit(OpCode::Move, dest, left_reg, 0, line);
            let jump_op = if op == BinOp::And {
                OpCode::JmpF
            } else {
                OpCode::JmpT
            };
            let short = self.emit_jump(jump_op, dest, line);
            let right_reg = self.gen_expr(right)? as i32;
            self.emit(OpCode::Move, dest, right_reg, 0, line);
            self.patch_jump(short);
            return Ok(dest as u32);
        }

        let dest = self.alloc_reg() as i32;
        let left_reg = self.gen_expr(left)? as i32;
        let right_reg = self.gen_expr(right)? as i32;
        let (opcode, a, b) = match op {
            BinOp::Add => (OpCode::Add, left_reg, right_reg),
            BinOp::Sub => (OpCode::Sub, left_reg, right_reg),
            BinOp::Mul => (OpCode::Mul, left_reg, right_reg),
            BinOp::Div => (OpCode::Div, left_reg, right_reg),
            BinOp::Mod => (OpCode::Mod, left_reg, right_reg),
            BinOp::Pow => (OpCode::Pow, left_reg, right_reg),
            BinOp::Concat => (OpCode::Concat, left_reg, right_reg),
            BinOp::Eq => (OpCode::Eq, left_reg, right_reg),
            BinOp::Ne => (OpCode::Ne, left_reg, right_reg),
            BinOp::Lt => (OpCode::Lt, left_reg, right_reg),
            BinOp::Le => (OpCode::Le, left_reg, right_reg),
            // No GT/GE opcodes: swap operands into LT/LE.
            BinOp::Gt => (OpCode::Lt, right_reg, left_reg),
            BinOp::Ge => (OpCode::Le, right_reg, left_reg),
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        };
        self.emit(opcode, dest, a, b, line);
        Ok(dest as u32)
    }

    fn gen_call(&mut self, callee: &Expr, args: &[Expr], line: u32) -> Result<u32, CodegenError> {
        // Callee and arguments must land in consecutive registers starting
        // at the call's own result register.
        let dest = match callee {
            Expr::Identifier { name, line } => {
                let dest = self.alloc_reg() as i32;
                match self.scope.resolve(name) {
                    Some(reg) => {
                        self.emit(OpCode::Move, dest, reg as i32, 0, *line);
                    }
                    None => {
                        let k = self.name_constant(name);
                        self.emit(OpCode::GetGlobal, dest, k, 0, *line);
                    }
                }
                dest
            }
            other => {
                let callee_reg = self.gen_expr(other)? as i32;
                let dest = self.alloc_reg() as i32;
                self.emit(OpCode::Move, dest, callee_reg, 0, line);
                dest
            }
        };

        // Reserve the argument slots up front so they stay contiguous, then
        // move each evaluated argument into its slot.
        let slots: Vec<i32> = args.iter().map(|_| self.alloc_reg() as i32).collect();
        for (slot, arg) in slots.iter().zip(args) {
            let value_reg = self.gen_expr(arg)? as i32;
            self.emit(OpCode::Move, *slot, value_reg, 0, line);
        }

        self.emit(OpCode::Call, dest, args.len() as i32, 1, line);
        Ok(dest as u32)
    }
}
