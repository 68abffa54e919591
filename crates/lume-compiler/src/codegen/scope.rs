//! Lexical name→register scoping.
//!
//! Registers themselves are monotonic and never reclaimed; the scope stack
//! only controls which names are visible. Function bodies are hard
//! boundaries: without upvalue support, an outer local is not visible inside
//! a nested function and falls back to a global reference.

/// A named local bound to a register.
#[derive(Clone, Debug)]
struct LocalVar {
    name: String,
    reg: u32,
    depth: usize,
}

#[derive(Debug, Default)]
pub struct ScopeStack {
    locals: Vec<LocalVar>,
    depth: usize,
    /// Index into `locals` where each enclosing function's bindings start.
    function_bases: Vec<usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack::default()
    }

    /// Enter a block scope (if/while/for bodies).
    pub fn enter_block(&mut self) {
        self.depth += 1;
    }

    /// Leave a block scope, dropping bindings declared inside it.
    pub fn leave_block(&mut self) {
        debug_assert!(self.depth > 0, "mismatched block");
        while matches!(self.locals.last(), Some(v) if v.depth == self.depth) {
            self.locals.pop();
        }
        self.depth -= 1;
    }

    /// Enter a function body; outer bindings become invisible.
    pub fn enter_function(&mut self) {
        self.function_bases.push(self.locals.len());
        self.enter_block();
    }

    /// Leave a function body, dropping all of its bindings.
    pub fn leave_function(&mut self) {
        self.leave_block();
        let base = self.function_bases.pop().expect("mismatched function");
        self.locals.truncate(base);
    }

    /// Bind a name to a register in the current scope. Shadows any outer
    /// binding of the same name until the scope is left.
    pub fn add_local(&mut self, name: &str, reg: u32) {
        self.locals.push(LocalVar {
            name: name.to_string(),
            reg,
            depth: self.depth,
        });
    }

    /// Resolve a name to a register, innermost binding first, stopping at
    /// the current function boundary.
    pub fn resolve(&self, name: &str) -> Option<u32> {
        let base = self.function_bases.last().copied().unwrap_or(0);
        self.locals[base..]
            .iter()
            .rev()
            .find(|v| v.name == name)
            .map(|v| v.reg)
    }
}
