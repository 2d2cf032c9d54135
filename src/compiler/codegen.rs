//! Code Generation
//!
//! Compiler pass that lowers the annotated AST into textual _x86-64_
//! assembly (AT&T syntax, GNU `as` compatible). The calling convention is
//! chosen once at generator construction and drives the argument register,
//! symbol decoration, and frame setup used for the whole listing.
//!
//! Failures are recorded as structured errors rather than returned eagerly;
//! emission continues so one run surfaces as many problems as possible. A
//! non-empty error list means the listing is not valid assembly and must be
//! discarded.

use std::collections::HashMap;
use std::fmt::Write;

use crate::compiler::ast::{BinaryOperator, ExprKind, Expression, Program, Statement, Ty};
use crate::error::CodegenError;

/// Every variable occupies one fixed-size slot regardless of logical type.
const WORD_SIZE: i64 = 8;

/// Platform calling conventions the generator can target.
///
/// The two Unix variants share the SysV convention and differ only in
/// symbol decoration; Windows x64 uses a different argument register and
/// requires a fixed 32-byte shadow-space reservation before calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// SysV ABI, undecorated symbols.
    LinuxX64,
    /// SysV ABI, `_`-prefixed symbols.
    MacX64,
    /// Windows x64 ABI: first argument in `rcx`, 32-byte shadow space.
    WinX64,
}

impl Target {
    /// Returns the target matching the host platform.
    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Target::WinX64
        } else if cfg!(target_os = "macos") {
            Target::MacX64
        } else {
            Target::LinuxX64
        }
    }

    /// Register holding the first integer argument at a call site.
    const fn first_arg_reg(self) -> &'static str {
        match self {
            Target::LinuxX64 | Target::MacX64 => "%rdi",
            Target::WinX64 => "%rcx",
        }
    }

    /// Bytes of shadow space the ABI requires the caller to reserve.
    const fn shadow_space(self) -> i64 {
        match self {
            Target::LinuxX64 | Target::MacX64 => 0,
            Target::WinX64 => 32,
        }
    }

    /// Applies the platform's symbol-name decoration.
    fn symbol(self, name: &str) -> String {
        match self {
            Target::LinuxX64 | Target::WinX64 => name.into(),
            Target::MacX64 => format!("_{name}"),
        }
    }
}

/// Frame-relative storage assigned to a variable by the backend.
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// Positive offset below `%rbp`.
    offset: i64,
    ty: Ty,
}

/// Lowers an annotated `Program` into textual assembly.
///
/// Keeps its own symbol table, independent of the semantic phase: slots are
/// allocated lazily in first-use order during generation, 8 bytes each,
/// and never reclaimed within a compilation unit.
#[derive(Debug)]
pub struct CodeGenerator {
    target: Target,
    out: String,
    errors: Vec<CodegenError>,
    slots: HashMap<String, Slot>,
    /// Total bytes of variable storage allocated so far.
    stack_size: i64,
}

impl CodeGenerator {
    /// Returns a new generator for `target`.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            out: String::new(),
            errors: vec![],
            slots: HashMap::new(),
            stack_size: 0,
        }
    }

    /// Lowers `program`, returning the listing and every error recorded.
    ///
    /// The listing is only valid assembly when the error list is empty.
    #[must_use]
    pub fn generate(mut self, program: &Program) -> (String, Vec<CodegenError>) {
        self.prologue();

        for stmt in &program.statements {
            self.statement(stmt);
        }

        self.epilogue();

        (self.out, self.errors)
    }

    /// Emits the frame setup: directives, entry label, saved frame pointer,
    /// and any fixed reservation the ABI demands before calls.
    fn prologue(&mut self) {
        let main = self.target.symbol("main");

        self.raw(&format!("\t.text\n\t.globl\t{main}\n{main}:\n"));
        self.emit("pushq\t%rbp");
        self.emit("movq\t%rsp, %rbp");

        let shadow = self.target.shadow_space();
        if shadow > 0 {
            self.emit(&format!("subq\t${shadow}, %rsp"));
        }
    }

    /// Emits the frame teardown: all variable storage is released by
    /// restoring the frame pointer, and a zero status code is returned.
    fn epilogue(&mut self) {
        self.emit("movl\t$0, %eax");
        self.emit("movq\t%rbp, %rsp");
        self.emit("popq\t%rbp");
        self.emit("ret");

        if self.target == Target::LinuxX64 {
            // Indicates the program does not need an executable stack.
            self.raw("\t.section\t.note.GNU-stack,\"\",@progbits\n");
        }
    }

    fn statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Expression(expr) => {
                // Result is left in the accumulator and simply discarded.
                self.expression(expr);
            }
            Statement::Assignment { target, value } => {
                self.expression(value);

                let slot = match self.slots.get(&target.name) {
                    Some(slot) => *slot,
                    None => self.allocate_slot(&target.name, target.ty),
                };

                // Store width follows the variable's resolved type. A
                // matching re-assignment still re-emits the store: the value
                // changed even if the type didn't.
                match slot.ty {
                    Ty::Bool => self.emit(&format!("movb\t%al, -{}(%rbp)", slot.offset)),
                    _ => self.emit(&format!("movq\t%rax, -{}(%rbp)", slot.offset)),
                }
            }
            Statement::Print(expr) => {
                self.expression(expr);

                let helper = match expr.ty {
                    Ty::Int => "print_int",
                    Ty::Bool => "print_bool",
                    ty => {
                        self.errors.push(CodegenError::UnsupportedPrintType(ty));
                        return;
                    }
                };

                let reg = self.target.first_arg_reg();
                let sym = self.target.symbol(helper);

                self.emit(&format!("movq\t%rax, {reg}"));
                self.emit(&format!("call\t{sym}"));
            }
        }
    }

    /// Lowers `expr`, leaving its value in `%rax`.
    fn expression(&mut self, expr: &Expression) {
        match &expr.kind {
            ExprKind::IntLiteral(v) => {
                // `movq` sign-extends a 32-bit immediate; larger values need
                // the full 64-bit move.
                if i32::try_from(*v).is_ok() {
                    self.emit(&format!("movq\t${v}, %rax"));
                } else {
                    self.emit(&format!("movabsq\t${v}, %rax"));
                }
            }
            ExprKind::BoolLiteral(v) => {
                self.emit(&format!("movq\t${}, %rax", i64::from(*v)));
            }
            ExprKind::Ident(name) => match self.slots.get(name) {
                Some(slot) => match slot.ty {
                    Ty::Bool => self.emit(&format!("movzbq\t-{}(%rbp), %rax", slot.offset)),
                    _ => self.emit(&format!("movq\t-{}(%rbp), %rax", slot.offset)),
                },
                None => {
                    self.errors
                        .push(CodegenError::UndefinedVariable(name.clone()));
                    // Placeholder load keeps the listing well-formed enough
                    // to continue diagnosing.
                    self.emit("movq\t$0, %rax");
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                // The accumulator is shared across nested evaluations, so
                // the right operand is evaluated first and preserved on the
                // stack while the left operand claims `%rax`. Safe because
                // operand evaluation is side-effect-free.
                self.expression(rhs);
                self.emit("pushq\t%rax");
                self.expression(lhs);
                self.emit("popq\t%rcx");

                match op {
                    BinaryOperator::Add => self.emit("addq\t%rcx, %rax"),
                    BinaryOperator::Subtract => self.emit("subq\t%rcx, %rax"),
                    // Single-operand signed multiply against the
                    // accumulator; the high half in %rdx is discarded.
                    BinaryOperator::Multiply => self.emit("imulq\t%rcx"),
                    BinaryOperator::Divide => {
                        // Sign-extend %rax into %rdx:%rax before the signed
                        // divide; only the quotient is kept.
                        self.emit("cqto");
                        self.emit("idivq\t%rcx");
                    }
                }
            }
        }
    }

    /// Allocates the next unused frame-relative slot for `name`.
    ///
    /// Allocation is monotonic at `WORD_SIZE` granularity; slots are never
    /// reused. Re-allocating a name is an internal-consistency violation
    /// and is recorded, keeping the existing slot.
    fn allocate_slot(&mut self, name: &str, ty: Ty) -> Slot {
        if let Some(existing) = self.slots.get(name) {
            self.errors.push(CodegenError::SlotRedefined(name.into()));
            return *existing;
        }

        self.stack_size += WORD_SIZE;

        let slot = Slot {
            offset: self.stack_size,
            ty,
        };

        self.slots.insert(name.into(), slot);
        self.emit(&format!("subq\t${WORD_SIZE}, %rsp"));

        slot
    }

    /// Emits one instruction line.
    fn emit(&mut self, inst: &str) {
        // Writing to a String cannot fail.
        let _ = writeln!(self.out, "\t{inst}");
    }

    /// Emits preformatted text (labels, directives).
    fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }
}

/// Lowers `program` for `target`, returning the assembly listing.
///
/// # Errors
///
/// Returns every code generation error recorded; the partial listing is
/// discarded, as it is not valid assembly.
pub fn generate(target: Target, program: &Program) -> Result<String, Vec<CodegenError>> {
    let (listing, errors) = CodeGenerator::new(target).generate(program);

    if errors.is_empty() {
        Ok(listing)
    } else {
        Err(errors)
    }
}
