use crate::{
    backend::layout::FrameLayout,
    frontend::{ast::BinaryOperatorKind, intern::InternedSymbol},
    index::Index,
    middle::ir::{self, LabelId, StringId, Value},
};

/// Assembly syntax flavour. Both are Intel operand order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Nasm,
    /// GNU as after `.intel_syntax noprefix`
    GasIntel,
}

impl Dialect {
    fn comment_prefix(self) -> &'static str {
        match self {
            Dialect::Nasm => ";",
            Dialect::GasIntel => "#",
        }
    }

    fn global_directive(self) -> &'static str {
        match self {
            Dialect::Nasm => "global",
            Dialect::GasIntel => ".globl",
        }
    }

    /// RIP relative address of a string literal
    fn string_address(self, string: StringId) -> String {
        match self {
            Dialect::Nasm => format!("[rel {}]", string_label(string)),
            Dialect::GasIntel => format!("[rip + {}]", string_label(string)),
        }
    }
}

pub fn string_label(string: StringId) -> String {
    format!("__str_{}", string.index())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// System V AMD64, used on Linux
    SystemV,
    /// Microsoft x64
    Windows,
}

impl CallingConvention {
    pub fn argument_registers(self) -> &'static [X86FullRegister] {
        match self {
            CallingConvention::SystemV => &[
                X86FullRegister::Rdi,
                X86FullRegister::Rsi,
                X86FullRegister::Rdx,
                X86FullRegister::Rcx,
                X86FullRegister::R8,
                X86FullRegister::R9,
            ],
            CallingConvention::Windows => &[
                X86FullRegister::Rcx,
                X86FullRegister::Rdx,
                X86FullRegister::R8,
                X86FullRegister::R9,
            ],
        }
    }

    /// Bytes the caller reserves directly above the return address for the
    /// callee to home its register arguments
    pub fn shadow_space(self) -> usize {
        match self {
            CallingConvention::SystemV => 0,
            CallingConvention::Windows => 32,
        }
    }

    /// Offset from `rbp` of the first stack passed argument, once the callee
    /// has pushed `rbp`
    pub fn stack_arguments_offset(self) -> usize {
        16 + self.shadow_space()
    }
}

pub struct Assembler<'a> {
    output: String,
    function_name: &'a str,
    layout: &'a FrameLayout,
    dialect: Dialect,
    convention: CallingConvention,
}

impl<'a> Assembler<'a> {
    pub fn new(
        function: &'a ir::Function,
        layout: &'a FrameLayout,
        dialect: Dialect,
        convention: CallingConvention,
    ) -> Self {
        Self {
            output: String::new(),
            function_name: function.name.value(),
            layout,
            dialect,
            convention,
        }
    }

    pub fn into_output(self) -> String {
        self.output
    }

    fn push_line(&mut self, string: impl AsRef<str>) {
        self.output.push_str(string.as_ref());
        self.output.push('\n');
    }

    pub fn emit(&mut self, string: impl AsRef<str>) {
        self.output.push_str("    ");
        self.push_line(string);
    }

    pub fn global_label(&mut self, name: &str) {
        self.emit(format!("{} {name}", self.dialect.global_directive()));
        self.push_line(format!("{name}:"));
    }

    pub fn label(&mut self, label: LabelId) {
        self.push_line(format!("{}:", self.label_name(label)));
    }

    pub fn comment(&mut self, comment: impl AsRef<str>) {
        self.emit(format!("{} {}", self.dialect.comment_prefix(), comment.as_ref()));
    }

    /// Labels are prefixed with the function name so two functions never
    /// share one
    pub fn label_name(&self, label: LabelId) -> String {
        format!(".L_{}_{}", self.function_name, label.index())
    }

    fn exit_label(&self) -> String {
        format!(".L_{}_exit", self.function_name)
    }

    pub fn function_prologue(&mut self) {
        self.emit("push rbp");
        self.emit("mov rbp, rsp");

        if self.layout.size() > 0 {
            self.emit(format!("sub rsp, {}", self.layout.size()));
        }
    }

    /// Copies register passed arguments into their frame slots so they can
    /// be read and assigned like temps
    pub fn spill_register_arguments(&mut self) {
        for i in 0..self.layout.register_parameter_count() {
            let register = self.convention.argument_registers()[i];
            let slot = self.layout.argument(ir::ArgId::new(i));
            self.emit(format!("mov {slot}, {register}"));
        }
    }

    pub fn function_epilogue(&mut self) {
        self.push_line(format!("{}:", self.exit_label()));
        self.emit("mov rsp, rbp");
        self.emit("pop rbp");
        self.emit("ret");
    }

    pub fn load_operand(&mut self, destination: X86FullRegister, source: Value) {
        match source {
            Value::Const(value) => self.emit(format!("mov {destination}, {value}")),
            Value::Temp(_) | Value::Arg(_) => {
                let slot = self.layout.slot(source);
                self.emit(format!("mov {destination}, {slot}"));
            }
            Value::StringRef(string) => {
                let address = self.dialect.string_address(string);
                self.emit(format!("lea {destination}, {address}"));
            }
        }
    }

    #[track_caller]
    pub fn store_operand(&mut self, destination: Value, source: X86FullRegister) {
        let slot = self.layout.slot(destination);
        self.emit(format!("mov {slot}, {source}"));
    }

    /// Right hand operand of a two operand instruction: a sign extended
    /// 32-bit immediate, a frame slot, or `rcx` after loading it
    fn source_operand(&mut self, value: Value) -> String {
        match value {
            Value::Const(value) if value <= i32::MAX as u64 => value.to_string(),
            Value::Temp(_) | Value::Arg(_) => self.layout.slot(value).to_string(),
            _ => {
                self.load_operand(X86FullRegister::Rcx, value);
                X86FullRegister::Rcx.to_string()
            }
        }
    }

    pub fn binary_operation(
        &mut self,
        operator: BinaryOperatorKind,
        lhs: Value,
        rhs: Value,
        destination: Value,
    ) {
        let rax = X86FullRegister::Rax;

        self.load_operand(rax, lhs);

        match operator {
            BinaryOperatorKind::Add => {
                let rhs = self.source_operand(rhs);
                self.emit(format!("add {rax}, {rhs}"));
            }
            BinaryOperatorKind::Subtract => {
                let rhs = self.source_operand(rhs);
                self.emit(format!("sub {rax}, {rhs}"));
            }
            BinaryOperatorKind::Multiply => {
                // Only the low 64 bits are kept, which are the same for
                // signed and unsigned multiplication
                match rhs {
                    Value::Const(value) if value <= i32::MAX as u64 => {
                        self.emit(format!("imul {rax}, {rax}, {value}"));
                    }
                    _ => {
                        let rhs = self.source_operand(rhs);
                        self.emit(format!("imul {rax}, {rhs}"));
                    }
                }
            }
            BinaryOperatorKind::Divide => {
                let rcx = X86FullRegister::Rcx;
                self.load_operand(rcx, rhs);
                self.emit(format!(
                    "xor {0}, {0}",
                    X86FullRegister::Rdx.as_32_bit()
                ));
                self.emit(format!("div {rcx}"));
            }
            comparison => {
                let rhs = self.source_operand(rhs);
                self.emit(format!("cmp {rax}, {rhs}"));
                self.emit(format!(
                    "{} {}",
                    set_instruction(comparison),
                    rax.as_8_bit()
                ));
                self.emit(format!("movzx {}, {}", rax.as_32_bit(), rax.as_8_bit()));
            }
        }

        self.store_operand(destination, rax);
    }

    pub fn assign(&mut self, destination: Value, value: Value) {
        self.load_operand(X86FullRegister::Rax, value);
        self.store_operand(destination, X86FullRegister::Rax);
    }

    pub fn jump_if_zero(&mut self, condition: Value, target: LabelId) {
        self.load_operand(X86FullRegister::Rax, condition);
        self.emit("test rax, rax");
        self.emit(format!("jz {}", self.label_name(target)));
    }

    pub fn jump(&mut self, target: LabelId) {
        self.emit(format!("jmp {}", self.label_name(target)));
    }

    /// A bare `return` yields 0, the same as falling off the end
    pub fn function_return(&mut self, value: Option<Value>) {
        match value {
            Some(value) => self.load_operand(X86FullRegister::Rax, value),
            None => self.clear_return_value(),
        }

        self.emit(format!("jmp {}", self.exit_label()));
    }

    pub fn clear_return_value(&mut self) {
        self.emit(format!("xor {0}, {0}", X86FullRegister::Rax.as_32_bit()));
    }

    /// Argument passing per the calling convention. The frame keeps `rsp`
    /// 16-byte aligned, so only an odd number of pushed arguments needs
    /// padding.
    pub fn call(&mut self, name: InternedSymbol, arguments: &[Value], destination: Option<Value>) {
        let registers = self.convention.argument_registers();
        let split = arguments.len().min(registers.len());
        let (register_arguments, stack_arguments) = arguments.split_at(split);

        let padding = if stack_arguments.len() % 2 == 1 { 8 } else { 0 };

        if padding > 0 {
            self.emit(format!("sub rsp, {padding}"));
        }

        for argument in stack_arguments.iter().rev() {
            self.load_operand(X86FullRegister::Rax, *argument);
            self.emit("push rax");
        }

        for (register, argument) in registers.iter().zip(register_arguments) {
            self.load_operand(*register, *argument);
        }

        let shadow_space = self.convention.shadow_space();

        if shadow_space > 0 {
            self.emit(format!("sub rsp, {shadow_space}"));
        }

        self.emit(format!("call {}", name.value()));

        let cleanup = padding + stack_arguments.len() * 8 + shadow_space;

        if cleanup > 0 {
            self.emit(format!("add rsp, {cleanup}"));
        }

        if let Some(destination) = destination {
            self.store_operand(destination, X86FullRegister::Rax);
        }
    }

    /// Inline assembly is copied out line by line, untouched
    pub fn raw_asm(&mut self, text: &str) {
        for line in text.lines() {
            self.push_line(line);
        }
    }
}

/// Unsigned condition codes, matching the IR's unsigned comparisons
fn set_instruction(operator: BinaryOperatorKind) -> &'static str {
    match operator {
        BinaryOperatorKind::Equals => "sete",
        BinaryOperatorKind::NotEquals => "setne",
        BinaryOperatorKind::LessThan => "setb",
        BinaryOperatorKind::LessThanOrEqualTo => "setbe",
        BinaryOperatorKind::GreaterThan => "seta",
        BinaryOperatorKind::GreaterThanOrEqualTo => "setae",
        arithmetic => unreachable!("{arithmetic} is not a comparison"),
    }
}

/// General Purpose Register 64-bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum X86FullRegister {
    Rax,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    R8,
    R9,
}

impl X86FullRegister {
    pub fn as_32_bit(self) -> X86Register {
        match self {
            Self::Rax => X86Register::Eax,
            Self::Rcx => X86Register::Ecx,
            Self::Rdx => X86Register::Edx,
            Self::Rsi => X86Register::Esi,
            Self::Rdi => X86Register::Edi,
            Self::R8 => X86Register::R8d,
            Self::R9 => X86Register::R9d,
        }
    }

    pub fn as_8_bit(self) -> X86Register {
        match self {
            Self::Rax => X86Register::Al,
            Self::Rcx => X86Register::Cl,
            Self::Rdx => X86Register::Dl,
            Self::Rsi => X86Register::Sil,
            Self::Rdi => X86Register::Dil,
            Self::R8 => X86Register::R8b,
            Self::R9 => X86Register::R9b,
        }
    }
}

/// Partial width views of the general purpose registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[rustfmt::skip]
pub enum X86Register {
    // 32-bit
    Eax, Ecx, Edx, Esi, Edi, R8d, R9d,

    // 8-bit low
    Al, Cl, Dl, Sil, Dil, R8b, R9b,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(
        parameter_count: usize,
        temps: usize,
        convention: CallingConvention,
        emit: impl FnOnce(&mut Assembler),
    ) -> Vec<String> {
        let mut function = ir::Function::new(InternedSymbol::new("f"), parameter_count);
        for _ in 0..temps {
            function.create_temp();
        }

        let layout = FrameLayout::new(&function, convention);
        let mut assembler = Assembler::new(&function, &layout, Dialect::Nasm, convention);
        emit(&mut assembler);

        assembler
            .into_output()
            .lines()
            .map(|line| line.trim().to_owned())
            .collect()
    }

    fn temp(i: usize) -> Value {
        Value::Temp(ir::TempId::new(i))
    }

    #[test]
    fn register_names() {
        assert_eq!(X86FullRegister::R9.to_string(), "r9");
        assert_eq!(X86FullRegister::Rdx.as_32_bit().to_string(), "edx");
        assert_eq!(X86FullRegister::Rax.as_8_bit().to_string(), "al");
    }

    #[test]
    fn seven_argument_call_on_system_v() {
        let arguments: Vec<Value> = (1..=7).map(Value::Const).collect();

        let lines = assemble(0, 1, CallingConvention::SystemV, |asm| {
            asm.call(InternedSymbol::new("seven"), &arguments, Some(temp(0)));
        });

        assert_eq!(
            lines,
            vec![
                "sub rsp, 8",
                "mov rax, 7",
                "push rax",
                "mov rdi, 1",
                "mov rsi, 2",
                "mov rdx, 3",
                "mov rcx, 4",
                "mov r8, 5",
                "mov r9, 6",
                "call seven",
                "add rsp, 16",
                "mov [rbp - 8], rax",
            ]
        );
        assert_eq!(lines.iter().filter(|l| l.starts_with("push")).count(), 1);
    }

    #[test]
    fn eight_argument_call_needs_no_padding() {
        let arguments: Vec<Value> = (1..=8).map(Value::Const).collect();

        let lines = assemble(0, 0, CallingConvention::SystemV, |asm| {
            asm.call(InternedSymbol::new("eight"), &arguments, None);
        });

        assert_eq!(lines[0], "mov rax, 8");
        assert_eq!(lines[2], "mov rax, 7");
        assert!(lines.contains(&"add rsp, 16".to_owned()));
        assert!(!lines.contains(&"sub rsp, 8".to_owned()));
    }

    #[test]
    fn windows_calls_reserve_shadow_space() {
        let arguments: Vec<Value> = (1..=5).map(Value::Const).collect();

        let lines = assemble(0, 0, CallingConvention::Windows, |asm| {
            asm.call(InternedSymbol::new("five"), &arguments, None);
        });

        assert_eq!(
            lines,
            vec![
                "sub rsp, 8",
                "mov rax, 5",
                "push rax",
                "mov rcx, 1",
                "mov rdx, 2",
                "mov r8, 3",
                "mov r9, 4",
                "sub rsp, 32",
                "call five",
                "add rsp, 48",
            ]
        );
    }

    #[test]
    fn division_is_unsigned() {
        let lines = assemble(1, 1, CallingConvention::SystemV, |asm| {
            asm.binary_operation(
                BinaryOperatorKind::Divide,
                Value::Arg(ir::ArgId::new(0)),
                Value::Const(3),
                temp(0),
            );
        });

        assert_eq!(
            lines,
            vec![
                "mov rax, [rbp - 16]",
                "mov rcx, 3",
                "xor edx, edx",
                "div rcx",
                "mov [rbp - 8], rax",
            ]
        );
    }

    #[test]
    fn comparisons_produce_zero_or_one() {
        let lines = assemble(0, 2, CallingConvention::SystemV, |asm| {
            asm.binary_operation(BinaryOperatorKind::LessThan, temp(0), Value::Const(10), temp(1));
        });

        assert_eq!(
            lines,
            vec![
                "mov rax, [rbp - 8]",
                "cmp rax, 10",
                "setb al",
                "movzx eax, al",
                "mov [rbp - 16], rax",
            ]
        );
    }

    #[test]
    fn wide_immediates_go_through_rcx() {
        let lines = assemble(0, 2, CallingConvention::SystemV, |asm| {
            asm.binary_operation(BinaryOperatorKind::Add, temp(0), Value::Const(u64::MAX), temp(1));
        });

        assert_eq!(lines[1], format!("mov rcx, {}", u64::MAX));
        assert_eq!(lines[2], "add rax, rcx");
    }

    #[test]
    fn multiplication_by_an_immediate_uses_three_operands() {
        let lines = assemble(0, 2, CallingConvention::SystemV, |asm| {
            asm.binary_operation(BinaryOperatorKind::Multiply, temp(0), Value::Const(6), temp(1));
            asm.binary_operation(BinaryOperatorKind::Multiply, temp(0), temp(1), temp(1));
        });

        assert_eq!(lines[1], "imul rax, rax, 6");
        assert_eq!(lines[4], "imul rax, [rbp - 16]");
    }

    #[test]
    fn labels_and_returns_stay_inside_the_function() {
        let lines = assemble(0, 0, CallingConvention::SystemV, |asm| {
            asm.label(LabelId::new(2));
            asm.jump_if_zero(Value::Const(0), LabelId::new(2));
            asm.function_return(Some(Value::Const(1)));
        });

        assert_eq!(
            lines,
            vec![
                ".L_f_2:",
                "mov rax, 0",
                "test rax, rax",
                "jz .L_f_2",
                "mov rax, 1",
                "jmp .L_f_exit",
            ]
        );
    }

    #[test]
    fn empty_return_yields_zero() {
        let lines = assemble(0, 1, CallingConvention::SystemV, |asm| {
            asm.call(InternedSymbol::new("answer"), &[], Some(temp(0)));
            asm.function_return(None);
        });

        assert_eq!(
            lines,
            vec![
                "call answer",
                "mov [rbp - 8], rax",
                "xor eax, eax",
                "jmp .L_f_exit",
            ]
        );
    }

    #[test]
    fn inline_assembly_is_copied_verbatim() {
        let function = ir::Function::new(InternedSymbol::new("f"), 0);
        let layout = FrameLayout::new(&function, CallingConvention::SystemV);
        let mut assembler =
            Assembler::new(&function, &layout, Dialect::Nasm, CallingConvention::SystemV);

        assembler.raw_asm("spin:\n  pause ; wait\n\tjmp spin");

        assert_eq!(assembler.into_output(), "spin:\n  pause ; wait\n\tjmp spin\n");
    }

    #[test]
    fn string_addresses_per_dialect() {
        assert_eq!(
            Dialect::Nasm.string_address(StringId::new(3)),
            "[rel __str_3]"
        );
        assert_eq!(
            Dialect::GasIntel.string_address(StringId::new(0)),
            "[rip + __str_0]"
        );
    }

    #[test]
    #[should_panic(expected = "has no stack slot")]
    fn storing_into_a_constant_is_a_bug() {
        assemble(0, 0, CallingConvention::SystemV, |asm| {
            asm.store_operand(Value::Const(4), X86FullRegister::Rax);
        });
    }
}
