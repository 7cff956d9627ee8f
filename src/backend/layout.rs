use crate::{
    backend::assemblers::x86_64::CallingConvention,
    index::Index,
    middle::ir::{self, ArgId, TempId},
};

/// Every value the generated code keeps in memory is one 64-bit slot
pub const SLOT_SIZE: usize = 8;
pub const STACK_ALIGNMENT: usize = 16;

pub fn align_to(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

/// Location of a value relative to the frame base pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSlot {
    /// Inside this function's frame
    BelowBase(usize),
    /// In the caller's frame, where stack passed arguments live
    AboveBase(usize),
}

impl core::fmt::Display for FrameSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameSlot::BelowBase(offset) => write!(f, "[rbp - {offset}]"),
            FrameSlot::AboveBase(offset) => write!(f, "[rbp + {offset}]"),
        }
    }
}

/// Stack frame of one function.
///
/// ```text
/// [rbp + 16 + shadow + 8*k]   stack passed argument k
/// [rbp + 8]                   return address
/// [rbp]                       saved rbp
/// [rbp - 8*(t+1)]             temp t
/// [rbp - 8*(temps+i+1)]       register passed argument i, spilled
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    temp_count: usize,
    parameter_count: usize,
    register_parameter_count: usize,
    stack_arguments_offset: usize,
}

impl FrameLayout {
    pub fn new(function: &ir::Function, convention: CallingConvention) -> Self {
        Self::with_counts(function.max_temps(), function.parameter_count, convention)
    }

    pub fn with_counts(
        temp_count: usize,
        parameter_count: usize,
        convention: CallingConvention,
    ) -> Self {
        Self {
            temp_count,
            parameter_count,
            register_parameter_count: parameter_count
                .min(convention.argument_registers().len()),
            stack_arguments_offset: convention.stack_arguments_offset(),
        }
    }

    /// Bytes reserved below `rbp`, kept a multiple of 16 so `rsp` stays
    /// aligned at every call site
    pub fn size(&self) -> usize {
        align_to(
            (self.temp_count + self.register_parameter_count) * SLOT_SIZE,
            STACK_ALIGNMENT,
        )
    }

    pub fn register_parameter_count(&self) -> usize {
        self.register_parameter_count
    }

    #[track_caller]
    pub fn temp(&self, temp: TempId) -> FrameSlot {
        assert!(
            temp.index() < self.temp_count,
            "temp %{} outside of a frame with {} temps",
            temp.index(),
            self.temp_count
        );

        FrameSlot::BelowBase((temp.index() + 1) * SLOT_SIZE)
    }

    #[track_caller]
    pub fn argument(&self, arg: ArgId) -> FrameSlot {
        let i = arg.index();

        assert!(
            i < self.parameter_count,
            "argument {i} outside of a function with {} parameters",
            self.parameter_count
        );

        if i < self.register_parameter_count {
            FrameSlot::BelowBase((self.temp_count + i + 1) * SLOT_SIZE)
        } else {
            FrameSlot::AboveBase(
                self.stack_arguments_offset + (i - self.register_parameter_count) * SLOT_SIZE,
            )
        }
    }

    /// Slot of an assignable value. Anything else has no home in memory.
    #[track_caller]
    pub fn slot(&self, value: ir::Value) -> FrameSlot {
        match value {
            ir::Value::Temp(temp) => self.temp(temp),
            ir::Value::Arg(arg) => self.argument(arg),
            other => panic!("{other:?} has no stack slot"),
        }
    }
}
