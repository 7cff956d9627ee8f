//! Machine independent IR optimizations. Three passes run in a fixed order
//! until none of them changes anything, or until the iteration cap is hit.
//!
//! 1. Constant folding (`constant_folding`)
//! 2. Algebraic simplification (`algebraic`)
//! 3. Dead code elimination (`dead_code`)
//!
//! Each pass works on one function at a time and reports whether it changed
//! the function.

use tracing::{debug, warn};

use crate::middle::ir;

mod algebraic;
mod constant_folding;
mod dead_code;

pub use algebraic::simplify_algebraic_identities;
pub use constant_folding::fold_constants;
pub use dead_code::eliminate_dead_code;

/// Upper bound on optimizer iterations. Every iteration either shrinks the
/// program or replaces an operand with a constant, so real programs settle
/// long before this.
pub const MAX_OPTIMIZATION_ITERATIONS: usize = 64;

/// Which passes changed something during one iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassChanges {
    pub constant_folding: bool,
    pub algebraic_simplification: bool,
    pub dead_code_elimination: bool,
}

impl PassChanges {
    pub fn any(self) -> bool {
        self.constant_folding || self.algebraic_simplification || self.dead_code_elimination
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationReport {
    /// Iterations run, including the final one that changed nothing
    pub iterations: usize,
    pub reached_fixpoint: bool,
}

/// Optimizes every function of the module in place
pub fn optimize(module: &mut ir::Module) -> OptimizationReport {
    for iteration in 1..=MAX_OPTIMIZATION_ITERATIONS {
        let changes = run_passes_once(module);

        debug!(iteration, ?changes, "optimizer iteration");

        if !changes.any() {
            return OptimizationReport {
                iterations: iteration,
                reached_fixpoint: true,
            };
        }
    }

    warn!(
        cap = MAX_OPTIMIZATION_ITERATIONS,
        "optimizer stopped at the iteration cap before reaching a fixpoint"
    );

    OptimizationReport {
        iterations: MAX_OPTIMIZATION_ITERATIONS,
        reached_fixpoint: false,
    }
}

/// Runs each pass exactly once over every function
pub fn run_passes_once(module: &mut ir::Module) -> PassChanges {
    let mut changes = PassChanges::default();

    for function in &mut module.functions {
        changes.constant_folding |= fold_constants(function);
        changes.algebraic_simplification |= simplify_algebraic_identities(function);
        changes.dead_code_elimination |= eliminate_dead_code(function);
    }

    changes
}
