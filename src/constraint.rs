use std::fmt;

use log::debug;

use crate::arena::ExprArena;
use crate::comparator::Comparator;
use crate::error::{Error, Result};
use crate::eval::{Eval, Evaluator};
use crate::reference::ExprId;
use crate::types::{Domain, Value};

/// Default limit on the size of a constraint.
pub const DEFAULT_MAX_CONSTRAINT_SIZE: usize = 100_000;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ConstraintConfig {
    /// Constraints with more nodes than this are rejected.
    pub max_size: usize,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_CONSTRAINT_SIZE,
        }
    }
}

impl ConstraintConfig {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

/// A branch condition `left cmp right` over two expressions of one domain.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Constraint {
    left: ExprId,
    comparator: Comparator,
    right: ExprId,
    domain: Domain,
    size: usize,
}

impl Constraint {
    /// Builds a constraint, rejecting array operands, operands of different
    /// domains and constraints larger than `config.max_size`.
    pub fn new(
        arena: &ExprArena,
        left: ExprId,
        comparator: Comparator,
        right: ExprId,
        config: &ConstraintConfig,
    ) -> Result<Self> {
        let domain = arena.domain(left);
        if domain.is_array() {
            return Err(Error::domain_mismatch("a scalar domain", domain));
        }
        if arena.domain(right) != domain {
            return Err(Error::domain_mismatch(domain, arena.domain(right)));
        }
        let size = arena.size(left).saturating_add(arena.size(right)).saturating_add(1);
        if size > config.max_size {
            debug!("constraint of size {} rejected (max {})", size, config.max_size);
            return Err(Error::ConstructionRejected {
                size,
                max: config.max_size,
            });
        }
        Ok(Self {
            left,
            comparator,
            right,
            domain,
            size,
        })
    }

    pub fn left(&self) -> ExprId {
        self.left
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn right(&self) -> ExprId {
        self.right
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The constraint with the negated comparator.
    pub fn negate(&self) -> Self {
        Self {
            comparator: self.comparator.not(),
            ..*self
        }
    }

    /// The same condition with the operands swapped.
    pub fn swap(&self) -> Self {
        Self {
            left: self.right,
            right: self.left,
            comparator: self.comparator.swap(),
            ..*self
        }
    }

    /// A sound but incomplete satisfiability check: `false` means the constraint
    /// can never hold, `true` means nothing was proven.
    pub fn is_solvable(&self, arena: &ExprArena) -> bool {
        let strict = matches!(self.comparator, Comparator::Lt | Comparator::Gt | Comparator::Ne);
        // `x != x` holds for a NaN real, so only integers and strings are irreflexive.
        let reflexive_domain = self.domain != Domain::Real || self.comparator != Comparator::Ne;
        !(strict && reflexive_domain && arena.structurally_equal(self.left, self.right))
    }

    /// Whether the constraint holds for the given operand values.
    pub fn holds_for(&self, left: &Value, right: &Value) -> Result<bool> {
        let ordering = match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => Some(crate::semantics::compare_to(a, b).cmp(&0)),
            (a, b) => return Err(Error::domain_mismatch(a.domain(), b.domain())),
        };
        Ok(self.comparator.holds(ordering))
    }

    pub fn display<'a>(&self, arena: &'a ExprArena) -> ConstraintDisplay<'a> {
        ConstraintDisplay {
            arena,
            constraint: *self,
        }
    }
}

impl Eval for Constraint {
    type Output = bool;

    fn eval(&self, evaluator: &Evaluator) -> Result<bool> {
        let left = evaluator.evaluate(self.left)?;
        let right = evaluator.evaluate(self.right)?;
        self.holds_for(&left, &right)
    }
}

pub struct ConstraintDisplay<'a> {
    arena: &'a ExprArena,
    constraint: Constraint,
}

impl fmt::Display for ConstraintDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.arena.display(self.constraint.left),
            self.constraint.comparator,
            self.arena.display(self.constraint.right)
        )
    }
}
