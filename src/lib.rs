//! # symexpr-rs: Symbolic expressions and branch distances
//!
//! **`symexpr-rs`** records the symbolic form of the values computed by an
//! instrumented program run and turns each branch condition into a *distance*:
//! a non-negative number that is zero exactly when the condition holds and
//! shrinks as the inputs approach satisfying it. A search-based test generator
//! minimises these distances to steer inputs into uncovered branches.
//!
//! ## Key Features
//!
//! - **Arena-centric expressions**: every node lives in an [`ExprArena`][crate::arena::ExprArena] and is addressed by a lightweight [`ExprId`][crate::reference::ExprId] handle. Each node caches the concrete value observed when it was built.
//! - **Three domains**: 64-bit integers, IEEE-754 reals and character strings, with the operator catalogue of a standard library (arithmetic, bit operations, math functions, string queries and transformations, casts, readers and tokenizers).
//! - **Re-evaluation**: the [`Evaluator`][crate::eval::Evaluator] recomputes any tree under an [`Assignment`][crate::eval::Assignment] of new variable values, without recursion.
//! - **Branch distances**: the [`DistanceCalculator`][crate::distance::DistanceCalculator] recognises common idioms (character search, classification, end of input, tokenizing) and string predicates (equality, prefixes, regular expressions) before falling back to numeric distance.
//!
//! ## Basic Usage
//!
//! ```rust
//! use symexpr_rs::arena::ExprArena;
//! use symexpr_rs::comparator::Comparator;
//! use symexpr_rs::constraint::{Constraint, ConstraintConfig};
//! use symexpr_rs::distance::DistanceCalculator;
//! use symexpr_rs::eval::Assignment;
//! use symexpr_rs::operator::Operator;
//!
//! // 1. Record the expressions observed during a run: `x + 4 == 10` with x = 3
//! let mut arena = ExprArena::new();
//! let x = arena.mk_var("x", 3).unwrap();
//! let four = arena.mk_int(4);
//! let sum = arena.mk_binary(Operator::Plus, x, four).unwrap();
//! let ten = arena.mk_int(10);
//!
//! // 2. Build the branch condition
//! let c = Constraint::new(&arena, sum, Comparator::Eq, ten, &ConstraintConfig::default()).unwrap();
//!
//! // 3. Measure how far it is from holding
//! let calc = DistanceCalculator::new(&arena);
//! assert_eq!(calc.distance(&c), 3.0);
//!
//! // 4. Probe another input without rebuilding anything
//! let var = arena.get(x).var().unwrap();
//! let assignment = Assignment::new().with(var, 6);
//! assert_eq!(calc.distance_with(&c, &assignment), 0.0);
//! ```
//!
//! ## Core Components
//!
//! - **[`arena`]**: Node storage and the `mk_*` constructors.
//! - **[`eval`]**: Concrete evaluation with variable overrides.
//! - **[`constraint`]**: Branch conditions and their size limit.
//! - **[`distance`]**: The distance calculator, with [`idiom`], [`strdist`] and [`pattern`] as its helpers.
//! - **[`dot`]**: Visualising expression trees using Graphviz.

pub mod arena;
pub mod comparator;
pub mod constraint;
pub mod distance;
pub mod dot;
pub mod error;
pub mod eval;
pub mod idiom;
pub mod node;
pub mod operator;
pub mod pattern;
pub mod reference;
pub mod semantics;
pub mod strdist;
pub mod types;
