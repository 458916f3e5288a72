//! Branch distance: how far a failing constraint is from holding.
//!
//! The distance is 0 exactly when the constraint holds under the concrete
//! values and positive otherwise, so a search minimising it moves inputs
//! towards taking the branch.

use log::{debug, error};

use crate::arena::ExprArena;
use crate::comparator::Comparator;
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::eval::{Assignment, Evaluator};
use crate::idiom::{self, IdiomContext};
use crate::node::ExprKind;
use crate::operator::Operator;
use crate::pattern::PatternCache;
use crate::reference::ExprId;
use crate::strdist::{self, Normalizer, DEFAULT_NORMALIZER};
use crate::types::Value;

/// Distance of a constraint that cannot be brought closer to holding.
pub const MAX_DISTANCE: f64 = f64::MAX;

/// Tunables of a [`DistanceCalculator`].
#[derive(Debug, Copy, Clone)]
pub struct DistanceConfig {
    /// Maps character gaps into `[0, 1)`.
    pub normalizer: Normalizer,
    /// Returned when evaluation fails or no gradient exists.
    pub max_distance: f64,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            normalizer: DEFAULT_NORMALIZER,
            max_distance: MAX_DISTANCE,
        }
    }
}

impl DistanceConfig {
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = max_distance;
        self
    }
}

/// Computes branch distances over constraints of one arena.
///
/// Compiled regular expressions are cached per calculator, so a calculator
/// should be kept for the whole fitness evaluation of a run.
pub struct DistanceCalculator<'a> {
    arena: &'a ExprArena,
    assignment: Option<&'a Assignment>,
    config: DistanceConfig,
    patterns: PatternCache,
}

impl<'a> DistanceCalculator<'a> {
    /// Calculator over the observed values, with the default configuration.
    pub fn new(arena: &'a ExprArena) -> Self {
        Self {
            arena,
            assignment: None,
            config: DistanceConfig::default(),
            patterns: PatternCache::new(),
        }
    }

    /// Calculator that evaluates variables under `assignment`.
    pub fn with_assignment(arena: &'a ExprArena, assignment: &'a Assignment) -> Self {
        Self {
            assignment: Some(assignment),
            ..Self::new(arena)
        }
    }

    pub fn with_config(mut self, config: DistanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DistanceConfig {
        &self.config
    }

    /// Patterns compiled so far.
    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    /// Distance of `constraint` from holding.
    ///
    /// Evaluation failures are logged and yield the configured maximum.
    pub fn distance(&self, constraint: &Constraint) -> f64 {
        self.or_max(self.try_distance(constraint))
    }

    /// Distance of `constraint` under a different assignment, reusing the
    /// compiled patterns of this calculator.
    pub fn distance_with(&self, constraint: &Constraint, assignment: &Assignment) -> f64 {
        let evaluator = Evaluator::with_assignment(self.arena, assignment);
        self.or_max(self.compute(constraint, &evaluator))
    }

    /// Like [`distance`][Self::distance], but surfaces evaluation failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use symexpr_rs::arena::ExprArena;
    /// use symexpr_rs::comparator::Comparator;
    /// use symexpr_rs::constraint::{Constraint, ConstraintConfig};
    /// use symexpr_rs::distance::{DistanceCalculator, MAX_DISTANCE};
    /// use symexpr_rs::error::Error;
    /// use symexpr_rs::eval::Assignment;
    /// use symexpr_rs::operator::Operator;
    ///
    /// let mut arena = ExprArena::new();
    /// let x = arena.mk_var("x", 4).unwrap();
    /// let two = arena.mk_int(2);
    /// let q = arena.mk_binary(Operator::Div, two, x).unwrap();
    /// let one = arena.mk_int(1);
    /// let c = Constraint::new(&arena, q, Comparator::Eq, one, &ConstraintConfig::default()).unwrap();
    /// assert_eq!(DistanceCalculator::new(&arena).try_distance(&c), Ok(1.0));
    ///
    /// let var = arena.get(x).var().unwrap();
    /// let zero = Assignment::new().with(var, 0);
    /// let calc = DistanceCalculator::with_assignment(&arena, &zero);
    /// assert_eq!(calc.try_distance(&c), Err(Error::DivisionByZero));
    /// assert_eq!(calc.distance(&c), MAX_DISTANCE);
    /// ```
    pub fn try_distance(&self, constraint: &Constraint) -> Result<f64> {
        let evaluator = match self.assignment {
            Some(assignment) => Evaluator::with_assignment(self.arena, assignment),
            None => Evaluator::new(self.arena),
        };
        self.compute(constraint, &evaluator)
    }

    fn or_max(&self, distance: Result<f64>) -> f64 {
        match distance {
            Ok(distance) => distance,
            Err(e @ Error::UnknownOperator { .. }) => {
                error!("distance: {}", e);
                self.config.max_distance
            }
            Err(e) => {
                debug!("distance: evaluation failed: {}", e);
                self.config.max_distance
            }
        }
    }

    fn compute(&self, constraint: &Constraint, evaluator: &Evaluator) -> Result<f64> {
        debug!("distance({})", constraint.display(self.arena));
        let left = evaluator.evaluate(constraint.left())?;
        let right = evaluator.evaluate(constraint.right())?;
        if constraint.holds_for(&left, &right)? {
            return Ok(0.0);
        }

        let ctx = IdiomContext {
            arena: self.arena,
            evaluator,
            constraint,
            max_distance: self.config.max_distance,
        };
        if let Some((_, distance)) = idiom::recognize(&ctx) {
            return Ok(distance);
        }

        if let Some(distance) = self.string_predicate(constraint, evaluator)? {
            if distance > 0.0 {
                debug!("string predicate => {}", distance);
                return Ok(distance);
            }
        }

        let distance = match (&left, &right) {
            (Value::Str(a), Value::Str(b)) => self.string_comparison(constraint.comparator(), a, b),
            _ => self.numeric(constraint.comparator(), &left, &right)?,
        };
        Ok(distance)
    }

    /// Distance for `pred(...) == 0/1` and `pred(...) != 0/1` over a string
    /// predicate, or `None` if the constraint has another shape.
    fn string_predicate(&self, constraint: &Constraint, evaluator: &Evaluator) -> Result<Option<f64>> {
        let right = self.arena.get(constraint.right());
        let expected = match (&right.kind, &right.value) {
            (ExprKind::Constant, Value::Integer(v @ (0 | 1))) => *v == 1,
            _ => return Ok(None),
        };
        let must_hold = match constraint.comparator() {
            Comparator::Eq => expected,
            Comparator::Ne => !expected,
            _ => return Ok(None),
        };

        let left = self.arena.get(constraint.left());
        let (op, args): (Operator, Vec<ExprId>) = match &left.kind {
            ExprKind::Binary { op, left, right } => (*op, vec![*left, *right]),
            ExprKind::Multi {
                op,
                left,
                right,
                others,
            } => {
                let mut args = vec![*left, *right];
                args.extend(others);
                (*op, args)
            }
            _ => return Ok(None),
        };
        if !op.is_string_predicate() {
            return Ok(None);
        }
        if !must_hold {
            // Nothing measures how close a true predicate is to failing.
            return Ok(Some(self.config.max_distance));
        }

        let values = args
            .iter()
            .map(|&id| evaluator.evaluate(id))
            .collect::<Result<Vec<_>>>()?;
        let n = self.config.normalizer;
        let distance = match (op, values.as_slice()) {
            (Operator::Equals, [Value::Str(a), Value::Str(b)]) => strdist::equals(a, b, n),
            (Operator::EqualsIgnoreCase, [Value::Str(a), Value::Str(b)]) => strdist::equals_ignore_case(a, b, n),
            (Operator::StartsWith, [Value::Str(a), Value::Str(b)]) => match strdist::starts_with(a, b, 0, n) {
                Some(distance) => distance,
                None => return Ok(None),
            },
            (Operator::StartsWith, [Value::Str(a), Value::Str(b), Value::Integer(offset)]) => {
                match strdist::starts_with(a, b, *offset, n) {
                    Some(distance) => distance,
                    None => return Ok(None),
                }
            }
            (Operator::EndsWith, [Value::Str(a), Value::Str(b)]) => strdist::ends_with(a, b, n),
            (Operator::Contains, [Value::Str(a), Value::Str(b)]) => strdist::contains(a, b, n),
            (Operator::Matches, [Value::Str(pattern), Value::Str(s)]) => self.patterns.get(pattern).distance(s, n)?,
            (
                Operator::RegionMatches,
                [
                    Value::Str(a),
                    Value::Str(b),
                    Value::Integer(a_start),
                    Value::Integer(b_start),
                    Value::Integer(len),
                    Value::Integer(ignore_case),
                ],
            ) => strdist::region_matches(a, *a_start, b, *b_start, *len, *ignore_case != 0, n),
            _ => {
                return Err(Error::unknown_operator(
                    op,
                    &values.iter().map(Value::domain).collect::<Vec<_>>(),
                ))
            }
        };
        Ok(Some(distance))
    }

    fn string_comparison(&self, comparator: Comparator, a: &str, b: &str) -> f64 {
        let distance = match comparator {
            Comparator::Eq => strdist::equals(a, b, self.config.normalizer),
            Comparator::Ne => 1.0,
            _ => numeric_formula(comparator, crate::semantics::compare_to(a, b) as f64),
        };
        debug!("string comparison {} => {}", comparator, distance);
        distance
    }

    fn numeric(&self, comparator: Comparator, left: &Value, right: &Value) -> Result<f64> {
        let d = match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => (*a as i128 - *b as i128) as f64,
            (Value::Real(a), Value::Real(b)) => a - b,
            (a, b) => return Err(Error::domain_mismatch(a.domain(), b.domain())),
        };
        let distance = numeric_formula(comparator, d);
        debug!("numeric {} with d = {} => {}", comparator, d, distance);
        if distance.is_nan() {
            return Ok(self.config.max_distance);
        }
        Ok(distance)
    }
}

/// Distance of a failing `left cmp right`, given `d = left - right`.
fn numeric_formula(comparator: Comparator, d: f64) -> f64 {
    match comparator {
        Comparator::Eq => d.abs(),
        Comparator::Ne => 1.0,
        Comparator::Lt => d + 1.0,
        Comparator::Le => d,
        Comparator::Gt => d.abs() + 1.0,
        Comparator::Ge => d.abs(),
    }
}
