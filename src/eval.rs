//! Re-evaluation of captured expressions under new inputs.

use std::collections::HashMap;

use log::debug;

use crate::arena::ExprArena;
use crate::error::{Error, Result};
use crate::node::ExprKind;
use crate::reference::ExprId;
use crate::semantics;
use crate::types::{Domain, Value, VarId};

/// Substitute values for symbolic inputs.
///
/// A local search probes candidate inputs by evaluating the captured trees
/// under an assignment instead of rebuilding them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Assignment {
    values: HashMap<VarId, Value>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`][Self::set].
    pub fn with(mut self, var: VarId, value: impl Into<Value>) -> Self {
        self.set(var, value);
        self
    }

    /// Sets the value of `var`, returning the previous one.
    pub fn set(&mut self, var: VarId, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(var, value.into())
    }

    pub fn get(&self, var: VarId) -> Option<&Value> {
        self.values.get(&var)
    }

    pub fn remove(&mut self, var: VarId) -> Option<Value> {
        self.values.remove(&var)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Value)> {
        self.values.iter().map(|(&var, value)| (var, value))
    }
}

impl FromIterator<(VarId, Value)> for Assignment {
    fn from_iter<T: IntoIterator<Item = (VarId, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Concrete evaluator over every node kind.
///
/// Evaluation is iterative, so deep trees do not grow the call stack. Subtrees
/// without variables keep their cached values unless
/// [`without_cache`][Self::without_cache] is set.
pub struct Evaluator<'a> {
    arena: &'a ExprArena,
    assignment: Option<&'a Assignment>,
    reuse_cached: bool,
}

impl<'a> Evaluator<'a> {
    /// Evaluator reproducing the observed values.
    pub fn new(arena: &'a ExprArena) -> Self {
        Self {
            arena,
            assignment: None,
            reuse_cached: true,
        }
    }

    /// Evaluator taking variable values from `assignment`, falling back to the
    /// observed value for variables it does not mention.
    pub fn with_assignment(arena: &'a ExprArena, assignment: &'a Assignment) -> Self {
        Self {
            arena,
            assignment: Some(assignment),
            reuse_cached: true,
        }
    }

    /// Re-evaluates every node instead of taking the cached value of subtrees
    /// without variables.
    pub fn without_cache(mut self) -> Self {
        self.reuse_cached = false;
        self
    }

    pub fn arena(&self) -> &'a ExprArena {
        self.arena
    }

    fn is_fixed(&self, id: ExprId) -> bool {
        self.reuse_cached && !self.arena.contains_symbolic(id)
    }

    /// Evaluates `root` under the assignment.
    ///
    /// Fails with the first error an operation raises, or with
    /// [`Error::DomainMismatch`] if an assigned value has the wrong domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use symexpr_rs::arena::ExprArena;
    /// use symexpr_rs::eval::{Assignment, Evaluator};
    /// use symexpr_rs::operator::Operator;
    /// use symexpr_rs::types::Value;
    ///
    /// let mut arena = ExprArena::new();
    /// let s = arena.mk_var("s", "abc").unwrap();
    /// let len = arena.mk_unary(Operator::Length, s).unwrap();
    ///
    /// let var = arena.get(s).var().unwrap();
    /// let assignment = Assignment::new().with(var, "hello");
    /// let evaluator = Evaluator::with_assignment(&arena, &assignment);
    /// assert_eq!(evaluator.evaluate(len), Ok(Value::Integer(5)));
    /// assert_eq!(Evaluator::new(&arena).evaluate(len), Ok(Value::Integer(3)));
    /// ```
    pub fn evaluate(&self, root: ExprId) -> Result<Value> {
        // Children always precede their parents in the arena, so evaluating the
        // reachable nodes in id order visits every operand before its user.
        let mut order = Vec::new();
        let mut stack = vec![root];
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if !self.is_fixed(id) {
                stack.extend(self.arena.get(id).kind.children());
            }
        }
        order.sort_unstable();

        let mut values: HashMap<ExprId, Value> = HashMap::with_capacity(order.len());
        for id in order {
            let node = self.arena.get(id);
            let value = if self.is_fixed(id) {
                node.value.clone()
            } else {
                match &node.kind {
                    ExprKind::Constant => node.value.clone(),
                    ExprKind::Variable(var) => self.variable_value(*var, &node.value)?,
                    kind => compute(self.arena, kind, node.domain, |c| values[&c].clone())?,
                }
            };
            values.insert(id, value);
        }
        let value = values.remove(&root).unwrap_or_else(|| self.arena.value(root).clone());
        debug!("evaluate({}) = {}", root, value);
        Ok(value)
    }

    fn variable_value(&self, var: VarId, observed: &Value) -> Result<Value> {
        match self.assignment.and_then(|a| a.get(var)) {
            Some(value) if value.domain() != observed.domain() => {
                Err(Error::domain_mismatch(observed.domain(), value.domain()))
            }
            Some(value) => Ok(value.clone()),
            None => Ok(observed.clone()),
        }
    }

    /// [`evaluate`][Self::evaluate], expecting an integer.
    pub fn evaluate_int(&self, id: ExprId) -> Result<i64> {
        self.evaluate(id)?.as_int()
    }

    pub fn evaluate_real(&self, id: ExprId) -> Result<f64> {
        self.evaluate(id)?.as_real()
    }

    pub fn evaluate_str(&self, id: ExprId) -> Result<String> {
        match self.evaluate(id)? {
            Value::Str(s) => Ok(s),
            other => Err(Error::domain_mismatch(Domain::String, other.domain())),
        }
    }
}

/// Anything that can be evaluated to a concrete outcome.
pub trait Eval {
    type Output;

    fn eval(&self, evaluator: &Evaluator) -> Result<Self::Output>;
}

impl Eval for ExprId {
    type Output = Value;

    fn eval(&self, evaluator: &Evaluator) -> Result<Value> {
        evaluator.evaluate(*self)
    }
}

/// Value of a composite node, given the values of the nodes it refers to.
///
/// `value_of` must be defined for every child of `kind` and, for tokenizer
/// operations, for the delimiters of the tokenizer chain.
pub(crate) fn compute<F>(arena: &ExprArena, kind: &ExprKind, domain: Domain, value_of: F) -> Result<Value>
where
    F: Fn(ExprId) -> Value,
{
    let value = match kind {
        ExprKind::Constant | ExprKind::Variable(_) => {
            return Err(Error::domain_mismatch("a composite expression", "a leaf"));
        }
        ExprKind::Unary { op, operand } => semantics::apply(*op, &[value_of(*operand)])?,
        ExprKind::Binary { op, left, right } => semantics::apply(*op, &[value_of(*left), value_of(*right)])?,
        ExprKind::Multi {
            op,
            left,
            right,
            others,
        } => {
            let mut args = Vec::with_capacity(2 + others.len());
            args.push(value_of(*left));
            args.push(value_of(*right));
            args.extend(others.iter().map(|&c| value_of(c)));
            semantics::apply(*op, &args)?
        }
        ExprKind::Cast { arg } => semantics::cast(&value_of(*arg), domain)?,
        ExprKind::StringReader { string, position } => {
            Value::Integer(semantics::read_at(value_of(*string).as_str()?, *position))
        }
        ExprKind::NewTokenizer { string, .. } => value_of(*string).expect_domain(Domain::String)?,
        ExprKind::NextTokenizer { tokenizer }
        | ExprKind::HasMoreTokens { tokenizer }
        | ExprKind::NextToken { tokenizer } => {
            let origin = arena
                .tokenizer_origin(*tokenizer)
                .ok_or_else(|| Error::domain_mismatch("a tokenizer", arena.domain(*tokenizer)))?;
            let remaining = value_of(*tokenizer);
            let remaining = remaining.as_str()?;
            let delimiters = value_of(origin.delimiters);
            let delimiters = delimiters.as_str()?;
            match kind {
                ExprKind::HasMoreTokens { .. } => Value::bool(semantics::has_more_tokens(remaining, delimiters)),
                ExprKind::NextToken { .. } => Value::from(semantics::next_token(remaining, delimiters)?.0),
                _ => Value::from(semantics::next_token(remaining, delimiters)?.1),
            }
        }
    };
    value.expect_domain(domain)
}
