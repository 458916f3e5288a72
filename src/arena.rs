//! Expression storage.
//!
//! All expressions captured during one traced run live in a single
//! [`ExprArena`] and are addressed by [`ExprId`]. Nodes are appended in
//! construction order (children before parents), never removed and never
//! mutated after construction, except for the `parent` back reference, which is
//! written once, when a node is first adopted.
//!
//! Every constructor validates the operand domains against the operator
//! catalogue and computes the concrete value of the new node from the cached
//! values of its children.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;

use log::debug;

use crate::error::{Error, Result};
use crate::eval::compute;
use crate::node::{ExprKind, Node};
use crate::operator::Operator;
use crate::reference::ExprId;
use crate::semantics;
use crate::types::{Domain, Value, VarId};

/// Where a tokenizer chain starts, and how many tokens it has consumed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TokenizerOrigin {
    pub string: ExprId,
    pub delimiters: ExprId,
    pub consumed: usize,
}

/// Append-only store of expression nodes.
///
/// The arena holds no interior mutability, so a finished arena can be shared
/// between threads by reference.
#[derive(Debug, Default, Clone)]
pub struct ExprArena {
    /// Topologically sorted nodes, by construction.
    nodes: Vec<Node>,
    var_names: Vec<String>,
    var_nodes: Vec<ExprId>,
    var_by_name: HashMap<String, VarId>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node behind `id`.
    ///
    /// Panics if `id` does not belong to this arena.
    pub fn get(&self, id: ExprId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Concrete value observed when the node was built.
    pub fn value(&self, id: ExprId) -> &Value {
        &self.get(id).value
    }

    pub fn domain(&self, id: ExprId) -> Domain {
        self.get(id).domain
    }

    /// Number of nodes in the subtree, counting shared children once per reference.
    pub fn size(&self, id: ExprId) -> usize {
        self.get(id).size
    }

    /// The first node that adopted `id` as a child.
    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        self.get(id).parent
    }

    /// Whether some variable occurs in the subtree.
    pub fn contains_symbolic(&self, id: ExprId) -> bool {
        self.get(id).symbolic
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.var_names[var.id() as usize]
    }

    /// The node standing for the variable.
    pub fn var_node(&self, var: VarId) -> ExprId {
        self.var_nodes[var.id() as usize]
    }

    pub fn var_by_name(&self, name: &str) -> Option<VarId> {
        self.var_by_name.get(name).copied()
    }

    /// All variables, in registration order.
    pub fn all_variables(&self) -> impl Iterator<Item = VarId> + '_ {
        (0..self.var_names.len() as u32).map(VarId::new)
    }

    fn push(&mut self, domain: Domain, kind: ExprKind, value: Value) -> ExprId {
        let id = ExprId::new(self.nodes.len() as u32);
        let children = kind.children();
        let size = children
            .iter()
            .fold(1usize, |acc, &c| acc.saturating_add(self.size(c)));
        let symbolic = matches!(kind, ExprKind::Variable(_)) || children.iter().any(|&c| self.contains_symbolic(c));
        for &c in &children {
            let child = &mut self.nodes[c.index()];
            if child.parent.is_none() {
                child.parent = Some(id);
            }
        }
        self.nodes.push(Node {
            domain,
            kind,
            value,
            size,
            symbolic,
            parent: None,
        });
        id
    }

    /// Computes the value of a composite node from the cached values of its children.
    fn build(&mut self, domain: Domain, kind: ExprKind) -> Result<ExprId> {
        let value = compute(self, &kind, domain, |c| self.value(c).clone())?;
        Ok(self.push(domain, kind, value))
    }
}

// ─── Leaves ────────────────────────────────────────────────────────────────────

impl ExprArena {
    /// Literal of any domain, arrays included.
    pub fn mk_const(&mut self, value: impl Into<Value>) -> ExprId {
        let value = value.into();
        self.push(value.domain(), ExprKind::Constant, value)
    }

    pub fn mk_int(&mut self, value: i64) -> ExprId {
        self.mk_const(value)
    }

    pub fn mk_real(&mut self, value: f64) -> ExprId {
        self.mk_const(value)
    }

    pub fn mk_str(&mut self, value: &str) -> ExprId {
        self.mk_const(value)
    }

    /// Integer `1` or `0`.
    pub fn mk_bool(&mut self, value: bool) -> ExprId {
        self.mk_const(Value::bool(value))
    }

    /// Registers the symbolic input `name`, observed with the concrete `value`.
    ///
    /// Repeated references to the same input return the same node. Re-registering
    /// a name with a value of another domain, or with another value, fails.
    pub fn mk_var(&mut self, name: &str, value: impl Into<Value>) -> Result<ExprId> {
        let value = value.into();
        if let Some(var) = self.var_by_name(name) {
            let id = self.var_node(var);
            let existing = self.value(id);
            if existing.domain() != value.domain() {
                return Err(Error::domain_mismatch(existing.domain(), value.domain()));
            }
            if *existing != value {
                return Err(Error::ConflictingVariable { name: name.to_string() });
            }
            return Ok(id);
        }

        let var = VarId::new(self.var_names.len() as u32);
        debug!("mk_var(name = {}, value = {}) => {}", name, value, var);
        let id = self.push(value.domain(), ExprKind::Variable(var), value);
        self.var_names.push(name.to_string());
        self.var_nodes.push(id);
        self.var_by_name.insert(name.to_string(), var);
        Ok(id)
    }
}

// ─── Operators ─────────────────────────────────────────────────────────────────

impl ExprArena {
    /// Builds `op(operand)`.
    ///
    /// Fails if the operator has no unary signature for the operand domain, or
    /// if the operation could not have executed on the observed value.
    pub fn mk_unary(&mut self, op: Operator, operand: ExprId) -> Result<ExprId> {
        let domain = op.result_domain(&[self.domain(operand)])?;
        self.build(domain, ExprKind::Unary { op, operand })
    }

    /// Builds `op(left, right)` and computes its value.
    ///
    /// # Examples
    ///
    /// ```
    /// use symexpr_rs::arena::ExprArena;
    /// use symexpr_rs::error::Error;
    /// use symexpr_rs::operator::Operator;
    /// use symexpr_rs::types::Value;
    ///
    /// let mut arena = ExprArena::new();
    /// let x = arena.mk_var("x", 6).unwrap();
    /// let seven = arena.mk_int(7);
    /// let prod = arena.mk_binary(Operator::Mul, x, seven).unwrap();
    /// assert_eq!(arena.value(prod), &Value::Integer(42));
    ///
    /// let zero = arena.mk_int(0);
    /// assert_eq!(arena.mk_binary(Operator::Div, x, zero), Err(Error::DivisionByZero));
    /// ```
    pub fn mk_binary(&mut self, op: Operator, left: ExprId, right: ExprId) -> Result<ExprId> {
        let domain = op.result_domain(&[self.domain(left), self.domain(right)])?;
        self.build(domain, ExprKind::Binary { op, left, right })
    }

    /// Builds `op(left, right, others...)`. Without auxiliary operands this is
    /// [`mk_binary`][Self::mk_binary].
    pub fn mk_multi(&mut self, op: Operator, left: ExprId, right: ExprId, others: &[ExprId]) -> Result<ExprId> {
        if others.is_empty() {
            return self.mk_binary(op, left, right);
        }
        let domains: Vec<Domain> = [left, right]
            .iter()
            .chain(others)
            .map(|&c| self.domain(c))
            .collect();
        let domain = op.result_domain(&domains)?;
        self.build(
            domain,
            ExprKind::Multi {
                op,
                left,
                right,
                others: others.to_vec(),
            },
        )
    }

    /// Converts `arg` into the `target` domain.
    pub fn mk_cast(&mut self, arg: ExprId, target: Domain) -> Result<ExprId> {
        let from = self.domain(arg);
        if !semantics::is_valid_cast(from, target) {
            return Err(Error::domain_mismatch(format!("a domain castable to {}", target), from));
        }
        self.build(target, ExprKind::Cast { arg })
    }
}

// ─── Sequential reads ──────────────────────────────────────────────────────────

impl ExprArena {
    /// The code point a character stream over `string` yields at `position`.
    pub fn mk_string_reader(&mut self, string: ExprId, position: usize) -> Result<ExprId> {
        self.expect_domain(string, Domain::String)?;
        self.build(Domain::Integer, ExprKind::StringReader { string, position })
    }

    /// A tokenizer splitting `string` on any character of `delimiters`.
    pub fn mk_tokenizer(&mut self, string: ExprId, delimiters: ExprId) -> Result<ExprId> {
        self.expect_domain(string, Domain::String)?;
        self.expect_domain(delimiters, Domain::String)?;
        self.build(Domain::String, ExprKind::NewTokenizer { string, delimiters })
    }

    /// The tokenizer after taking one more token.
    pub fn mk_next_tokenizer(&mut self, tokenizer: ExprId) -> Result<ExprId> {
        self.expect_tokenizer(tokenizer)?;
        self.build(Domain::String, ExprKind::NextTokenizer { tokenizer })
    }

    /// Integer `1` if the tokenizer has a token left.
    pub fn mk_has_more_tokens(&mut self, tokenizer: ExprId) -> Result<ExprId> {
        self.expect_tokenizer(tokenizer)?;
        self.build(Domain::Integer, ExprKind::HasMoreTokens { tokenizer })
    }

    /// The token the tokenizer yields next.
    pub fn mk_next_token(&mut self, tokenizer: ExprId) -> Result<ExprId> {
        self.expect_tokenizer(tokenizer)?;
        self.build(Domain::String, ExprKind::NextToken { tokenizer })
    }

    fn expect_domain(&self, id: ExprId, domain: Domain) -> Result<()> {
        let found = self.domain(id);
        if found != domain {
            return Err(Error::domain_mismatch(domain, found));
        }
        Ok(())
    }

    fn expect_tokenizer(&self, id: ExprId) -> Result<()> {
        if self.tokenizer_origin(id).is_none() {
            return Err(Error::domain_mismatch("a tokenizer", self.domain(id)));
        }
        Ok(())
    }

    /// Follows a tokenizer chain back to the tokenizer that started it.
    ///
    /// Returns `None` if `id` is not a tokenizer.
    pub fn tokenizer_origin(&self, id: ExprId) -> Option<TokenizerOrigin> {
        let mut consumed = 0;
        let mut current = id;
        loop {
            match self.get(current).kind {
                ExprKind::NewTokenizer { string, delimiters } => {
                    return Some(TokenizerOrigin {
                        string,
                        delimiters,
                        consumed,
                    })
                }
                ExprKind::NextTokenizer { tokenizer } => {
                    consumed += 1;
                    current = tokenizer;
                }
                _ => return None,
            }
        }
    }
}

// ─── Queries ───────────────────────────────────────────────────────────────────

impl ExprArena {
    /// Ids of all nodes reachable from `root`, each once.
    pub fn descendants(&self, root: ExprId) -> Vec<ExprId> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            result.push(id);
            stack.extend(self.get(id).kind.children());
        }
        result
    }

    /// All variables occurring in the expression.
    pub fn variables(&self, root: ExprId) -> BTreeSet<VarId> {
        if !self.contains_symbolic(root) {
            return BTreeSet::new();
        }
        self.descendants(root)
            .into_iter()
            .filter_map(|id| self.get(id).var())
            .collect()
    }

    /// All literal values occurring in the expression.
    pub fn constants(&self, root: ExprId) -> HashSet<Value> {
        self.descendants(root)
            .into_iter()
            .filter(|&id| self.get(id).is_constant())
            .map(|id| self.value(id).clone())
            .collect()
    }

    /// Whether two expressions have the same shape, operators, literals and variables.
    pub fn structurally_equal(&self, a: ExprId, b: ExprId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((a, b)) = stack.pop() {
            if a == b {
                continue;
            }
            let (na, nb) = (self.get(a), self.get(b));
            if na.domain != nb.domain {
                return false;
            }
            let same_shape = match (&na.kind, &nb.kind) {
                (ExprKind::Constant, ExprKind::Constant) => na.value == nb.value,
                (ExprKind::Variable(x), ExprKind::Variable(y)) => x == y,
                (ExprKind::StringReader { position: p, .. }, ExprKind::StringReader { position: q, .. }) => p == q,
                (ka, kb) => {
                    std::mem::discriminant(ka) == std::mem::discriminant(kb)
                        && ka.operator() == kb.operator()
                        && ka.children().len() == kb.children().len()
                }
            };
            if !same_shape {
                return false;
            }
            stack.extend(na.kind.children().into_iter().zip(nb.kind.children()));
        }
        true
    }

    /// Renders the expression in infix notation, e.g. `(x + 4)` or `s.indexOf(99)`.
    pub fn display(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, id);
        out
    }

    fn write_expr(&self, out: &mut String, id: ExprId) {
        let node = self.get(id);
        match &node.kind {
            ExprKind::Constant => {
                let _ = write!(out, "{}", node.value);
            }
            ExprKind::Variable(var) => out.push_str(self.var_name(*var)),
            ExprKind::Unary { op, operand } => match op {
                Operator::Neg => {
                    out.push('-');
                    self.write_expr(out, *operand);
                }
                op if node.domain == Domain::String || self.domain(*operand) == Domain::String => {
                    self.write_expr(out, *operand);
                    let _ = write!(out, ".{}()", op);
                }
                op => self.write_call(out, &op.to_string(), &[*operand]),
            },
            ExprKind::Binary {
                op: Operator::ArraySelect,
                left,
                right,
            } => {
                self.write_expr(out, *left);
                out.push('[');
                self.write_expr(out, *right);
                out.push(']');
            }
            ExprKind::Binary { op, left, right } if op.is_infix() => {
                out.push('(');
                self.write_expr(out, *left);
                let _ = write!(out, " {} ", op);
                self.write_expr(out, *right);
                out.push(')');
            }
            ExprKind::Binary { op, left, right } => self.write_op(out, *op, *left, &[*right]),
            ExprKind::Multi {
                op,
                left,
                right,
                others,
            } => {
                let mut args = vec![*right];
                args.extend(others);
                self.write_op(out, *op, *left, &args);
            }
            ExprKind::Cast { arg } => {
                let _ = write!(out, "({})", node.domain);
                self.write_expr(out, *arg);
            }
            ExprKind::StringReader { string, position } => {
                let _ = write!(out, "reader(");
                self.write_expr(out, *string);
                let _ = write!(out, ")@{}.read()", position);
            }
            ExprKind::NewTokenizer { string, delimiters } => self.write_call(out, "tokenizer", &[*string, *delimiters]),
            ExprKind::NextTokenizer { tokenizer } => {
                self.write_expr(out, *tokenizer);
                out.push('\'');
            }
            ExprKind::HasMoreTokens { tokenizer } => {
                self.write_expr(out, *tokenizer);
                out.push_str(".hasMoreTokens()");
            }
            ExprKind::NextToken { tokenizer } => {
                self.write_expr(out, *tokenizer);
                out.push_str(".nextToken()");
            }
        }
    }

    /// Method syntax for string operators, call syntax otherwise.
    fn write_op(&self, out: &mut String, op: Operator, left: ExprId, rest: &[ExprId]) {
        if self.domain(left) == Domain::String {
            self.write_expr(out, left);
            let _ = write!(out, ".{}", op);
            self.write_args(out, rest);
        } else {
            let mut args = vec![left];
            args.extend(rest);
            self.write_call(out, op.symbol(), &args);
        }
    }

    fn write_call(&self, out: &mut String, name: &str, args: &[ExprId]) {
        out.push_str(name);
        self.write_args(out, args);
    }

    fn write_args(&self, out: &mut String, args: &[ExprId]) {
        out.push('(');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(out, arg);
        }
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_cached_values() {
        let mut arena = ExprArena::new();
        let a = arena.mk_int(3);
        let b = arena.mk_int(4);
        let sum = arena.mk_binary(Operator::Plus, a, b).unwrap();
        assert_eq!(arena.value(sum), &Value::Integer(7));
        assert_eq!(arena.domain(sum), Domain::Integer);
        assert_eq!(arena.size(sum), 3);
        assert!(!arena.contains_symbolic(sum));
    }

    #[test]
    fn test_parent_written_once() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 1).unwrap();
        let one = arena.mk_int(1);
        let first = arena.mk_binary(Operator::Plus, x, one).unwrap();
        let second = arena.mk_binary(Operator::Mul, x, one).unwrap();
        assert_eq!(arena.parent(x), Some(first));
        assert_eq!(arena.parent(first), None);
        assert_ne!(arena.parent(x), Some(second));
    }

    #[test]
    fn test_size_counts_shared_children_per_reference() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 2).unwrap();
        let sq = arena.mk_binary(Operator::Mul, x, x).unwrap();
        let quad = arena.mk_binary(Operator::Mul, sq, sq).unwrap();
        assert_eq!(arena.size(sq), 3);
        assert_eq!(arena.size(quad), 7);
        assert_eq!(arena.value(quad), &Value::Integer(16));
    }

    #[test]
    fn test_variables_are_interned() {
        let mut arena = ExprArena::new();
        let x1 = arena.mk_var("x", 5).unwrap();
        let x2 = arena.mk_var("x", 5).unwrap();
        assert_eq!(x1, x2);
        assert_eq!(arena.mk_var("x", 6), Err(Error::ConflictingVariable { name: "x".to_string() }));
        assert!(matches!(arena.mk_var("x", "five"), Err(Error::DomainMismatch { .. })));

        let var = arena.var_by_name("x").unwrap();
        assert_eq!(arena.var_name(var), "x");
        assert_eq!(arena.var_node(var), x1);
    }

    #[test]
    fn test_variables_and_constants() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 1).unwrap();
        let y = arena.mk_var("y", 2).unwrap();
        let c = arena.mk_int(10);
        let xy = arena.mk_binary(Operator::Plus, x, y).unwrap();
        let e = arena.mk_binary(Operator::Mul, xy, c).unwrap();

        let vars: Vec<_> = arena.variables(e).into_iter().collect();
        assert_eq!(vars, vec![VarId::new(0), VarId::new(1)]);
        assert_eq!(arena.constants(e), HashSet::from([Value::Integer(10)]));
        assert!(arena.variables(c).is_empty());
    }

    #[test]
    fn test_domain_checks() {
        let mut arena = ExprArena::new();
        let i = arena.mk_int(1);
        let r = arena.mk_real(1.0);
        let s = arena.mk_str("abc");
        assert!(matches!(arena.mk_binary(Operator::Plus, i, r), Err(Error::DomainMismatch { .. })));
        assert!(matches!(arena.mk_unary(Operator::Sqrt, i), Err(Error::DomainMismatch { .. })));
        assert!(matches!(arena.mk_multi(Operator::Replace, s, s, &[s, s]), Err(Error::ArityMismatch { .. })));
        assert!(matches!(arena.mk_cast(s, Domain::Real), Err(Error::DomainMismatch { .. })));
        assert!(matches!(arena.mk_next_token(s), Err(Error::DomainMismatch { .. })));
    }

    #[test]
    fn test_construction_fails_on_impossible_operation() {
        let mut arena = ExprArena::new();
        let a = arena.mk_int(1);
        let zero = arena.mk_int(0);
        assert_eq!(arena.mk_binary(Operator::Div, a, zero), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_multi_operators() {
        let mut arena = ExprArena::new();
        let s = arena.mk_str("hello");
        let c = arena.mk_int('l' as i64);
        let from = arena.mk_int(3);
        let idx = arena.mk_multi(Operator::IndexOfChar, s, c, &[from]).unwrap();
        assert_eq!(arena.value(idx), &Value::Integer(3));
        assert!(matches!(arena.get(idx).kind, ExprKind::Multi { .. }));

        let idx = arena.mk_multi(Operator::IndexOfChar, s, c, &[]).unwrap();
        assert_eq!(arena.value(idx), &Value::Integer(2));
        assert!(matches!(arena.get(idx).kind, ExprKind::Binary { .. }));
    }

    #[test]
    fn test_tokenizer_chain() {
        let mut arena = ExprArena::new();
        let s = arena.mk_var("s", "a,b").unwrap();
        let d = arena.mk_str(",");
        let t0 = arena.mk_tokenizer(s, d).unwrap();
        let tok = arena.mk_next_token(t0).unwrap();
        let t1 = arena.mk_next_tokenizer(t0).unwrap();
        let more1 = arena.mk_has_more_tokens(t1).unwrap();
        let t2 = arena.mk_next_tokenizer(t1).unwrap();
        let more2 = arena.mk_has_more_tokens(t2).unwrap();

        assert_eq!(arena.value(tok), &Value::from("a"));
        assert_eq!(arena.value(t1), &Value::from(",b"));
        assert_eq!(arena.value(more1), &Value::Integer(1));
        assert_eq!(arena.value(more2), &Value::Integer(0));
        assert_eq!(
            arena.tokenizer_origin(t2),
            Some(TokenizerOrigin {
                string: s,
                delimiters: d,
                consumed: 2
            })
        );
        assert!(arena.mk_next_token(t2).is_err());
    }

    #[test]
    fn test_string_reader() {
        let mut arena = ExprArena::new();
        let s = arena.mk_str("ab");
        let r1 = arena.mk_string_reader(s, 1).unwrap();
        let r2 = arena.mk_string_reader(s, 2).unwrap();
        assert_eq!(arena.value(r1), &Value::Integer('b' as i64));
        assert_eq!(arena.value(r2), &Value::Integer(-1));
    }

    #[test]
    fn test_structural_equality() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 1).unwrap();
        let one_a = arena.mk_int(1);
        let one_b = arena.mk_int(1);
        let two = arena.mk_int(2);
        let a = arena.mk_binary(Operator::Plus, x, one_a).unwrap();
        let b = arena.mk_binary(Operator::Plus, x, one_b).unwrap();
        let c = arena.mk_binary(Operator::Plus, x, two).unwrap();
        let d = arena.mk_binary(Operator::Minus, x, one_a).unwrap();
        assert!(arena.structurally_equal(a, b));
        assert!(!arena.structurally_equal(a, c));
        assert!(!arena.structurally_equal(a, d));
    }

    #[test]
    fn test_display() {
        let mut arena = ExprArena::new();
        let x = arena.mk_var("x", 1).unwrap();
        let four = arena.mk_int(4);
        let sum = arena.mk_binary(Operator::Plus, x, four).unwrap();
        assert_eq!(arena.display(sum), "(x + 4)");

        let s = arena.mk_var("s", "hello").unwrap();
        let c = arena.mk_int('z' as i64);
        let idx = arena.mk_binary(Operator::IndexOfChar, s, c).unwrap();
        assert_eq!(arena.display(idx), "s.indexOf(122)");

        let len = arena.mk_unary(Operator::Length, s).unwrap();
        assert_eq!(arena.display(len), "s.length()");

        let r = arena.mk_real(2.0);
        let sqrt = arena.mk_unary(Operator::Sqrt, r).unwrap();
        assert_eq!(arena.display(sqrt), "sqrt(2.0)");
    }

    #[test]
    fn test_arrays() {
        let mut arena = ExprArena::new();
        let a = arena.mk_var("a", vec![3i64, 1, 4]).unwrap();
        let i = arena.mk_var("i", 1).unwrap();
        let nine = arena.mk_int(9);
        let stored = arena.mk_multi(Operator::ArrayStore, a, i, &[nine]).unwrap();
        let read = arena.mk_binary(Operator::ArraySelect, stored, i).unwrap();

        assert_eq!(arena.domain(stored), Domain::IntegerArray);
        assert_eq!(arena.value(stored), &Value::from(vec![3i64, 9, 4]));
        assert_eq!(arena.value(a), &Value::from(vec![3i64, 1, 4]));
        assert_eq!(arena.value(read), &Value::Integer(9));
        assert_eq!(arena.display(read), "store(a, i, 9)[i]");

        let five = arena.mk_int(5);
        assert!(matches!(
            arena.mk_binary(Operator::ArraySelect, a, five),
            Err(Error::IndexOutOfBounds { index: 5, length: 3 })
        ));
        let half = arena.mk_real(0.5);
        assert!(matches!(
            arena.mk_multi(Operator::ArrayStore, a, i, &[half]),
            Err(Error::DomainMismatch { .. })
        ));
    }
}
