//! Distance of a string from matching a regular expression.
//!
//! The pattern is compiled into an epsilon-free automaton whose transitions are
//! labelled with code-point ranges. The distance is the cost of the cheapest
//! edit path aligning the input with some accepted string, in the style of
//! Myers and Miller's approximate regular-expression matching:
//!
//! - deleting an input character costs 1,
//! - inserting a character costs 1,
//! - replacing an input character `c` by a transition's range costs the
//!   normalised gap between `c` and the range (0 inside the range).
//!
//! Edits along a path must come in the order *deletions, replacements,
//! insertions*, matching a search that only removes characters at the front,
//! mutates characters in place and appends characters at the end. Each state
//! therefore keeps three costs, one per kind of path.
//!
//! Patterns are parsed with `regex-syntax`, the parser behind `regex`, so the
//! automaton reads the same syntax and the same Unicode classes as
//! [`semantics::matches`]. Word boundaries and other assertions cannot be
//! expressed by the automaton. For those the distance degrades to 0 for a match
//! and 1 otherwise.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, warn};
use regex_syntax::hir::{self, Class, Hir, HirKind, Look};

use crate::error::Result;
use crate::semantics;
use crate::strdist::Normalizer;

/// Upper bound on the number of automaton states built for one pattern.
const MAX_STATES: u64 = 4096;

type Ranges = Vec<(u32, u32)>;

#[derive(Debug, Clone)]
enum Ast {
    Empty,
    Set(Ranges),
    Concat(Vec<Ast>),
    Alt(Vec<Ast>),
    Repeat { node: Box<Ast>, min: u32, max: Option<u32> },
}

impl Ast {
    /// Upper bound on the number of states the construction allocates.
    fn weight(&self) -> u64 {
        match self {
            Ast::Empty => 1,
            Ast::Set(_) => 2,
            Ast::Concat(items) => items.iter().fold(1, |acc, a| acc.saturating_add(a.weight())),
            Ast::Alt(items) => items.iter().fold(2, |acc, a| acc.saturating_add(a.weight())),
            Ast::Repeat { node, min, max } => {
                let copies = max.map_or(*min as u64 + 1, |m| m as u64);
                copies.saturating_mul(node.weight()).saturating_add(2)
            }
        }
    }
}

// ─── Lowering ──────────────────────────────────────────────────────────────────

type LowerResult<T> = std::result::Result<T, String>;

/// Parses `pattern` with the syntax of the `regex` crate.
fn parse(pattern: &str) -> LowerResult<Ast> {
    let hir = regex_syntax::Parser::new()
        .parse(pattern)
        .map_err(|e| e.to_string())?;
    lower(&hir, true, true)
}

/// Lowers the parsed pattern to range sets.
///
/// Matching is always against the whole input, so `^` and `$` are dropped where
/// they can only touch the start or end of the input. Any other assertion is
/// unsupported.
fn lower(hir: &Hir, at_start: bool, at_end: bool) -> LowerResult<Ast> {
    Ok(match hir.kind() {
        HirKind::Empty => Ast::Empty,
        HirKind::Literal(hir::Literal(bytes)) => {
            let text = std::str::from_utf8(bytes).map_err(|_| "non-UTF-8 literal".to_string())?;
            let mut items: Vec<Ast> = text.chars().map(|c| Ast::Set(vec![(c as u32, c as u32)])).collect();
            if items.len() == 1 {
                items.swap_remove(0)
            } else {
                Ast::Concat(items)
            }
        }
        HirKind::Class(Class::Unicode(class)) => Ast::Set(
            class
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect(),
        ),
        HirKind::Class(Class::Bytes(class)) => Ast::Set(
            class
                .ranges()
                .iter()
                .map(|r| (r.start() as u32, r.end() as u32))
                .collect(),
        ),
        HirKind::Look(Look::Start) if at_start => Ast::Empty,
        HirKind::Look(Look::End) if at_end => Ast::Empty,
        HirKind::Look(look) => return Err(format!("assertion {:?}", look)),
        HirKind::Repetition(rep) => Ast::Repeat {
            node: Box::new(lower(&rep.sub, false, false)?),
            min: rep.min,
            max: rep.max,
        },
        HirKind::Capture(capture) => lower(&capture.sub, at_start, at_end)?,
        HirKind::Concat(items) => {
            let last = items.len().saturating_sub(1);
            Ast::Concat(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| lower(item, at_start && i == 0, at_end && i == last))
                    .collect::<LowerResult<_>>()?,
            )
        }
        HirKind::Alternation(branches) => Ast::Alt(
            branches
                .iter()
                .map(|branch| lower(branch, at_start, at_end))
                .collect::<LowerResult<_>>()?,
        ),
    })
}

// ─── Automaton ─────────────────────────────────────────────────────────────────

/// Thompson construction with epsilon edges.
#[derive(Default)]
struct Thompson {
    epsilon: Vec<Vec<usize>>,
    edges: Vec<Vec<(u32, u32, usize)>>,
}

impl Thompson {
    fn state(&mut self) -> usize {
        self.epsilon.push(Vec::new());
        self.edges.push(Vec::new());
        self.epsilon.len() - 1
    }

    fn build(&mut self, ast: &Ast) -> (usize, usize) {
        match ast {
            Ast::Empty => {
                let s = self.state();
                (s, s)
            }
            Ast::Set(ranges) => {
                let s = self.state();
                let e = self.state();
                self.edges[s].extend(ranges.iter().map(|&(lo, hi)| (lo, hi, e)));
                (s, e)
            }
            Ast::Concat(items) => {
                let s = self.state();
                let mut end = s;
                for item in items {
                    let (is, ie) = self.build(item);
                    self.epsilon[end].push(is);
                    end = ie;
                }
                (s, end)
            }
            Ast::Alt(branches) => {
                let s = self.state();
                let e = self.state();
                for branch in branches {
                    let (bs, be) = self.build(branch);
                    self.epsilon[s].push(bs);
                    self.epsilon[be].push(e);
                }
                (s, e)
            }
            Ast::Repeat { node, min, max } => {
                let s = self.state();
                let mut end = s;
                for _ in 0..*min {
                    let (is, ie) = self.build(node);
                    self.epsilon[end].push(is);
                    end = ie;
                }
                let e = self.state();
                match max {
                    None => {
                        let (is, ie) = self.build(node);
                        self.epsilon[end].push(is);
                        self.epsilon[ie].push(is);
                        self.epsilon[ie].push(e);
                    }
                    Some(max) => {
                        for _ in *min..*max {
                            let (is, ie) = self.build(node);
                            self.epsilon[end].push(is);
                            self.epsilon[end].push(e);
                            end = ie;
                        }
                    }
                }
                self.epsilon[end].push(e);
                (s, e)
            }
        }
    }

    fn closure(&self, state: usize) -> Vec<usize> {
        let mut visited = vec![false; self.epsilon.len()];
        let mut stack = vec![state];
        let mut result = Vec::new();
        while let Some(s) = stack.pop() {
            if std::mem::replace(&mut visited[s], true) {
                continue;
            }
            result.push(s);
            stack.extend(&self.epsilon[s]);
        }
        result
    }

    /// Removes epsilon edges and unreachable states; the start becomes state 0.
    fn into_automaton(self, start: usize, end: usize) -> Automaton {
        let mut index = vec![usize::MAX; self.edges.len()];
        let mut order = vec![start];
        index[start] = 0;
        let mut transitions = Vec::new();
        let mut accepting = Vec::new();
        let mut i = 0;
        while i < order.len() {
            let state = order[i];
            i += 1;
            let mut out = Vec::new();
            let mut accept = false;
            for q in self.closure(state) {
                accept |= q == end;
                for &(lo, hi, target) in &self.edges[q] {
                    if index[target] == usize::MAX {
                        index[target] = order.len();
                        order.push(target);
                    }
                    out.push((lo, hi, index[target]));
                }
            }
            out.sort_unstable();
            out.dedup();
            transitions.push(out);
            accepting.push(accept);
        }
        Automaton {
            transitions,
            accepting,
        }
    }
}

/// Epsilon-free automaton with code-point range transitions. State 0 is initial.
#[derive(Debug, Clone)]
pub struct Automaton {
    transitions: Vec<Vec<(u32, u32, usize)>>,
    accepting: Vec<bool>,
}

impl Automaton {
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    pub fn accepts(&self, input: &str) -> bool {
        let mut current = vec![false; self.num_states()];
        current[0] = true;
        for c in input.chars().map(|c| c as u32) {
            let mut next = vec![false; self.num_states()];
            for (s, _) in current.iter().enumerate().filter(|&(_, &on)| on) {
                for &(lo, hi, t) in &self.transitions[s] {
                    if lo <= c && c <= hi {
                        next[t] = true;
                    }
                }
            }
            current = next;
        }
        current.iter().zip(&self.accepting).any(|(&on, &acc)| on && acc)
    }

    /// Shortest unit-cost insertion paths within one row.
    fn relax_insertions(&self, ins: &mut [f64]) {
        loop {
            let mut changed = false;
            for s in 0..self.num_states() {
                if !ins[s].is_finite() {
                    continue;
                }
                let candidate = ins[s] + 1.0;
                for &(_, _, t) in &self.transitions[s] {
                    if candidate < ins[t] {
                        ins[t] = candidate;
                        changed = true;
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }

    /// Edit distance of `input` from the language of the automaton.
    pub fn distance(&self, input: &str, normalizer: Normalizer) -> f64 {
        let n = self.num_states();
        // Cheapest path ending in each state made of deletions only, of
        // deletions then replacements, and of all three kinds in order.
        let mut del = vec![f64::INFINITY; n];
        let mut rep = vec![f64::INFINITY; n];
        let mut ins = vec![f64::INFINITY; n];
        del[0] = 0.0;
        rep[0] = 0.0;
        ins[0] = 0.0;
        self.relax_insertions(&mut ins);

        for c in input.chars().map(|c| c as u32) {
            let mut next_del = vec![f64::INFINITY; n];
            let mut next_rep = vec![f64::INFINITY; n];
            for s in 0..n {
                next_del[s] = del[s] + 1.0;
                next_rep[s] = next_rep[s].min(del[s] + 1.0);
                let base = del[s].min(rep[s]);
                if !base.is_finite() {
                    continue;
                }
                for &(lo, hi, t) in &self.transitions[s] {
                    let cost = replacement_cost(c, lo, hi, normalizer);
                    next_rep[t] = next_rep[t].min(base + cost);
                }
            }
            let mut next_ins = next_rep.clone();
            self.relax_insertions(&mut next_ins);
            del = next_del;
            rep = next_rep;
            ins = next_ins;
        }

        let best = ins
            .iter()
            .zip(&self.accepting)
            .filter(|&(_, &acc)| acc)
            .map(|(&cost, _)| cost)
            .fold(f64::INFINITY, f64::min);
        if best.is_finite() {
            best
        } else {
            f64::MAX
        }
    }
}

fn replacement_cost(c: u32, lo: u32, hi: u32, normalizer: Normalizer) -> f64 {
    if lo <= c && c <= hi {
        0.0
    } else {
        let gap = c.abs_diff(lo).min(c.abs_diff(hi));
        normalizer(gap as f64)
    }
}

// ─── Compiled patterns ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum CompiledPattern {
    Automaton(Automaton),
    /// The pattern needs features the automaton cannot express.
    Unsupported { pattern: String, reason: String },
}

impl CompiledPattern {
    pub fn compile(pattern: &str) -> Self {
        let unsupported = |reason: String| {
            warn!("regex distance: '{}' is not supported ({}), using match/no-match", pattern, reason);
            CompiledPattern::Unsupported {
                pattern: pattern.to_string(),
                reason,
            }
        };
        let ast = match parse(pattern) {
            Ok(ast) => ast,
            Err(reason) => return unsupported(reason),
        };
        if ast.weight() > MAX_STATES {
            return unsupported("pattern too large".to_string());
        }
        let mut thompson = Thompson::default();
        let (start, end) = thompson.build(&ast);
        let automaton = thompson.into_automaton(start, end);
        debug!("compiled '{}' into {} states", pattern, automaton.num_states());
        CompiledPattern::Automaton(automaton)
    }

    /// Distance of `input` from matching the pattern.
    ///
    /// Fails only if an unsupported pattern is not a valid regular expression.
    pub fn distance(&self, input: &str, normalizer: Normalizer) -> Result<f64> {
        match self {
            CompiledPattern::Automaton(automaton) => Ok(automaton.distance(input, normalizer)),
            CompiledPattern::Unsupported { pattern, .. } => {
                let matched = semantics::matches(pattern, input)?;
                Ok(if matched { 0.0 } else { 1.0 })
            }
        }
    }
}

/// Per-owner cache of compiled patterns.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RefCell<HashMap<String, Rc<CompiledPattern>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pattern: &str) -> Rc<CompiledPattern> {
        if let Some(compiled) = self.compiled.borrow().get(pattern) {
            return Rc::clone(compiled);
        }
        let compiled = Rc::new(CompiledPattern::compile(pattern));
        self.compiled
            .borrow_mut()
            .insert(pattern.to_string(), Rc::clone(&compiled));
        compiled
    }

    pub fn len(&self) -> usize {
        self.compiled.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.borrow().is_empty()
    }
}

/// Distance of `input` from matching `pattern`, without caching.
pub fn distance(input: &str, pattern: &str, normalizer: Normalizer) -> Result<f64> {
    CompiledPattern::compile(pattern).distance(input, normalizer)
}
