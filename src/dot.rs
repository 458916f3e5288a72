//! Expression trees to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Leaves** (constants and variables) are rendered at the bottom (sink rank),
//!   variables with a distinct shape
//! - **Operator nodes** are labelled with the operator symbol, edges to their
//!   operands are labelled with the operand position
//! - **Root nodes** are rendered as rectangles at the top (source rank)
//!
//! # Examples
//!
//! ```
//! use symexpr_rs::arena::ExprArena;
//! use symexpr_rs::dot::to_dot;
//! use symexpr_rs::operator::Operator;
//!
//! let mut arena = ExprArena::new();
//! let x = arena.mk_var("x", 3).unwrap();
//! let four = arena.mk_int(4);
//! let sum = arena.mk_binary(Operator::Plus, x, four).unwrap();
//!
//! let dot = to_dot(&arena, &[sum]).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! ```

use std::fmt::Write as _;

use crate::arena::ExprArena;
use crate::node::ExprKind;
use crate::reference::ExprId;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for operator nodes (default: "ellipse")
    pub node_shape: &'static str,
    /// Shape for constants (default: "box")
    pub constant_shape: &'static str,
    /// Shape for variables (default: "diamond")
    pub variable_shape: &'static str,
    /// Shape for root nodes (default: "rect")
    pub root_shape: &'static str,
    /// Whether operator nodes also show their cached value (default: true)
    pub show_values: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "ellipse",
            constant_shape: "box",
            variable_shape: "diamond",
            root_shape: "rect",
            show_values: true,
        }
    }
}

/// Converts the trees rooted at `roots` to DOT format.
///
/// Shared subtrees are rendered once.
pub fn to_dot(arena: &ExprArena, roots: &[ExprId]) -> Result<String, std::fmt::Error> {
    to_dot_with_config(arena, roots, &DotConfig::default())
}

pub fn to_dot_with_config(arena: &ExprArena, roots: &[ExprId], config: &DotConfig) -> Result<String, std::fmt::Error> {
    let mut nodes: Vec<ExprId> = roots.iter().flat_map(|&root| arena.descendants(root)).collect();
    nodes.sort_unstable();
    nodes.dedup();

    let mut dot = String::new();
    writeln!(dot, "graph {{")?;
    writeln!(dot, "node [shape={}];", config.node_shape)?;

    writeln!(dot, "{{ rank=sink")?;
    for &id in nodes.iter() {
        let node = arena.get(id);
        match node.kind {
            ExprKind::Constant => {
                let label = escape(&node.value.to_string());
                writeln!(dot, "{} [shape={}, label=\"{}\"];", id.index(), config.constant_shape, label)?;
            }
            ExprKind::Variable(var) => {
                let label = escape(arena.var_name(var));
                writeln!(dot, "{} [shape={}, label=\"{}\"];", id.index(), config.variable_shape, label)?;
            }
            _ => {}
        }
    }
    writeln!(dot, "}}")?;

    for &id in nodes.iter() {
        let node = arena.get(id);
        if node.kind.is_leaf() {
            continue;
        }
        let label = operation_label(&node.kind);
        if config.show_values {
            let value = escape(&node.value.to_string());
            writeln!(dot, "{} [label=\"{}\\n= {}\"];", id.index(), escape(&label), value)?;
        } else {
            writeln!(dot, "{} [label=\"{}\"];", id.index(), escape(&label))?;
        }
        for (position, child) in node.kind.children().into_iter().enumerate() {
            writeln!(dot, "{} -- {} [label=\"{}\"];", id.index(), child.index(), position)?;
        }
    }

    writeln!(dot, "{{ rank=source")?;
    for (i, &root) in roots.iter().enumerate() {
        writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
    }
    writeln!(dot, "}}")?;
    for (i, &root) in roots.iter().enumerate() {
        writeln!(dot, "r{} -- {};", i, root.index())?;
    }

    writeln!(dot, "}}")?;
    Ok(dot)
}

fn operation_label(kind: &ExprKind) -> String {
    match kind {
        ExprKind::Unary { op, .. } | ExprKind::Binary { op, .. } | ExprKind::Multi { op, .. } => op.to_string(),
        ExprKind::Cast { .. } => "cast".to_string(),
        ExprKind::StringReader { position, .. } => format!("read@{}", position),
        ExprKind::NewTokenizer { .. } => "tokenizer".to_string(),
        ExprKind::NextTokenizer { .. } => "nextTokenizer".to_string(),
        ExprKind::HasMoreTokens { .. } => "hasMoreTokens".to_string(),
        ExprKind::NextToken { .. } => "nextToken".to_string(),
        ExprKind::Constant | ExprKind::Variable(_) => String::new(),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}
