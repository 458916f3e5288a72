use crate::operator::Operator;
use crate::reference::ExprId;
use crate::types::{Domain, Value, VarId};

/// Shape of an expression node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExprKind {
    Constant,
    Variable(VarId),
    Unary {
        op: Operator,
        operand: ExprId,
    },
    Binary {
        op: Operator,
        left: ExprId,
        right: ExprId,
    },
    /// Operator with a left and right operand plus ordered auxiliary operands.
    Multi {
        op: Operator,
        left: ExprId,
        right: ExprId,
        others: Vec<ExprId>,
    },
    /// Conversion of `arg` into the node's domain.
    Cast {
        arg: ExprId,
    },
    /// Code point read from a character stream over `string` at `position`.
    StringReader {
        string: ExprId,
        position: usize,
    },
    /// Tokenizer over `string`; its value is the text not yet consumed.
    NewTokenizer {
        string: ExprId,
        delimiters: ExprId,
    },
    /// `tokenizer` after one more token was taken.
    NextTokenizer {
        tokenizer: ExprId,
    },
    HasMoreTokens {
        tokenizer: ExprId,
    },
    NextToken {
        tokenizer: ExprId,
    },
}

impl ExprKind {
    /// Direct children, in operand order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Constant | ExprKind::Variable(_) => vec![],
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::Binary { left, right, .. } => vec![*left, *right],
            ExprKind::Multi { left, right, others, .. } => {
                let mut children = Vec::with_capacity(2 + others.len());
                children.push(*left);
                children.push(*right);
                children.extend(others);
                children
            }
            ExprKind::Cast { arg } => vec![*arg],
            ExprKind::StringReader { string, .. } => vec![*string],
            ExprKind::NewTokenizer { string, delimiters } => vec![*string, *delimiters],
            ExprKind::NextTokenizer { tokenizer }
            | ExprKind::HasMoreTokens { tokenizer }
            | ExprKind::NextToken { tokenizer } => vec![*tokenizer],
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            ExprKind::Unary { op, .. } | ExprKind::Binary { op, .. } | ExprKind::Multi { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ExprKind::Constant | ExprKind::Variable(_))
    }
}

/// An expression node together with the facts cached at construction.
#[derive(Debug, Clone)]
pub struct Node {
    pub domain: Domain,
    pub kind: ExprKind,
    /// Concrete value observed when the expression was captured.
    pub value: Value,
    /// Number of nodes in the subtree, counting a shared child once per reference.
    pub size: usize,
    /// Whether some descendant (or the node itself) is a variable.
    pub symbolic: bool,
    /// First node that adopted this one as a child.
    pub parent: Option<ExprId>,
}

impl Node {
    pub fn is_constant(&self) -> bool {
        self.kind == ExprKind::Constant
    }

    pub fn var(&self) -> Option<VarId> {
        match self.kind {
            ExprKind::Variable(var) => Some(var),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_children_order() {
        let kind = ExprKind::Multi {
            op: Operator::RegionMatches,
            left: ExprId::new(0),
            right: ExprId::new(1),
            others: vec![ExprId::new(2), ExprId::new(3)],
        };
        assert_eq!(kind.children(), vec![ExprId::new(0), ExprId::new(1), ExprId::new(2), ExprId::new(3)]);
        assert_eq!(kind.operator(), Some(Operator::RegionMatches));
        assert!(!kind.is_leaf());
    }

    #[test]
    fn test_leaves() {
        assert!(ExprKind::Constant.children().is_empty());
        assert!(ExprKind::Variable(VarId::new(0)).is_leaf());
        assert_eq!(ExprKind::Constant.operator(), None);
    }
}
