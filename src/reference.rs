use std::fmt::{Display, Formatter};

/// Handle of a node in an [`ExprArena`][crate::arena::ExprArena].
///
/// Nodes are appended in construction order, so every child has a smaller id
/// than any node referring to it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ExprId(u32);

impl ExprId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the node in the arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Return the internal representation of the handle.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Display for ExprId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    #[test]
    fn test_expr_id() {
        let id = ExprId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "@42");
        assert!(ExprId::new(1) < ExprId::new(2));
    }
}
