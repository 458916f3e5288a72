use std::cmp::Ordering;
use std::fmt;

/// Relational comparator of a [`Constraint`][crate::constraint::Constraint].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    pub const ALL: [Comparator; 6] = [
        Comparator::Eq,
        Comparator::Ne,
        Comparator::Lt,
        Comparator::Le,
        Comparator::Gt,
        Comparator::Ge,
    ];

    /// Logical negation: `!(a < b)` is `a >= b`.
    pub fn not(self) -> Self {
        match self {
            Comparator::Eq => Comparator::Ne,
            Comparator::Ne => Comparator::Eq,
            Comparator::Lt => Comparator::Ge,
            Comparator::Le => Comparator::Gt,
            Comparator::Gt => Comparator::Le,
            Comparator::Ge => Comparator::Lt,
        }
    }

    /// Comparator for swapped operands: `a < b` is `b > a`.
    pub fn swap(self) -> Self {
        match self {
            Comparator::Eq => Comparator::Eq,
            Comparator::Ne => Comparator::Ne,
            Comparator::Lt => Comparator::Gt,
            Comparator::Le => Comparator::Ge,
            Comparator::Gt => Comparator::Lt,
            Comparator::Ge => Comparator::Le,
        }
    }

    /// Applies the comparator to the outcome of a comparison.
    ///
    /// `None` stands for an unordered pair (a NaN operand): only `Ne` holds.
    pub fn holds(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => self == Comparator::Ne,
            Some(ord) => match self {
                Comparator::Eq => ord == Ordering::Equal,
                Comparator::Ne => ord != Ordering::Equal,
                Comparator::Lt => ord == Ordering::Less,
                Comparator::Le => ord != Ordering::Greater,
                Comparator::Gt => ord == Ordering::Greater,
                Comparator::Ge => ord != Ordering::Less,
            },
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::Eq => "==",
            Comparator::Ne => "!=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
