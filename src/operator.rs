//! The operator catalogue.
//!
//! Every operator knows its display symbol, the operand counts it accepts and,
//! for a concrete list of operand domains, the domain of its result. Operand
//! lists are ordered `left, right, aux...`; an operator applied to three or more
//! operands is a *multi* operator and the extra operands are its auxiliary list
//! (e.g. `substring(s, begin, end)` or `region_matches(a, b, a_start, b_start,
//! len, ignore_case)`).
//!
//! Arrays are values like any other: `select(a, i)` reads an element and
//! `store(a, i, v)` yields a copy of `a` with `v` at `i`.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::Domain;
use crate::types::Domain::{
    Integer as I, IntegerArray as IA, Real as R, RealArray as RA, String as S, StringArray as SA,
};

/// Number of operands an operator takes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Arity {
    Unary,
    Binary,
    /// Left and right operands plus the given number of auxiliary operands.
    Multi(usize),
}

impl Arity {
    pub fn operand_count(self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
            Arity::Multi(aux) => 2 + aux,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operator {
    // Integer and real arithmetic
    Plus,
    Minus,
    Mul,
    Div,
    Rem,
    Max,
    Min,
    Neg,
    Abs,

    // Integer bit manipulation
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,

    // Character classification (on code points)
    IsDigit,
    IsLetter,
    NumericValue,

    // Real to integer
    Round,
    GetExponent,

    // Real functions
    Acos,
    Asin,
    Atan,
    Cbrt,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Expm1,
    Floor,
    Log,
    Log10,
    Log1p,
    NextUp,
    Rint,
    Signum,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    ToDegrees,
    ToRadians,
    Ulp,
    Atan2,
    CopySign,
    Hypot,
    IeeeRemainder,
    NextAfter,
    Pow,
    Scalb,

    // String predicates (integer 0/1 result)
    Equals,
    EqualsIgnoreCase,
    StartsWith,
    EndsWith,
    Contains,
    Matches,
    RegionMatches,

    // String queries (integer result)
    Length,
    IsInteger,
    CharAt,
    CompareTo,
    CompareToIgnoreCase,
    IndexOfChar,
    IndexOfString,
    LastIndexOfChar,
    LastIndexOfString,

    // String producers
    Concat,
    AppendBoolean,
    AppendChar,
    AppendInteger,
    AppendReal,
    AppendString,
    Substring,
    ReplaceChar,
    Replace,
    ReplaceAll,
    ReplaceFirst,
    ToLowerCase,
    ToUpperCase,
    Trim,

    // Arrays
    ArraySelect,
    ArrayStore,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        use Operator::*;
        match self {
            Plus => "+",
            Minus => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Max => "max",
            Min => "min",
            Neg => "-",
            Abs => "abs",
            Shl => "<<",
            Shr => ">>",
            UShr => ">>>",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            IsDigit => "isDigit",
            IsLetter => "isLetter",
            NumericValue => "getNumericValue",
            Round => "round",
            GetExponent => "getExponent",
            Acos => "acos",
            Asin => "asin",
            Atan => "atan",
            Cbrt => "cbrt",
            Ceil => "ceil",
            Cos => "cos",
            Cosh => "cosh",
            Exp => "exp",
            Expm1 => "expm1",
            Floor => "floor",
            Log => "log",
            Log10 => "log10",
            Log1p => "log1p",
            NextUp => "nextUp",
            Rint => "rint",
            Signum => "signum",
            Sin => "sin",
            Sinh => "sinh",
            Sqrt => "sqrt",
            Tan => "tan",
            Tanh => "tanh",
            ToDegrees => "toDegrees",
            ToRadians => "toRadians",
            Ulp => "ulp",
            Atan2 => "atan2",
            CopySign => "copySign",
            Hypot => "hypot",
            IeeeRemainder => "IEEEremainder",
            NextAfter => "nextAfter",
            Pow => "pow",
            Scalb => "scalb",
            Equals => "equals",
            EqualsIgnoreCase => "equalsIgnoreCase",
            StartsWith => "startsWith",
            EndsWith => "endsWith",
            Contains => "contains",
            Matches => "matches",
            RegionMatches => "regionMatches",
            Length => "length",
            IsInteger => "isInteger",
            CharAt => "charAt",
            CompareTo => "compareTo",
            CompareToIgnoreCase => "compareToIgnoreCase",
            IndexOfChar | IndexOfString => "indexOf",
            LastIndexOfChar | LastIndexOfString => "lastIndexOf",
            Concat => "concat",
            AppendBoolean | AppendChar | AppendInteger | AppendReal | AppendString => "append",
            Substring => "substring",
            ReplaceChar | Replace => "replace",
            ReplaceAll => "replaceAll",
            ReplaceFirst => "replaceFirst",
            ToLowerCase => "toLowerCase",
            ToUpperCase => "toUpperCase",
            Trim => "trim",
            ArraySelect => "select",
            ArrayStore => "store",
        }
    }

    /// Whether the operator is rendered between its operands (`a + b`) rather
    /// than as a call (`max(a, b)`).
    pub fn is_infix(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Plus | Minus | Mul | Div | Rem | Shl | Shr | UShr | BitAnd | BitOr | BitXor
        )
    }

    /// String predicates whose outcome has a string-distance gradient.
    pub fn is_string_predicate(self) -> bool {
        use Operator::*;
        matches!(
            self,
            Equals | EqualsIgnoreCase | StartsWith | EndsWith | Contains | Matches | RegionMatches
        )
    }

    /// All operand counts accepted by the operator.
    pub fn arities(self) -> &'static [Arity] {
        use Operator::*;
        match self {
            Neg | Abs | IsDigit | IsLetter | NumericValue | Round | GetExponent | Acos | Asin | Atan | Cbrt
            | Ceil | Cos | Cosh | Exp | Expm1 | Floor | Log | Log10 | Log1p | NextUp | Rint | Signum | Sin
            | Sinh | Sqrt | Tan | Tanh | ToDegrees | ToRadians | Ulp | Length | IsInteger | ToLowerCase
            | ToUpperCase | Trim => &[Arity::Unary],
            StartsWith => &[Arity::Binary, Arity::Multi(1)],
            IndexOfChar | IndexOfString | LastIndexOfChar | LastIndexOfString => &[Arity::Binary, Arity::Multi(1)],
            Substring => &[Arity::Binary, Arity::Multi(1)],
            RegionMatches => &[Arity::Multi(4)],
            ReplaceChar | Replace | ReplaceAll | ReplaceFirst | ArrayStore => &[Arity::Multi(1)],
            _ => &[Arity::Binary],
        }
    }

    /// Validates the operand domains and returns the result domain.
    ///
    /// Fails with [`Error::ArityMismatch`] if the operand count is not one of
    /// [`arities`][Self::arities], and with [`Error::DomainMismatch`] if the
    /// domains do not fit any signature of the operator.
    pub fn result_domain(self, operands: &[Domain]) -> Result<Domain> {
        if !self.arities().iter().any(|a| a.operand_count() == operands.len()) {
            let expected = self
                .arities()
                .iter()
                .map(|a| a.operand_count().to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(Error::ArityMismatch {
                op: self,
                expected,
                found: operands.len(),
            });
        }

        use Operator::*;
        let domain = match (self, operands) {
            (Plus | Minus | Mul | Div | Rem | Max | Min, [I, I]) => I,
            (Plus | Minus | Mul | Div | Rem | Max | Min, [R, R]) => R,
            (Neg | Abs, [I]) => I,
            (Neg | Abs, [R]) => R,
            (Shl | Shr | UShr | BitAnd | BitOr | BitXor, [I, I]) => I,
            (IsDigit | IsLetter | NumericValue, [I]) => I,
            (Round | GetExponent, [R]) => I,
            (
                Acos | Asin | Atan | Cbrt | Ceil | Cos | Cosh | Exp | Expm1 | Floor | Log | Log10 | Log1p | NextUp
                | Rint | Signum | Sin | Sinh | Sqrt | Tan | Tanh | ToDegrees | ToRadians | Ulp,
                [R],
            ) => R,
            (Atan2 | CopySign | Hypot | IeeeRemainder | NextAfter | Pow | Scalb, [R, R]) => R,
            (Equals | EqualsIgnoreCase | StartsWith | EndsWith | Contains | Matches, [S, S]) => I,
            (StartsWith, [S, S, I]) => I,
            (RegionMatches, [S, S, I, I, I, I]) => I,
            (Length | IsInteger, [S]) => I,
            (CharAt, [S, I]) => I,
            (CompareTo | CompareToIgnoreCase, [S, S]) => I,
            (IndexOfChar | LastIndexOfChar, [S, I]) => I,
            (IndexOfChar | LastIndexOfChar, [S, I, I]) => I,
            (IndexOfString | LastIndexOfString, [S, S]) => I,
            (IndexOfString | LastIndexOfString, [S, S, I]) => I,
            (Concat | AppendString, [S, S]) => S,
            (AppendBoolean | AppendChar | AppendInteger, [S, I]) => S,
            (AppendReal, [S, R]) => S,
            (Substring, [S, I]) => S,
            (Substring, [S, I, I]) => S,
            (ReplaceChar, [S, I, I]) => S,
            (Replace | ReplaceAll | ReplaceFirst, [S, S, S]) => S,
            (ToLowerCase | ToUpperCase | Trim, [S]) => S,
            (ArraySelect, [IA, I]) => I,
            (ArraySelect, [RA, I]) => R,
            (ArraySelect, [SA, I]) => S,
            (ArrayStore, [IA, I, I]) => IA,
            (ArrayStore, [RA, I, R]) => RA,
            (ArrayStore, [SA, I, S]) => SA,
            _ => {
                let found = operands
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(Error::domain_mismatch(
                    format!("a signature of '{}'", self.symbol()),
                    format!("({})", found),
                ));
            }
        };
        Ok(domain)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
