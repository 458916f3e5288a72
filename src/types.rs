//! Value domains, concrete values and variable identifiers.
//!
//! Every expression lives in exactly one [`Domain`]. The concrete representation
//! of a domain is fixed: 64-bit signed integers, 64-bit IEEE-754 floats,
//! character sequences and arrays of each of the three. String predicates and character classifications produce
//! integers (`1` for true, `0` for false), as the instrumented runtime does.
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

pub const TRUE_VALUE: i64 = 1;
pub const FALSE_VALUE: i64 = 0;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Domain {
    Integer,
    Real,
    String,
    IntegerArray,
    RealArray,
    StringArray,
}

impl Domain {
    /// Element domain of an array domain.
    pub fn element(self) -> Option<Domain> {
        match self {
            Domain::IntegerArray => Some(Domain::Integer),
            Domain::RealArray => Some(Domain::Real),
            Domain::StringArray => Some(Domain::String),
            _ => None,
        }
    }

    pub fn is_array(self) -> bool {
        self.element().is_some()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Integer => write!(f, "Integer"),
            Domain::Real => write!(f, "Real"),
            Domain::String => write!(f, "String"),
            Domain::IntegerArray => write!(f, "Integer[]"),
            Domain::RealArray => write!(f, "Real[]"),
            Domain::StringArray => write!(f, "String[]"),
        }
    }
}

/// A concrete value of one of the three domains.
///
/// Equality and hashing are *structural*: reals compare by bit pattern, so
/// `NaN == NaN` and `0.0 != -0.0`. This is what "reproduces the cached value
/// exactly" means; use the comparators for numeric comparison.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Str(String),
    IntegerArray(Vec<i64>),
    RealArray(Vec<f64>),
    StrArray(Vec<String>),
}

impl Value {
    pub fn domain(&self) -> Domain {
        match self {
            Value::Integer(_) => Domain::Integer,
            Value::Real(_) => Domain::Real,
            Value::Str(_) => Domain::String,
            Value::IntegerArray(_) => Domain::IntegerArray,
            Value::RealArray(_) => Domain::RealArray,
            Value::StrArray(_) => Domain::StringArray,
        }
    }

    pub fn bool(b: bool) -> Self {
        Value::Integer(if b { TRUE_VALUE } else { FALSE_VALUE })
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Integer(v) => Ok(*v),
            other => Err(Error::domain_mismatch(Domain::Integer, other.domain())),
        }
    }

    pub fn as_real(&self) -> Result<f64> {
        match self {
            Value::Real(v) => Ok(*v),
            other => Err(Error::domain_mismatch(Domain::Real, other.domain())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::domain_mismatch(Domain::String, other.domain())),
        }
    }

    /// Checks that the value belongs to `domain`.
    pub fn expect_domain(self, domain: Domain) -> Result<Self> {
        if self.domain() == domain {
            Ok(self)
        } else {
            Err(Error::domain_mismatch(domain, self.domain()))
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::IntegerArray(a), Value::IntegerArray(b)) => a == b,
            (Value::RealArray(a), Value::RealArray(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::StrArray(a), Value::StrArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(v) => v.hash(state),
            Value::Real(v) => v.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::IntegerArray(a) => a.hash(state),
            Value::RealArray(a) => {
                a.len().hash(state);
                a.iter().for_each(|x| x.to_bits().hash(state));
            }
            Value::StrArray(a) => a.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::Real(v) => write!(f, "{}", crate::semantics::real_to_string(*v)),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::IntegerArray(a) => write_list(f, a.iter()),
            Value::RealArray(a) => write_list(f, a.iter().map(|&x| crate::semantics::real_to_string(x))),
            Value::StrArray(a) => write_list(f, a.iter().map(|s| format!("{:?}", s))),
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = T>) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<i64>> for Value {
    fn from(a: Vec<i64>) -> Self {
        Value::IntegerArray(a)
    }
}

impl From<Vec<f64>> for Value {
    fn from(a: Vec<f64>) -> Self {
        Value::RealArray(a)
    }
}

impl From<Vec<String>> for Value {
    fn from(a: Vec<String>) -> Self {
        Value::StrArray(a)
    }
}

/// A symbolic input identifier.
///
/// Identifiers are stable within one arena: every reference to the same input
/// (by name) resolves to the same `VarId`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(u32);

impl VarId {
    pub fn new(id: u32) -> Self {
        VarId(id)
    }

    /// Returns the raw identifier.
    pub fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<VarId> for u32 {
    fn from(var: VarId) -> Self {
        var.0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    use test_log::test;

    #[test]
    fn test_value_domain() {
        assert_eq!(Value::from(1).domain(), Domain::Integer);
        assert_eq!(Value::from(1.5).domain(), Domain::Real);
        assert_eq!(Value::from("x").domain(), Domain::String);
        assert_eq!(Value::bool(true), Value::Integer(1));
        assert_eq!(Value::bool(false), Value::Integer(0));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::from(7).as_int(), Ok(7));
        assert!(Value::from(7).as_real().is_err());
        assert_eq!(Value::from("abc").as_str(), Ok("abc"));
        assert!(matches!(
            Value::from(2.0).expect_domain(Domain::String),
            Err(Error::DomainMismatch { .. })
        ));
    }

    #[test]
    fn test_structural_equality_of_reals() {
        assert_eq!(Value::Real(f64::NAN), Value::Real(f64::NAN));
        assert_ne!(Value::Real(0.0), Value::Real(-0.0));
        assert_ne!(Value::Integer(1), Value::Real(1.0));

        let set: HashSet<Value> = [Value::Real(f64::NAN), Value::Real(f64::NAN), Value::from(1)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_arrays() {
        let ints = Value::from(vec![1i64, 2, 3]);
        assert_eq!(ints.domain(), Domain::IntegerArray);
        assert_eq!(ints.to_string(), "[1, 2, 3]");
        assert_eq!(Value::from(vec![0.5, f64::NAN]), Value::from(vec![0.5, f64::NAN]));
        assert_ne!(Value::from(vec![0.0]), Value::from(vec![-0.0]));
        assert_eq!(Value::from(vec!["a".to_string()]).to_string(), "[\"a\"]");
        assert_ne!(Value::from(Vec::<i64>::new()), Value::from(Vec::<f64>::new()));

        assert_eq!(Domain::RealArray.element(), Some(Domain::Real));
        assert_eq!(Domain::String.element(), None);
        assert!(Domain::StringArray.is_array());
        assert_eq!(Domain::IntegerArray.to_string(), "Integer[]");
    }

    #[test]
    fn test_var_id() {
        let v1 = VarId::new(1);
        let v2 = VarId::new(2);
        assert_eq!(v1.id(), 1);
        assert!(v1 < v2);
        assert_eq!(v2.to_string(), "v2");
    }
}
