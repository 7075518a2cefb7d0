use crate::{AtomPredicate, Constant, FunctionSymbol, Term};
use thiserror::Error;

/// The number of supplied arguments does not match the declared arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} arguments, got {actual}")]
pub struct ArityMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Two terms (or atoms) cannot be made syntactically equal.
///
/// Unification failures are expected outcomes, not panics: callers
/// pattern-match on the reason and typically skip the rewrite that required
/// the unification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomUnificationError {
    #[error("cannot unify distinct constants {0} and {1}")]
    ConstantClash(Constant, Constant),
    #[error("cannot unify functional terms over distinct symbols {0} and {1}")]
    FunctionSymbolClash(FunctionSymbol, FunctionSymbol),
    #[error("cannot unify {0} with {1}")]
    IncompatibleShape(Term, Term),
    #[error("cannot unify atoms over distinct predicates {0} and {1}")]
    PredicateClash(AtomPredicate, AtomPredicate),
}
