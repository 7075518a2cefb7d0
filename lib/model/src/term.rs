use crate::ArityMismatch;
use oxrdf::{Literal, NamedNode, Variable};
use std::collections::BTreeSet;
use std::fmt;

/// A constant of the term algebra: an IRI or a typed literal.
///
/// Mapping atoms in a virtual knowledge graph carry RDF terms, so constants
/// are modeled directly over the oxrdf data model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Iri(NamedNode),
    Literal(Literal),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Iri(iri) => write!(f, "{iri}"),
            Constant::Literal(literal) => write!(f, "{literal}"),
        }
    }
}

impl From<NamedNode> for Constant {
    fn from(iri: NamedNode) -> Self {
        Constant::Iri(iri)
    }
}

impl From<Literal> for Constant {
    fn from(literal: Literal) -> Self {
        Constant::Literal(literal)
    }
}

/// A function symbol with a fixed arity.
///
/// Two symbols are equal iff both their name and their arity agree, so an
/// arity mismatch between two functional terms surfaces as a symbol clash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionSymbol {
    name: String,
    arity: usize,
}

impl FunctionSymbol {
    /// Creates a [FunctionSymbol] from a name and an arity.
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A functional term: a [FunctionSymbol] applied to ordered arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionalTerm {
    symbol: FunctionSymbol,
    arguments: Vec<Term>,
}

impl FunctionalTerm {
    /// Creates a [FunctionalTerm], checking that the number of arguments
    /// matches the symbol's arity.
    pub fn new(symbol: FunctionSymbol, arguments: Vec<Term>) -> Result<Self, ArityMismatch> {
        if arguments.len() != symbol.arity() {
            return Err(ArityMismatch {
                expected: symbol.arity(),
                actual: arguments.len(),
            });
        }
        Ok(Self { symbol, arguments })
    }

    pub fn symbol(&self) -> &FunctionSymbol {
        &self.symbol
    }

    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }

    /// Rebuilds this term with arguments of the same length (a structural
    /// rewrite cannot change the arity).
    pub(crate) fn with_arguments_unchecked(&self, arguments: Vec<Term>) -> Self {
        debug_assert_eq!(arguments.len(), self.symbol.arity());
        Self {
            symbol: self.symbol.clone(),
            arguments,
        }
    }
}

impl fmt::Display for FunctionalTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.symbol.name())?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(")")
    }
}

/// An immutable term of the mapping algebra.
///
/// Equality is structural. A term is *ground* iff no [Variable] occurs in it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
    Functional(FunctionalTerm),
}

impl Term {
    /// Returns whether no variable occurs in this term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) => true,
            Term::Functional(functional) => functional.arguments().iter().all(Term::is_ground),
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(variable) => Some(variable),
            _ => None,
        }
    }

    /// Returns the set of variables occurring in this term.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut result = BTreeSet::new();
        self.collect_variables(&mut result);
        result
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Term::Variable(variable) => {
                out.insert(variable.clone());
            }
            Term::Constant(_) => {}
            Term::Functional(functional) => {
                for argument in functional.arguments() {
                    argument.collect_variables(out);
                }
            }
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(variable) => write!(f, "{variable}"),
            Term::Constant(constant) => write!(f, "{constant}"),
            Term::Functional(functional) => write!(f, "{functional}"),
        }
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Term::Variable(variable)
    }
}

impl From<Constant> for Term {
    fn from(constant: Constant) -> Self {
        Term::Constant(constant)
    }
}

impl From<NamedNode> for Term {
    fn from(iri: NamedNode) -> Self {
        Term::Constant(Constant::Iri(iri))
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Constant(Constant::Literal(literal))
    }
}

impl From<FunctionalTerm> for Term {
    fn from(functional: FunctionalTerm) -> Self {
        Term::Functional(functional)
    }
}
