use crate::{ArityMismatch, Constant, Term};
use oxrdf::vocab::rdf;
use oxrdf::{NamedNode, Variable};
use std::collections::BTreeSet;
use std::fmt;

/// The predicate of a [DataAtom]: a name with a fixed arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomPredicate {
    name: String,
    arity: usize,
}

impl AtomPredicate {
    /// Creates an [AtomPredicate] from a name and an arity.
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

impl fmt::Display for AtomPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// An atom over an [AtomPredicate] with as many arguments as the predicate's
/// arity. Immutable; equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DataAtom {
    predicate: AtomPredicate,
    arguments: Vec<Term>,
}

impl DataAtom {
    /// Creates a [DataAtom], checking the argument count against the
    /// predicate's arity.
    pub fn new(predicate: AtomPredicate, arguments: Vec<Term>) -> Result<Self, ArityMismatch> {
        if arguments.len() != predicate.arity() {
            return Err(ArityMismatch {
                expected: predicate.arity(),
                actual: arguments.len(),
            });
        }
        Ok(Self {
            predicate,
            arguments,
        })
    }

    pub fn predicate(&self) -> &AtomPredicate {
        &self.predicate
    }

    pub fn arguments(&self) -> &[Term] {
        &self.arguments
    }

    /// Returns a copy of this atom with new arguments.
    pub fn with_arguments(&self, arguments: Vec<Term>) -> Result<Self, ArityMismatch> {
        Self::new(self.predicate.clone(), arguments)
    }

    /// Rebuilds this atom with arguments of the same length (a structural
    /// rewrite cannot change the arity).
    pub(crate) fn with_arguments_unchecked(&self, arguments: Vec<Term>) -> Self {
        debug_assert_eq!(arguments.len(), self.predicate.arity());
        Self {
            predicate: self.predicate.clone(),
            arguments,
        }
    }

    /// Returns the set of variables occurring among the arguments.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut result = BTreeSet::new();
        for argument in &self.arguments {
            argument.collect_variables(&mut result);
        }
        result
    }
}

impl fmt::Display for DataAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate.name())?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_str(")")
    }
}

/// Abstraction for triples, quads and so on.
///
/// Mapping-to-algebra translation addresses the subject/property/object slots
/// of a tuple predicate without hard-coding its arity; implementations fix the
/// slot positions once.
pub trait RdfAtomPredicate {
    fn predicate(&self) -> &AtomPredicate;

    fn subject<'a, T>(&self, arguments: &'a [T]) -> &'a T;

    fn property<'a, T>(&self, arguments: &'a [T]) -> &'a T;

    fn object<'a, T>(&self, arguments: &'a [T]) -> &'a T;

    /// The graph slot, for predicates that carry one.
    fn graph<'a, T>(&self, arguments: &'a [T]) -> Option<&'a T> {
        let _ = arguments;
        None
    }

    /// Extracts the property IRI when the property slot holds one.
    fn property_iri<'a>(&self, arguments: &'a [Term]) -> Option<&'a NamedNode> {
        match self.property(arguments) {
            Term::Constant(Constant::Iri(iri)) => Some(iri),
            _ => None,
        }
    }

    /// Extracts the class IRI of an `rdf:type` atom.
    fn class_iri<'a>(&self, arguments: &'a [Term]) -> Option<&'a NamedNode> {
        let property = self.property_iri(arguments)?;
        if property.as_ref() != rdf::TYPE {
            return None;
        }
        match self.object(arguments) {
            Term::Constant(Constant::Iri(iri)) => Some(iri),
            _ => None,
        }
    }

    /// Returns the arguments with new subject, property and object slots.
    fn update_spo<T: Clone>(&self, arguments: &[T], subject: T, property: T, object: T) -> Vec<T>;

    /// Returns the arguments with new subject and object slots.
    fn update_so<T: Clone>(&self, arguments: &[T], subject: T, object: T) -> Vec<T> {
        let property = self.property(arguments).clone();
        self.update_spo(arguments, subject, property, object)
    }
}

/// The subject–property–object triple predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriplePredicate(AtomPredicate);

impl TriplePredicate {
    pub fn new(name: impl Into<String>) -> Self {
        Self(AtomPredicate::new(name, 3))
    }
}

impl RdfAtomPredicate for TriplePredicate {
    fn predicate(&self) -> &AtomPredicate {
        &self.0
    }

    fn subject<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[0]
    }

    fn property<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[1]
    }

    fn object<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[2]
    }

    fn update_spo<T: Clone>(&self, _arguments: &[T], subject: T, property: T, object: T) -> Vec<T> {
        vec![subject, property, object]
    }
}

/// The subject–property–object–graph quad predicate.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuadPredicate(AtomPredicate);

impl QuadPredicate {
    pub fn new(name: impl Into<String>) -> Self {
        Self(AtomPredicate::new(name, 4))
    }
}

impl RdfAtomPredicate for QuadPredicate {
    fn predicate(&self) -> &AtomPredicate {
        &self.0
    }

    fn subject<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[0]
    }

    fn property<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[1]
    }

    fn object<'a, T>(&self, arguments: &'a [T]) -> &'a T {
        &arguments[2]
    }

    fn graph<'a, T>(&self, arguments: &'a [T]) -> Option<&'a T> {
        Some(&arguments[3])
    }

    fn update_spo<T: Clone>(&self, arguments: &[T], subject: T, property: T, object: T) -> Vec<T> {
        vec![subject, property, object, arguments[3].clone()]
    }
}
