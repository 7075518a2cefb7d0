use crate::{unify_terms, AtomUnificationError, DataAtom, Expression, Term};
use oxrdf::Variable;
use std::collections::BTreeMap;
use std::fmt;

/// An immutable mapping from variables to terms.
///
/// No variable maps to itself (identity entries are pruned on construction).
/// Iteration follows the variables' order, so repeated runs over the same
/// input produce identical results — required for reproducible rewrites and
/// stable column naming downstream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: BTreeMap<Variable, Term>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a single-entry substitution. An identity entry yields the
    /// empty substitution.
    pub fn of(variable: Variable, term: impl Into<Term>) -> Self {
        let term = term.into();
        let mut map = BTreeMap::new();
        if term.as_variable() != Some(&variable) {
            map.insert(variable, term);
        }
        Self { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn get(&self, variable: &Variable) -> Option<&Term> {
        self.map.get(variable)
    }

    /// The variables this substitution rewrites, in order.
    pub fn domain(&self) -> impl Iterator<Item = &Variable> {
        self.map.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.map.iter()
    }

    /// Applies this substitution to a variable.
    pub fn apply_to_variable(&self, variable: &Variable) -> Term {
        self.map
            .get(variable)
            .cloned()
            .unwrap_or_else(|| Term::Variable(variable.clone()))
    }

    /// Applies this substitution to a term. Application is a structural
    /// rewrite; ground terms come back unchanged.
    pub fn apply_to_term(&self, term: &Term) -> Term {
        match term {
            Term::Variable(variable) => self.apply_to_variable(variable),
            Term::Constant(_) => term.clone(),
            Term::Functional(functional) => {
                let arguments = functional
                    .arguments()
                    .iter()
                    .map(|argument| self.apply_to_term(argument))
                    .collect();
                Term::Functional(functional.with_arguments_unchecked(arguments))
            }
        }
    }

    /// Applies this substitution to every argument of an atom.
    pub fn apply_to_atom(&self, atom: &DataAtom) -> DataAtom {
        let arguments = atom
            .arguments()
            .iter()
            .map(|argument| self.apply_to_term(argument))
            .collect();
        atom.with_arguments_unchecked(arguments)
    }

    /// Applies this substitution to every term of an expression.
    pub fn apply_to_expression(&self, expression: &Expression) -> Expression {
        match expression {
            Expression::Equality(left, right) => {
                Expression::Equality(self.apply_to_term(left), self.apply_to_term(right))
            }
            Expression::And(left, right) => Expression::and(
                self.apply_to_expression(left),
                self.apply_to_expression(right),
            ),
            Expression::Or(left, right) => Expression::or(
                self.apply_to_expression(left),
                self.apply_to_expression(right),
            ),
            Expression::Not(inner) => Expression::not(self.apply_to_expression(inner)),
        }
    }

    /// Sequential composition: the result maps `x` to `other(self(x))`.
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut map = BTreeMap::new();
        for (variable, term) in &self.map {
            let composed = other.apply_to_term(term);
            if composed.as_variable() != Some(variable) {
                map.insert(variable.clone(), composed);
            }
        }
        for (variable, term) in &other.map {
            if !self.map.contains_key(variable) {
                map.insert(variable.clone(), term.clone());
            }
        }
        Self { map }
    }

    /// Unifies two substitutions into one that entails both.
    ///
    /// A binding for a fresh variable is inserted with its orientation
    /// preserved; a binding for an already-bound variable is reconciled by
    /// unifying the two images. Fails when a shared variable maps to
    /// irreconcilable terms — the caller must treat this as a unification
    /// failure, never drop it silently.
    pub fn merge(&self, other: &Substitution) -> Result<Substitution, AtomUnificationError> {
        let mut result = self.clone();
        for (variable, term) in &other.map {
            let target = result.apply_to_term(term);
            let step = match result.map.get(variable) {
                None => Substitution::of(variable.clone(), target),
                Some(image) => unify_terms(&image.clone(), &target)?,
            };
            result = result.compose(&step);
        }
        Ok(result)
    }
}

impl FromIterator<(Variable, Term)> for Substitution {
    /// Collects `(variable, term)` pairs; identity entries are pruned and a
    /// later pair for the same variable wins.
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        let mut map = BTreeMap::new();
        for (variable, term) in iter {
            if term.as_variable() == Some(&variable) {
                map.remove(&variable);
            } else {
                map.insert(variable, term);
            }
        }
        Self { map }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (variable, term)) in self.map.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{variable} := {term}")?;
        }
        f.write_str("}")
    }
}
