use crate::Term;
use oxrdf::Variable;
use std::collections::BTreeSet;
use std::fmt;

/// An immutable boolean expression over terms, used by filter nodes and join
/// conditions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Equality(Term, Term),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    pub fn equality(left: impl Into<Term>, right: impl Into<Term>) -> Self {
        Expression::Equality(left.into(), right.into())
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or(Box::new(left), Box::new(right))
    }

    pub fn not(inner: Expression) -> Self {
        Expression::Not(Box::new(inner))
    }

    /// Folds expressions into one conjunction; `None` for an empty input.
    pub fn conjunction(expressions: impl IntoIterator<Item = Expression>) -> Option<Self> {
        expressions.into_iter().reduce(Expression::and)
    }

    /// Flattens nested conjunctions into their conjuncts, left to right.
    pub fn flatten_and(&self) -> Vec<&Expression> {
        let mut result = Vec::new();
        self.flatten_into(&mut result, true);
        result
    }

    /// Flattens nested disjunctions into their disjuncts, left to right.
    pub fn flatten_or(&self) -> Vec<&Expression> {
        let mut result = Vec::new();
        self.flatten_into(&mut result, false);
        result
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Expression>, conjunctive: bool) {
        match self {
            Expression::And(left, right) if conjunctive => {
                left.flatten_into(out, conjunctive);
                right.flatten_into(out, conjunctive);
            }
            Expression::Or(left, right) if !conjunctive => {
                left.flatten_into(out, conjunctive);
                right.flatten_into(out, conjunctive);
            }
            other => {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
    }

    /// Returns whether this is an equality between two variables.
    pub fn is_var_to_var_equality(&self) -> bool {
        matches!(
            self,
            Expression::Equality(Term::Variable(_), Term::Variable(_))
        )
    }

    /// Returns the set of variables occurring in this expression.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut result = BTreeSet::new();
        self.collect_variables(&mut result);
        result
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<Variable>) {
        match self {
            Expression::Equality(left, right) => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::And(left, right) | Expression::Or(left, right) => {
                left.collect_variables(out);
                right.collect_variables(out);
            }
            Expression::Not(inner) => inner.collect_variables(out),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Equality(left, right) => write!(f, "({left} = {right})"),
            Expression::And(left, right) => write!(f, "({left} AND {right})"),
            Expression::Or(left, right) => write!(f, "({left} OR {right})"),
            Expression::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}
