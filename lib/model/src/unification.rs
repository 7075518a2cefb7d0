use crate::{AtomUnificationError, DataAtom, Substitution, Term};

/// Computes the most general unifier of two terms.
///
/// When two distinct variables meet, the **left** operand's variable survives
/// as the representative (the right one is mapped onto it); repeated runs over
/// the same input therefore produce the same substitution. No occurs-check is
/// performed: terms are finite and non-self-referential by construction.
pub fn unify_terms(left: &Term, right: &Term) -> Result<Substitution, AtomUnificationError> {
    match (left, right) {
        (Term::Variable(l), Term::Variable(r)) => {
            if l == r {
                Ok(Substitution::empty())
            } else {
                Ok(Substitution::of(r.clone(), Term::Variable(l.clone())))
            }
        }
        (Term::Variable(variable), term) | (term, Term::Variable(variable)) => {
            Ok(Substitution::of(variable.clone(), term.clone()))
        }
        (Term::Constant(l), Term::Constant(r)) => {
            if l == r {
                Ok(Substitution::empty())
            } else {
                Err(AtomUnificationError::ConstantClash(l.clone(), r.clone()))
            }
        }
        (Term::Functional(l), Term::Functional(r)) => {
            if l.symbol() != r.symbol() {
                return Err(AtomUnificationError::FunctionSymbolClash(
                    l.symbol().clone(),
                    r.symbol().clone(),
                ));
            }
            unify_argument_lists(l.arguments(), r.arguments())
        }
        (Term::Constant(_), Term::Functional(_)) | (Term::Functional(_), Term::Constant(_)) => {
            Err(AtomUnificationError::IncompatibleShape(
                left.clone(),
                right.clone(),
            ))
        }
    }
}

/// Computes the most general unifier of two atoms over the same predicate.
pub fn unify_atoms(left: &DataAtom, right: &DataAtom) -> Result<Substitution, AtomUnificationError> {
    if left.predicate() != right.predicate() {
        return Err(AtomUnificationError::PredicateClash(
            left.predicate().clone(),
            right.predicate().clone(),
        ));
    }
    unify_argument_lists(left.arguments(), right.arguments())
}

fn unify_argument_lists(
    left: &[Term],
    right: &[Term],
) -> Result<Substitution, AtomUnificationError> {
    let mut unifier = Substitution::empty();
    for (l, r) in left.iter().zip(right) {
        let step = unify_terms(&unifier.apply_to_term(l), &unifier.apply_to_term(r))?;
        unifier = unifier.compose(&step);
    }
    Ok(unifier)
}
