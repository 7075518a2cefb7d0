mod atom;
mod error;
mod expression;
mod substitution;
mod term;
mod unification;

pub use atom::*;
pub use error::*;
pub use expression::*;
pub use substitution::*;
pub use term::*;
pub use unification::*;

// Re-export the oxrdf types the term algebra is built on.
pub use oxrdf::vocab;
pub use oxrdf::{
    IriParseError, Literal, LiteralRef, NamedNode, NamedNodeRef, Variable,
    VariableNameParseError, VariableRef,
};
