#![doc = include_str!("../README.md")]

pub mod model {
    pub use ontorel_model::*;
}

pub mod dbschema {
    pub use ontorel_dbschema::*;
}

pub mod logical {
    pub use ontorel_logical::*;
}
