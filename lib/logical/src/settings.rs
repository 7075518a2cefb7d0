/// Controls whether a rewrite may change the multiplicity of query answers.
///
/// Unifying substitutions only rename tuples and are always safe; removing a
/// join operand can change how often an answer is reported, so leaf removal
/// is reserved for the [Loose](CardinalityPreservationMode::Loose) mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CardinalityPreservationMode {
    /// Multiplicities must be preserved exactly.
    #[default]
    Strict,
    /// Multiplicities may change; answers themselves may not.
    Loose,
}

/// Configuration of the rewrite rules.
///
/// A rule is a stateless value holding only its settings; construct it
/// explicitly and pass it to the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizerSettings {
    pub cardinality_preservation: CardinalityPreservationMode,
}

impl OptimizerSettings {
    pub fn new(cardinality_preservation: CardinalityPreservationMode) -> Self {
        Self {
            cardinality_preservation,
        }
    }
}
