//! Change propagation: impact analysis over the dependency graph and
//! all-or-nothing application of the resulting fixes

pub mod engine;
pub mod patch;
pub mod references;
pub mod risk;
pub mod signature;
pub mod source;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
pub mod tests;

pub use engine::{PropagationEngine, DEFAULT_CRITICAL_THRESHOLD};
pub use patch::PatchApplier;
pub use references::WordMatcher;
pub use signature::{parse_params, Arity};
pub use source::{FsSource, SourceProvider};
