//! Utility functions and helpers

pub mod command;

pub use command::{CommandError, CommandRunner};

/// Count occurrences of each key, preserving lexical order in the output
pub fn tally<I, K>(keys: I) -> std::collections::BTreeMap<String, usize>
where
    I: IntoIterator<Item = K>,
    K: Into<String>,
{
    let mut counts = std::collections::BTreeMap::new();
    for key in keys {
        *counts.entry(key.into()).or_insert(0) += 1;
    }
    counts
}
