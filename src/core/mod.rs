//! Shared infrastructure with no knowledge of the language.

mod reactive;

pub use reactive::{CycleError, ReactiveCache};
