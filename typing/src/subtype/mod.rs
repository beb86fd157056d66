//! The sub-typing pipeline.
//!
//! A sub-type is derived from a parent type by threading a
//! [`SubTypeWorkBench`] through [`Rename`], [`UpdateNamespace`] and
//! [`MutateSymbols`], then handing it to [`finalize`]. Each work bench owns
//! its builder and table until finalisation, so derivations from the same
//! parent never observe each other.

mod mutation;
mod steps;
mod workbench;

pub use mutation::{Mutation, MutationEffect, Mutator};
pub use steps::{
    combine_tag_names, finalize, MutateSymbols, Rename, SubTypePipeline, SubTypeStep,
    UpdateNamespace,
};
pub use workbench::{SubTypeStage, SubTypeWorkBench};
