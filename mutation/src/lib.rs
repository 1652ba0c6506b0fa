//! rowpool Mutation
//!
//! Build the write instructions a transform hands back for one row.
//!
//! Responsibilities:
//! - Describe inserts, updates and deletes against one table
//! - Encode composite column values before they reach a scalar column
//! - Coerce a transform's return value into an ordered instruction list
//!
//! # Module Structure
//!
//! - `instruction` - MutationInstruction, SerializedRow and IntoMutations
//! - `builder` - MutationBuilder, the per-table constructor set
//! - `serializer` - Serializer trait, JsonSerializer and `serialize`
//! - `error` - Error types for mutation failures

mod builder;
mod error;
mod instruction;
mod serializer;

pub use builder::MutationBuilder;
pub use error::{MutationError, MutationResult};
pub use instruction::{IntoMutations, MutationInstruction, SerializedRow};
pub use serializer::{serialize, JsonSerializer, Serializer};
