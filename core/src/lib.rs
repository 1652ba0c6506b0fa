//! rowpool core types
//!
//! This crate provides the foundational types shared by every rowpool crate:
//! - Value types (the Value enum with scalar and composite shapes)
//! - Identity types (RowId, ConnectionId)
//! - Row structures (stored Row, dispatched WorkItem)

mod id;
mod row;
mod value;

pub use id::*;
pub use row::*;
pub use value::*;
