//! Inventory domain module.
//!
//! This crate contains business rules for construction-material stock, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod material;
pub mod transaction;

pub use category::Category;
pub use material::{Material, MaterialDraft, MaterialPatch};
pub use transaction::{
    parse_date, Movement, MovementDetail, MovementRequest, Transaction, TransactionKind,
    ValidMovement,
};
