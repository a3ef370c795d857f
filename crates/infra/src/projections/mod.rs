//! Read-only projections over the ledger.
//!
//! Projections never mutate materials or transactions. They are:
//! - **Rebuildable**: recomputed from an owner snapshot on every call
//! - **Owner-isolated**: a snapshot only ever holds one owner's records

pub mod dashboard;

pub use dashboard::{
    CategoryTotal, Dashboard, DashboardAggregator, DashboardSummary, MonthlyMovement,
    RecentTransaction, StockLevel,
};
