//! Domain Layer - Value types shared by the engine and its collaborators
//!
//! Pure data with no I/O. All external interactions happen through the
//! ports layer.

pub mod tick;
pub mod trade;
pub mod signal;
pub mod position;
pub mod audit;

pub use tick::Tick;
pub use trade::{TradeIntent, OrderSide, LimitPrice};
pub use signal::ActionTag;
pub use position::SpreadPosition;
pub use audit::{AuditRecord, AUDIT_HEADER};
