//! Data Transfer Objects for REST request/response serialization.
//!
//! All numeric amounts are serialized as JSON strings to prevent
//! precision loss on u128 values.

pub mod common_dto;
pub mod ledger_dto;
pub mod order_dto;
pub mod pool_dto;
pub mod share_dto;

pub use common_dto::*;
pub use ledger_dto::*;
pub use order_dto::*;
pub use pool_dto::*;
pub use share_dto::*;
