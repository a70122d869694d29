pub mod correlation_id;
pub mod edit_timestamp;
pub mod parent_id;

pub use correlation_id::CorrelationId;
pub use edit_timestamp::EditTimestamp;
pub use parent_id::ParentId;
