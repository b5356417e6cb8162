pub mod conversion;
pub mod observability;
pub mod speech;
pub mod storage;
