pub mod database;
pub mod lifecycle;
pub mod storage;
