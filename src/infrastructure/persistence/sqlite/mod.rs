//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod feedback_repo;

pub use database::*;
pub use feedback_repo::*;
