pub mod clickhouse_repo;

pub use clickhouse_repo::*;
