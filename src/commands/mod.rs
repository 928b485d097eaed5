pub mod generate;
pub mod query;
