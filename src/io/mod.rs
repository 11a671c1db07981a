//! Storage adapters: the delimited-text table codec and the store interface
//! built on top of it.

pub mod store;
pub mod table;
