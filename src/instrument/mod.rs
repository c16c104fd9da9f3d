pub mod contract;

pub use contract::{ContractBook, ContractSpec, MarginSpec};
