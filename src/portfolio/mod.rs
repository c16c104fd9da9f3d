pub mod position;
pub mod valuation;

pub use position::{net_size, total_value, OpeningSnapshot, Position, PositionSpec};
pub use valuation::{opening_value, position_value};
