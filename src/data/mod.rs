pub mod bar;
pub mod columns;
pub mod loader;
pub mod source;

pub use bar::{resolve_bar, BarData, PriceType, ResolvedBarDatum};
pub use columns::{close_prices, to_columns};
pub use loader::{group_by_date, load_csv, CsvBarSource};
pub use source::{BarSource, IterSource};
