//! Typed records and result tables
//!
//! Every endpoint declares the record type its pages decode into. Records
//! project to flat rows (nested objects become `parent_child` columns) and,
//! through [`ResultTable::to_record_batch`], to Arrow.

mod market;
mod reference;
mod types;

pub use market::{AggregateBar, DailyOpenClose, GroupedDailyBar};
pub use reference::{Address, Branding, MarketHoliday, TickerDetails, TickerInfo, TickerType};
pub use types::{flatten_row, parse_rows, Record, ResultTable};

#[cfg(test)]
mod tests;
