//! In-memory spreadsheet layout of the usage report.
//!
//! ```text
//! row 1-2 | Interval  | Non-TOU     |   | TOU Off-Peak           |   | TOU Super-Off-Peak                   |
//!         |           | All Hours   |   | Peak      | Off-Peak   |   | Peak     | Off-Peak | Super-Off-Peak |
//! row 3   | Total kWh | SUM | SUM   |   | SUM | SUM | SUM | SUM  |   | ...                                  |
//! row 4   | Net kWh   | =B3-C3      |   | =E3-F3    | =G3-H3     |   | ...                                  |
//! row 5   | Timestamp | Consumed | Generated | ...                                                          |
//! row 6.. | data rows                                                                                       |
//! ```

pub mod builder;
pub mod columns;
pub mod layout;

pub use builder::ReportBuilder;
pub use columns::ColumnMap;
pub use layout::{Borders, CellRange, CellValue, HeaderCell, ReportLayout, ReportRow};
