//! Terminal presentation for the command line

pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, graph_updated, header, info, section, success, summary_row, timing, warn};
pub use progress::Spinner;
pub use table::{CountTable, count_table, stats_table};
pub use theme::{Theme, theme};
