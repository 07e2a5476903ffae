pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{banner, dim, header, info, section, success, summary_row};
pub use table::{rates_table, stamps_table, stats_table};
pub use theme::theme;
