pub mod csv_read;
pub mod csv_write;

pub use csv_read::{ReadReport, read_table, read_table_from_reader};
pub use csv_write::{write_report, write_table};
