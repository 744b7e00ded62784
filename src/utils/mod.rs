mod csv_parser;
mod dummy_entries;
pub mod encoding;
mod exchange_data;
mod operation_helpers;
pub mod secret;

pub use csv_parser::parse_csv_to_entries;
pub use dummy_entries::generate_dummy_balances;
pub use exchange_data::{ExchangeData, ExchangeUser};
pub use operation_helpers::*;
