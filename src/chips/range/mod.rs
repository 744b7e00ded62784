pub mod range_check;
mod tests;
pub mod utils;
