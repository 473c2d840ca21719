pub mod config;
pub mod errors;
pub mod sensor;
pub mod switch;
