pub mod beep;
pub mod config;
pub mod ring;
