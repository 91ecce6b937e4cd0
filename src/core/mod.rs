pub mod column;
pub mod sweep;
pub mod table;
