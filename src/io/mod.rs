pub mod base;
pub mod oneof;
pub mod select;
pub mod tier;
