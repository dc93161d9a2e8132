pub mod ast;
pub mod lower;
pub mod serialize;
pub mod walker;
