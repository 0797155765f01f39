pub mod access;
pub mod document;
