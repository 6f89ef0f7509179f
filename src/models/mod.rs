pub mod anime;
pub mod comment;
