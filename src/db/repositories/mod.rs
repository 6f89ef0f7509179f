pub mod anime;
pub mod comment;
pub mod user;
