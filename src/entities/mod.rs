pub mod prelude;

pub mod anime;
pub mod comments;
pub mod users;
