pub use super::anime::Entity as Anime;
pub use super::comments::Entity as Comments;
pub use super::users::Entity as Users;
