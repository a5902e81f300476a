pub mod blogs;
pub mod catalog;
pub mod health;
pub mod users;
