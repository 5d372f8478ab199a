pub mod health;
pub mod runbooks;
