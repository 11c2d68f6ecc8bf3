pub mod dispatcher;
pub mod health;
