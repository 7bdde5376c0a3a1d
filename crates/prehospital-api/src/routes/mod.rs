pub mod forms;
pub mod health;
pub mod injuries;
pub mod session;
