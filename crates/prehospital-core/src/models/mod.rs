pub mod activity;
pub mod form;
pub mod injury;
pub mod page;
pub mod user;
