pub mod config_item;
pub mod question;
pub mod quiz;
pub mod user;
pub mod user_quiz_assignment;
