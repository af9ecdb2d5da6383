pub mod assignments;
pub mod auth;
pub mod health;
pub mod quizzes;
