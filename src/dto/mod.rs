pub mod api;
pub mod assignment_dto;
pub mod auth_dto;
pub mod quiz_dto;
