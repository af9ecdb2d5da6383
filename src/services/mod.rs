pub mod assignment_service;
pub mod auth_service;
pub mod policy;
pub mod quiz_service;
pub mod upload_service;
pub mod url_service;
