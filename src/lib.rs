pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    assignment_service::AssignmentService, auth_service::AuthService, quiz_service::QuizService,
    upload_service::UploadService, url_service::UrlService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub assignment_service: AssignmentService,
    pub auth_service: AuthService,
    pub quiz_service: QuizService,
    pub upload_service: UploadService,
    pub url_service: UrlService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let assignment_service = AssignmentService::new(pool.clone());
        let auth_service = AuthService::new(pool.clone());
        let quiz_service = QuizService::new(pool.clone());
        let upload_service = UploadService::new(config.uploads_dir.clone());
        let url_service = UrlService::new(
            config.frontend_url.clone(),
            config.tinyurl_api_token.clone(),
            http_client,
        );

        Self {
            pool,
            assignment_service,
            auth_service,
            quiz_service,
            upload_service,
            url_service,
        }
    }
}
