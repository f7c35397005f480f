pub mod inference_client;
pub mod presentation;
pub mod preview_service;
pub mod session;
pub mod session_driver;
