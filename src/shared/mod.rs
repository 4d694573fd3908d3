pub mod api_error;
pub mod config;
pub mod database;
pub mod hash_worker;
pub mod http_error;
pub mod middleware;
pub mod repository_error;
pub mod role;
pub mod rto;
pub mod static_files;
pub mod upload;
pub mod validation;
