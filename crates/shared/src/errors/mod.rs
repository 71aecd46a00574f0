mod error;
mod http;
mod order;
mod repository;
mod service;

pub use self::error::ErrorResponse;
pub use self::http::HttpError;
pub use self::order::OrderError;
pub use self::repository::RepositoryError;
pub use self::service::ServiceError;
