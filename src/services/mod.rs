/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Session lifecycle and preference operations.
pub mod session_service;
/// Storage connection supervisor with reconnect backoff.
pub mod storage_supervisor;
