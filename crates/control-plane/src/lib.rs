// EventDesk Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export) and integration tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Router assembly
pub mod app;

// Authentication module
pub mod auth;

// Server configuration
pub mod config;

// Services layer
pub mod services;
pub use services::AuthService;

// Storage layer
pub mod storage;

// Logging setup
pub mod telemetry;

// OpenAPI spec generation
pub mod openapi;
