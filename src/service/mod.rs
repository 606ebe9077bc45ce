pub mod auth_backend;
pub mod path_resolver;
