//! Presentation Layer
//!
//! The HTTP surface (C10, §6): axum handlers, middleware, and router
//! assembly. Everything here is a thin translation from `AppState`'s
//! domain/application services to request/response bytes.

pub mod http;
