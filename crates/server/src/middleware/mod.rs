//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, capture errors)
//! 2. CORS (answer preflights before anything else runs)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span)
//!
//! Authentication is an extractor ([`RequireAuth`]) rather than a layer, so
//! public routes never touch it.

pub mod auth;
pub mod cors;
pub mod request_id;

pub use auth::RequireAuth;
pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
