//! Typed helpers for the `/api/v1` endpoints.

pub mod auth;
pub mod entities;
pub mod push;
pub mod resources;
pub mod uploads;

pub use auth::{AuthResponse, GoogleAuthRequest, LoginRequest, RegisterRequest, UserProfile};
pub use entities::{EntityKind, EntityValidation};
pub use push::{PushKeys, PushSubscription};
pub use resources::{JsonRecord, ResourceScope, extract_records};
pub use uploads::{CSV_MIME_TYPE, UploadSummary};
