// Authentication: password hashing, session tokens, request extractors and the /api/auth routes.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod token;
pub mod validation;
