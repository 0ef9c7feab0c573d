// Admin management: dashboard stats, job CRUD, users and application review.

pub mod handlers;
pub mod validation;
