// Public job search, job detail, applying and withdrawing applications.

pub mod filter;
pub mod handlers;
