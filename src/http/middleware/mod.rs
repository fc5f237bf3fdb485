//! Request-interception middleware.

pub mod activity;

pub use activity::track_activity;
