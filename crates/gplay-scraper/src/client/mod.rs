//! Default collaborators and the high-level entry points.
//!
//! [`PlayClient`] is the reqwest-backed [`Fetcher`](crate::fetch::Fetcher);
//! [`AppClient`] builds each request, fetches it, and hands the body to the
//! matching extractor.

mod app;
mod play;

pub use app::{AppClient, AppOptions, ReviewsOptions};
pub use play::PlayClient;
