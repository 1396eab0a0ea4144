// Daily-log API: accepts a free-text message, runs the extraction pipeline,
// stamps the server date, and persists the validated record.

pub mod handlers;
pub mod store;
