//! Collaborators around the core: job-config loading, submission files and
//! the remote evaluation endpoint.

pub mod loader;
pub mod submission;
pub mod writer;
