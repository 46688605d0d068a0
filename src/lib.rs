//! Demonstration container server
//!
//! Reports where the container is deployed and flips its health endpoint to
//! "draining" on the first termination signal so an external load balancer
//! can stop routing traffic before the process exits.

pub mod config;
pub mod server;
