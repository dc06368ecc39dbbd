// Frameworks layer: runtime bootstrap, env config, and the HTTP server.

pub mod config;
pub mod server;
