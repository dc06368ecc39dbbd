// Network adapter for the per-client session socket.

pub mod client;

pub use client::ws_handler;
