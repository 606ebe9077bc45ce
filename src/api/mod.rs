//! Outbound calls to upstream services.

pub mod forward;

pub use forward::ForwardingProxy;
