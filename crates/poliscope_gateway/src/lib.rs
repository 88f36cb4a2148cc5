#![forbid(unsafe_code)]

pub mod gateway;
pub mod http;
pub mod memory;

pub use gateway::{GatewayError, GatewayErrorKind, PolicyGateway};
pub use http::{HttpGatewayConfig, HttpPolicyGateway};
pub use memory::MemoryPolicyGateway;
