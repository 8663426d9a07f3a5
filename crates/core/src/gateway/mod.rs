//! Gateway orchestration: endpoint resolution, failover and replay

pub mod ports;
pub mod resolver;
pub mod service;

pub use ports::RequestExecutor;
pub use resolver::EndpointResolver;
pub use service::Gateway;
