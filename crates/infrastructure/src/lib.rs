//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod fedora_connection;
mod fedora_rest_client;
mod in_memory_repository;
mod resource_index_client;
mod sparql;
mod tracing_run_observer;

pub use fedora_connection::{FedoraConnection, FedoraConnectionConfig};
pub use fedora_rest_client::FedoraRestClient;
pub use in_memory_repository::InMemoryRepository;
pub use resource_index_client::ResourceIndexClient;
pub use tracing_run_observer::TracingRunObserver;
