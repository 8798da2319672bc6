// azbrowse-api: Async client for the Azure Resource Manager REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{ArmClient, DEFAULT_ENDPOINT, SUBSCRIPTIONS_PATH, decode};
pub use error::Error;
pub use models::{
    Deployment, GenericResource, ListResponse, Operation, OperationDisplay, Provider,
    ProviderResourceType, ResourceGroup, Subscription,
};
pub use transport::TransportConfig;
