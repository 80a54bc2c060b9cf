pub mod apiconnect;
pub mod gateway;
pub mod metrics;

pub use apiconnect::ApiConnectConnector;
pub use gateway::{AccountGateway, AccountSession, BrokerApi, BrokerConnector, GatewayError};
