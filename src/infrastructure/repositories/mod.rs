//! Repository implementations using SeaORM

pub mod ip_repository;
pub mod network_repository;

pub use ip_repository::SeaOrmIpRepository;
pub use network_repository::SeaOrmNetworkRepository;
