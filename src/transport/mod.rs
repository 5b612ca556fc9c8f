pub mod tcp;
pub mod traits;

pub use tcp::TcpConnector;
pub use traits::TransportConnector;
