mod client;
mod error;
mod transport;

pub use client::ApiClient;
#[cfg(test)]
pub(crate) use client::mock;
pub use error::ApiError;
pub use transport::{HttpTransport, Method, ReqwestTransport};
