//! The injected request transport.

use crate::descriptor::{Rejection, RequestDescriptor, Response};
use async_trait::async_trait;

/// Asynchronous request transport, supplied by the host application.
///
/// A `send` suspends until the exchange completes; no timeout is imposed
/// here, so hosts should layer one onto their transport. A [`Rejection`]
/// must echo the request it was built from so capture can persist it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<Response, Rejection>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: RequestDescriptor) -> Result<Response, Rejection> {
        (**self).send(request).await
    }
}
