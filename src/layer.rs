//! Tower-native store-and-forward layer.
//!
//! Expresses the interceptor hook contract as a `tower` middleware: the
//! service wraps an inner transport service, captures capturable failures
//! on the way out, and flushes the queue whenever a response comes back
//! successfully. The inner outcome always reaches the caller unchanged.

use crate::descriptor::{Rejection, RequestDescriptor, Response};
use crate::interceptor::Interceptor;
use futures::future::BoxFuture;
use tower_layer::Layer;
use tower_service::Service;

/// Layer wrapping an inner request service with capture and replay hooks.
#[derive(Debug, Clone)]
pub struct StoreAndForwardLayer {
    interceptor: Interceptor,
}

impl StoreAndForwardLayer {
    pub fn new(interceptor: Interceptor) -> Self {
        Self { interceptor }
    }
}

impl<S> Layer<S> for StoreAndForwardLayer {
    type Service = StoreAndForwardService<S>;

    fn layer(&self, service: S) -> Self::Service {
        StoreAndForwardService { inner: service, interceptor: self.interceptor.clone() }
    }
}

/// Service produced by [`StoreAndForwardLayer`].
#[derive(Debug, Clone)]
pub struct StoreAndForwardService<S> {
    inner: S,
    interceptor: Interceptor,
}

impl<S> Service<RequestDescriptor> for StoreAndForwardService<S>
where
    S: Service<RequestDescriptor, Response = Response> + Clone + Send + 'static,
    S::Error: Into<Rejection> + Send,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Rejection;
    type Future = BoxFuture<'static, Result<Response, Rejection>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: RequestDescriptor) -> Self::Future {
        let interceptor = self.interceptor.clone();
        let mut inner = self.inner.clone();
        Box::pin(async move {
            match inner.call(request).await {
                Ok(response) => Ok(interceptor.on_response_success(response).await),
                Err(err) => Err(interceptor.on_response_error(err.into())),
            }
        })
    }
}
