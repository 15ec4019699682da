//! Client stub for the `shimrpc.Registrar` service

use tonic::codegen::*;

/// Unary client for `shimrpc.Registrar`
#[derive(Debug, Clone)]
pub struct RegistrarClient<T> {
    inner: tonic::client::Grpc<T>,
}

impl<T> RegistrarClient<T>
where
    T: tonic::client::GrpcService<tonic::body::BoxBody>,
    T::Error: Into<StdError>,
    T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
    <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
{
    /// Wrap an established transport
    pub fn new(inner: T) -> Self {
        let inner = tonic::client::Grpc::new(inner);
        Self { inner }
    }

    /// Register or deregister one endpoint mapping
    pub async fn register(
        &mut self,
        request: impl tonic::IntoRequest<crate::RegistrarRequest>,
    ) -> std::result::Result<tonic::Response<crate::RegistrarResponse>, tonic::Status> {
        self.inner.ready().await.map_err(|e| {
            tonic::Status::new(
                tonic::Code::Unknown,
                format!("Service was not ready: {}", e.into()),
            )
        })?;
        let codec = tonic::codec::ProstCodec::default();
        let path = http::uri::PathAndQuery::from_static("/shimrpc.Registrar/Register");
        let mut req = request.into_request();
        req.extensions_mut()
            .insert(GrpcMethod::new("shimrpc.Registrar", "Register"));
        self.inner.unary(req, path, codec).await
    }
}
