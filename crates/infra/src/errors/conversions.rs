//! Conversions from external infrastructure errors into gateway errors.

use backoffice_domain::GatewayError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the gateway error.
#[derive(Debug)]
pub struct InfraError(pub GatewayError);

impl From<InfraError> for GatewayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GatewayError> for InfraError {
    fn from(value: GatewayError) -> Self {
        InfraError(value)
    }
}

trait IntoGatewayError {
    fn into_gateway(self) -> GatewayError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for HttpError {
    fn into_gateway(self) -> GatewayError {
        if self.is_builder() {
            return GatewayError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() {
            return GatewayError::ParseFailure(self.to_string());
        }

        // Covers reqwest's connect timeout too; nothing reached the backend.
        if self.is_connect() {
            return GatewayError::NetworkUnavailable(format!("connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return GatewayError::from_status(code, message);
        }

        broken_exchange(&self)
    }
}

/// Failure after the request may have reached the backend. Reported as a
/// gateway fault so only safe methods are retried.
pub(crate) fn broken_exchange(detail: &dyn std::fmt::Display) -> GatewayError {
    GatewayError::ServerFault {
        status: 502,
        message: format!("connection lost after the request was sent: {detail}"),
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error / serde_json::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for std::io::Error {
    fn into_gateway(self) -> GatewayError {
        GatewayError::Persistence(format!("I/O failure: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_gateway())
    }
}

impl IntoGatewayError for serde_json::Error {
    fn into_gateway(self) -> GatewayError {
        GatewayError::Persistence(format!("could not encode offline state: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
