//! Conversions from external infrastructure errors into SDK errors.

use std::io::Error as IoError;

use reqwest::Error as HttpError;
use tourist_esim_core::classify_transport;
use tourist_esim_domain::EsimError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub EsimError);

impl From<InfraError> for EsimError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<EsimError> for InfraError {
    fn from(value: EsimError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoEsimError {
    fn into_esim(self) -> EsimError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → EsimError */
/* -------------------------------------------------------------------------- */

impl IntoEsimError for HttpError {
    fn into_esim(self) -> EsimError {
        if self.is_builder() {
            return EsimError::Configuration(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return classify_transport(format_args!("request timed out ({self})"));
        }

        if self.is_connect() {
            return classify_transport(format_args!("could not connect ({self})"));
        }

        classify_transport(&self)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_esim())
    }
}

/* -------------------------------------------------------------------------- */
/* config parsing → EsimError */
/* -------------------------------------------------------------------------- */

impl IntoEsimError for IoError {
    fn into_esim(self) -> EsimError {
        EsimError::Configuration(format!("failed to read config file: {self}"))
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_esim())
    }
}

impl IntoEsimError for serde_json::Error {
    fn into_esim(self) -> EsimError {
        EsimError::Configuration(format!("invalid JSON config: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_esim())
    }
}

impl IntoEsimError for toml::de::Error {
    fn into_esim(self) -> EsimError {
        EsimError::Configuration(format!("invalid TOML config: {}", self.message()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_esim())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
