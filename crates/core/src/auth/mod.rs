mod api_key;
mod none;
mod traits;
mod types;

pub use api_key::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Build the configured authenticator.
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::ApiKey => {
            if config.api_keys.is_empty() {
                return Err(AuthError::ConfigurationError(
                    "api_keys must not be empty when using ApiKey auth method".to_string(),
                ));
            }
            Ok(Box::new(ApiKeyAuthenticator::new(config.api_keys.clone())))
        }
    }
}
