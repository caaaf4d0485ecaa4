use super::{
    types::{AuthMethod, Config},
    ConfigError,
};
use crate::queue::QueueBackend;
use crate::tracker::TrackerBackend;
use crate::translator::TranslatorBackend;

/// Validate cross-field constraints serde cannot express.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return fail("server.port cannot be 0");
    }

    if config.auth.method == AuthMethod::ApiKey {
        if config.auth.api_keys.is_empty() {
            return fail("auth.api_keys must not be empty when auth.method = \"api_key\"");
        }
        if config
            .auth
            .api_keys
            .iter()
            .any(|k| k.key.is_empty() || k.isid.is_empty())
        {
            return fail("auth.api_keys entries need a non-empty key and isid");
        }
    }

    if config.queue.backend == QueueBackend::Redis && config.queue.redis.is_none() {
        return fail("queue.redis must be set when queue.backend = \"redis\"");
    }
    if config.queue.capacity == 0 {
        return fail("queue.capacity cannot be 0");
    }
    if config.queue.lease_secs == 0 {
        return fail("queue.lease_secs cannot be 0");
    }

    if config.tracker.backend == TrackerBackend::Redis && config.tracker.redis.is_none() {
        return fail("tracker.redis must be set when tracker.backend = \"redis\"");
    }
    if config.tracker.failure_ttl_secs == 0 {
        return fail("tracker.failure_ttl_secs cannot be 0");
    }

    if config.translator.backend == TranslatorBackend::Http {
        match config.translator.http {
            Some(ref http) if !http.url.is_empty() => {}
            _ => return fail("translator.http.url must be set when translator.backend = \"http\""),
        }
    }

    if config.orchestrator.tick_interval_ms == 0 {
        return fail("orchestrator.tick_interval_ms cannot be 0");
    }
    if config.orchestrator.tick_timeout_secs == 0 {
        return fail("orchestrator.tick_timeout_secs cannot be 0");
    }
    if let (TranslatorBackend::Http, Some(http)) =
        (config.translator.backend, &config.translator.http)
    {
        if config.orchestrator.tick_timeout_secs <= http.timeout_secs {
            return fail(
                "orchestrator.tick_timeout_secs must be greater than translator.http.timeout_secs",
            );
        }
    }
    if config.orchestrator.accepted_extensions.is_empty() {
        return fail("orchestrator.accepted_extensions must not be empty");
    }

    Ok(())
}
