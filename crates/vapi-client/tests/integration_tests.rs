//! Integration tests for vapi-client.
//!
//! Tests marked `#[ignore]` talk to the real registry and need `VAPI_API_KEY`:
//!   cargo test -p vapi-client --test integration_tests -- --ignored

use std::time::Duration;

use vapi_client::{AssistantRegistry, VapiClient, VapiConfig, DEFAULT_TIMEOUT};

// ============================================================================
// Unit tests (no registry required)
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_new_trims_trailing_slash() {
        let config = VapiConfig::new("https://api.vapi.ai/", "key");
        assert_eq!(config.base_url, "https://api.vapi.ai");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_config_urls() {
        let config = VapiConfig::new("https://api.vapi.ai", "key");
        assert_eq!(config.assistants_url(), "https://api.vapi.ai/assistant");
        assert_eq!(
            config.assistant_url("abc-123"),
            "https://api.vapi.ai/assistant/abc-123"
        );
        assert_eq!(
            config.assistant_url("a/b"),
            "https://api.vapi.ai/assistant/a%2Fb"
        );
    }

    #[test]
    fn test_config_hides_key_in_debug() {
        let config = VapiConfig::new("https://api.vapi.ai", "super-secret");
        assert_eq!(config.api_key(), "super-secret");
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}

// ============================================================================
// Soft-failure behaviour against an unreachable registry
// ============================================================================

mod unreachable_tests {
    use super::*;

    fn unreachable_client() -> VapiClient {
        // Port 1 on loopback refuses connections immediately.
        let config = VapiConfig::new("http://127.0.0.1:1", "key")
            .with_timeout(Duration::from_secs(2));
        VapiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_list_returns_empty_on_failure() {
        let client = unreachable_client();
        assert!(client.list().await.is_empty());
        assert!(client.try_list().await.is_err());
    }

    #[tokio::test]
    async fn test_get_and_delete_are_falsy_on_failure() {
        let client = unreachable_client();
        assert!(client.get("missing").await.is_none());
        assert!(!client.delete("missing").await);
    }
}

// ============================================================================
// Live tests (require VAPI_API_KEY)
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_live_list() {
    let _ = dotenvy::dotenv();
    let config = VapiConfig::from_env().expect("VAPI_API_KEY must be set");
    let client = VapiClient::new(config).unwrap();

    let assistants = client.try_list().await.unwrap();
    for assistant in &assistants {
        assert!(!assistant.id.is_empty());
    }
}
