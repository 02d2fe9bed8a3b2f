#![allow(dead_code)]

use std::time::Duration;

use dasclient_api::{Credentials, DasClient, DasConfig};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, method, path},
};

pub const API_ROOT: &str = "/api/v1.0";
pub const TOKEN_PATH: &str = "/oauth2/token";

pub fn init_logging() {
    let _ = pretty_env_logger::formatted_timed_builder()
        .is_test(true)
        .try_init();
}

pub fn config_for(server: &MockServer) -> DasConfig {
    DasConfig {
        service_root: format!("{}{API_ROOT}", server.uri()),
        token_url: format!("{}{TOKEN_PATH}", server.uri()),
        provider_key: "integration-tests".to_string(),
        user_agent: "das-client-tests/0.1".to_string(),
        request_timeout: Some(Duration::from_secs(5)),
    }
}

pub fn password_credentials() -> Credentials {
    Credentials::password("ranger", "hunter2", "das_web_client")
}

pub fn client_for(server: &MockServer) -> DasClient {
    init_logging();
    DasClient::new(&config_for(server), password_credentials()).expect("client should build")
}

pub fn api_path(resource: &str) -> String {
    format!("{API_ROOT}/{resource}")
}

pub fn token_body(access_token: &str, refresh_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "expires_in": expires_in,
        "scope": "read write",
        "token_type": "Bearer",
    })
}

pub async fn mount_password_grant(
    server: &MockServer,
    access_token: &str,
    expires_in: u64,
    expected_calls: u64,
) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=ranger"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_body(
                access_token,
                &format!("{access_token}-refresh"),
                expires_in,
            )),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}
