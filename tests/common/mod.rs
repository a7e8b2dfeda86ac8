#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use space_explorer::{Config, Pipeline};
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const GROQ_KEY: &str = "test-groq-key";
pub const NASA_KEY: &str = "test-nasa-key";
pub const FEED_PATH: &str = "/neo/rest/v1/feed";
pub const CHAT_PATH: &str = "/openai/v1/chat/completions";

pub fn scenario_feed() -> Value {
    json!({
        "element_count": 1,
        "near_earth_objects": {
            "2025-01-01": [
                {"name": "2025 AB", "estimated_diameter": {"kilometers": {"estimated_diameter_max": 0.34}}}
            ]
        }
    })
}

pub fn chat_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}
        ]
    })
}

pub async fn mount_completion(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(CHAT_PATH))
        .and(header("authorization", format!("Bearer {GROQ_KEY}").as_str()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_feed(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("api_key", NASA_KEY))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Config pointing both services at `server`.
pub fn config_for(server: &MockServer) -> Config {
    Config::from_keys(Some(GROQ_KEY.to_string()), Some(NASA_KEY.to_string()))
        .unwrap()
        .with_groq_base_url(format!("{}/openai/v1", server.uri()))
        .with_nasa_feed_url(format!("{}{}", server.uri(), FEED_PATH))
        .with_timeout(Duration::from_secs(5))
}

pub fn pipeline_for(server: &MockServer) -> Pipeline {
    Pipeline::from_config(&config_for(server)).unwrap()
}

/// A server answering both services successfully with the asteroid scenario.
pub async fn happy_server(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(chat_reply(reply))).await;
    mount_feed(&server, ResponseTemplate::new(200).set_body_json(scenario_feed())).await;
    server
}
