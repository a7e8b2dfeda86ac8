mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use space_explorer::{
    feed::{shape, Asteroid},
    pipeline::http_client,
    presentation,
    Content, Message, Pipeline, Role, SubmitError, Transcript,
};
use wiremock::{MockServer, ResponseTemplate};

fn feed_payload(message: &Message) -> &space_explorer::FeedPayload {
    match &message.content {
        Content::Feed(payload) => payload,
        other => panic!("expected feed content, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_run_produces_assistant_then_feed() {
    let server = happy_server("An asteroid is a small rocky body orbiting the Sun.").await;
    let pipeline = pipeline_for(&server);

    let messages = pipeline.run("What is an asteroid?").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(
        messages[0].text(),
        Some("An asteroid is a small rocky body orbiting the Sun.")
    );
    assert_eq!(messages[1].role, Role::FeedData);
    assert_eq!(
        shape(feed_payload(&messages[1])),
        vec![Asteroid { name: "2025 AB".to_string(), diameter_km: 0.34 }]
    );
}

#[tokio::test]
async fn test_submit_echoes_user_first() {
    let server = happy_server("Yes.").await;
    let pipeline = pipeline_for(&server);

    let messages = pipeline.submit("  Is Pluto a planet?  ").await.unwrap();
    let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::FeedData]);
    assert_eq!(messages[0].text(), Some("Is Pluto a planet?"));
}

#[tokio::test]
async fn test_blank_question_is_rejected_without_calls() {
    let server = MockServer::start().await;
    // Nothing mounted: any request would get a 404 and show up below.
    let pipeline = pipeline_for(&server);

    assert_eq!(pipeline.submit("   \n").await, Err(SubmitError::EmptyQuestion));
    assert_eq!(SubmitError::EmptyQuestion.to_string(), "Please enter a question!");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transcript_grows_by_two_replies_per_submission() {
    let server = happy_server("Answer.").await;
    let pipeline = pipeline_for(&server);
    let mut transcript = Transcript::new();

    let mut previous_len = 0;
    for n in 1..=3 {
        pipeline
            .submit_to(&mut transcript, &format!("Question {n}"))
            .await
            .unwrap();
        assert_eq!(transcript.reply_count(), 2 * n);
        assert!(transcript.len() > previous_len);
        previous_len = transcript.len();
    }
    assert_eq!(transcript.len(), 9);
}

#[tokio::test]
async fn test_feed_server_error_becomes_error_payload() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(chat_reply("Still here."))).await;
    mount_feed(&server, ResponseTemplate::new(503).set_body_string("over capacity")).await;

    let messages = pipeline_for(&server).run("What is an asteroid?").await;

    assert_eq!(messages[0].text(), Some("Still here."));
    let payload = feed_payload(&messages[1]);
    assert!(payload.error_message().unwrap().contains("503"));
    assert!(shape(payload).is_empty());
}

#[tokio::test]
async fn test_feed_network_error_becomes_error_payload() {
    let server = happy_server("Reply.").await;
    // Nothing listens on port 1.
    let config = config_for(&server).with_nasa_feed_url("http://127.0.0.1:1/neo/rest/v1/feed");
    let pipeline = Pipeline::from_config(&config).unwrap();

    let messages = pipeline.run("What is an asteroid?").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), Some("Reply."));
    assert!(messages[1].is_error());
    assert!(feed_payload(&messages[1]).error_message().is_some());
}

#[tokio::test]
async fn test_feed_timeout_becomes_error_payload() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(chat_reply("Quick."))).await;
    mount_feed(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(scenario_feed())
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let config = config_for(&server).with_timeout(Duration::from_millis(300));

    let messages = Pipeline::from_config(&config).unwrap().run("q").await;

    assert_eq!(messages[0].text(), Some("Quick."));
    assert!(messages[1].is_error());
}

#[tokio::test]
async fn test_feed_errors_do_not_expose_api_key() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(chat_reply("ok"))).await;
    mount_feed(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(scenario_feed())
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let unreachable = config_for(&server).with_nasa_feed_url("http://127.0.0.1:1/neo/rest/v1/feed");
    let slow = config_for(&server).with_timeout(Duration::from_millis(300));

    for config in [unreachable, slow] {
        let messages = Pipeline::from_config(&config).unwrap().run("q").await;
        let error = feed_payload(&messages[1]).error_message().unwrap().to_string();
        assert!(error.starts_with("request to NASA feed failed"), "{error}");
        assert!(!error.contains(NASA_KEY), "{error}");

        let rendered = format!("{:?}", presentation::render_entry(&messages[1]));
        assert!(rendered.contains("Error fetching NASA data:"));
        assert!(!rendered.contains(NASA_KEY), "{rendered}");
    }
}

#[tokio::test]
async fn test_feed_invalid_json_becomes_error_payload() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(chat_reply("ok"))).await;
    mount_feed(&server, ResponseTemplate::new(200).set_body_string("<html>not json</html>")).await;

    let messages = pipeline_for(&server).run("q").await;
    assert!(feed_payload(&messages[1]).error_message().is_some());
}

#[tokio::test]
async fn test_completion_failure_is_flagged_and_feed_still_runs() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(401).set_body_string("invalid api key")).await;
    mount_feed(&server, ResponseTemplate::new(200).set_body_json(scenario_feed())).await;

    let messages = pipeline_for(&server).run("What is an asteroid?").await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::Assistant);
    match &messages[0].content {
        Content::Failed(reason) => {
            assert!(reason.contains("401"));
            assert!(reason.contains("invalid api key"));
        }
        other => panic!("expected failed content, got {other:?}"),
    }
    assert_eq!(shape(feed_payload(&messages[1])).len(), 1);
}

#[tokio::test]
async fn test_completion_without_choices_is_flagged() {
    let server = MockServer::start().await;
    mount_completion(&server, ResponseTemplate::new(200).set_body_json(json!({"choices": []}))).await;
    mount_feed(&server, ResponseTemplate::new(200).set_body_json(scenario_feed())).await;

    let messages = pipeline_for(&server).run("q").await;
    assert!(matches!(messages[0].content, Content::Failed(_)));
}

#[tokio::test]
async fn test_completion_request_carries_model_and_prompt() {
    let server = happy_server("ok").await;
    let config = config_for(&server).with_model("llama-test");
    let pipeline = Pipeline::from_config(&config).unwrap();

    pipeline.run("How big is Ceres?").await;

    let requests = server.received_requests().await.unwrap();
    let chat = requests
        .iter()
        .find(|r| r.url.path() == CHAT_PATH)
        .expect("completion request sent");
    let body: serde_json::Value = serde_json::from_slice(&chat.body).unwrap();
    assert_eq!(body["model"], "llama-test");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "How big is Ceres?");
}

#[tokio::test]
async fn test_steps_run_concurrently() {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(600);
    mount_completion(
        &server,
        ResponseTemplate::new(200).set_body_json(chat_reply("slow")).set_delay(delay),
    )
    .await;
    mount_feed(
        &server,
        ResponseTemplate::new(200).set_body_json(scenario_feed()).set_delay(delay),
    )
    .await;
    let pipeline = pipeline_for(&server);

    let started = std::time::Instant::now();
    let messages = pipeline.run("q").await;
    let elapsed = started.elapsed();

    // Order is fixed regardless of completion order.
    assert_eq!(messages[0].role, Role::Assistant);
    assert_eq!(messages[1].role, Role::FeedData);
    assert!(elapsed < delay * 2, "steps ran sequentially: {elapsed:?}");
}

#[test]
fn test_http_client_builds() {
    assert!(http_client(Duration::from_secs(1)).is_ok());
}
