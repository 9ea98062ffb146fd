use llm_prices_core::{
    Aggregator, Catalog, Credentials, Endpoints, ModelRecord, ProviderKind, ProviderOutcome,
};
use mockito::{Matcher, Server, ServerGuard};

fn aggregator(server: &ServerGuard, creds: Credentials) -> Aggregator {
    Aggregator::new(
        Endpoints::rooted_at(&server.url()),
        Catalog::bundled().expect("bundled catalog"),
        creds,
    )
    .expect("client should build")
}

fn find<'a>(records: &'a [ModelRecord], model: &str) -> &'a ModelRecord {
    records
        .iter()
        .find(|r| r.model == model)
        .unwrap_or_else(|| panic!("{model} missing"))
}

#[tokio::test]
async fn no_credentials_means_no_calls_and_no_records() {
    let mut server = Server::new_async().await;
    let any = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let agg = aggregator(&server, Credentials::default());
    let (records, outcomes) = agg.collect_with_outcomes().await;

    assert!(records.is_empty());
    assert_eq!(outcomes.len(), 5);
    assert!(outcomes.iter().all(|(_, o)| *o == ProviderOutcome::Skipped));
    any.assert_async().await;
}

#[tokio::test]
async fn openrouter_prices_and_free_flag() {
    let mut server = Server::new_async().await;
    let listing = server
        .mock("GET", "/openrouter/models")
        .match_header("authorization", "Bearer or-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"data": [
                {"id": "acme/paid-model", "pricing": {"prompt": "0.000002", "completion": "0.000002"}},
                {"id": "acme/free-model", "pricing": {"prompt": "0", "completion": "0"}}
            ]}"#,
        )
        .create_async()
        .await;

    let creds = Credentials {
        openrouter: Some("or-key".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;
    listing.assert_async().await;

    assert_eq!(records.len(), 2);
    let paid = find(&records, "acme/paid-model");
    assert!((paid.prompt_price.unwrap() - 2.0).abs() < 1e-9);
    assert!(!paid.is_free());
    let free = find(&records, "acme/free-model");
    assert_eq!(free.prompt_price, Some(0.0));
    assert!(free.is_free());
    // No repository rule matches "acme", so no star lookup happened.
    assert!(paid.stars.is_none() && free.stars.is_none());
}

#[tokio::test]
async fn llama_model_looks_up_fallback_repository() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/openrouter/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "nousresearch/hermes-3-llama-3.1-70b"}]}"#)
        .create_async()
        .await;
    let stars = server
        .mock("GET", "/github/repos/meta-llama/llama")
        .match_header("accept", "application/vnd.github+json")
        .match_header("authorization", "Bearer gh-pat")
        .with_status(200)
        .with_body(r#"{"full_name": "meta-llama/llama", "stargazers_count": 57000}"#)
        .expect(1)
        .create_async()
        .await;

    let creds = Credentials {
        openrouter: Some("or-key".into()),
        github: Some("gh-pat".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;
    stars.assert_async().await;
    assert_eq!(records[0].stars, Some(57000));
}

#[tokio::test]
async fn failed_enrichment_keeps_sibling_records() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/openrouter/models")
        .with_status(200)
        .with_body(
            r#"{"data": [
                {"id": "mistralai/mistral-large", "hugging_face_id": "mistralai/Mistral-Large-Instruct-2411"},
                {"id": "qwen/qwen-2.5-72b-instruct", "hugging_face_id": "Qwen/Qwen2.5-72B-Instruct"}
            ]}"#,
        )
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/github/repos/mistralai/mistral-src")
        .with_status(403)
        .with_body(r#"{"message": "API rate limit exceeded"}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/github/repos/QwenLM/Qwen")
        .with_status(200)
        .with_body(r#"{"stargazers_count": 19000}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/hf/models/mistralai/Mistral-Large-Instruct-2411")
        .with_status(200)
        .with_body(r#"{"likes": 250}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/hf/models/Qwen/Qwen2.5-72B-Instruct")
        .with_status(500)
        .create_async()
        .await;

    let creds = Credentials {
        openrouter: Some("or-key".into()),
        huggingface: Some("hf-token".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;

    let openrouter: Vec<_> = records.iter().filter(|r| r.provider == "OpenRouter").collect();
    assert_eq!(openrouter.len(), 2, "both records survive partial failures");

    let mistral = find(&records, "mistralai/mistral-large");
    assert_eq!(mistral.stars, None);
    assert_eq!(mistral.hf_likes, Some(250));

    let qwen = find(&records, "qwen/qwen-2.5-72b-instruct");
    assert_eq!(qwen.stars, Some(19000));
    assert_eq!(qwen.hf_likes, None);
}

#[tokio::test]
async fn likes_need_hf_token() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/openrouter/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "acme/x", "hugging_face_id": "acme/x-hf"}]}"#)
        .create_async()
        .await;
    let likes = server
        .mock("GET", "/hf/models/acme/x-hf")
        .expect(0)
        .create_async()
        .await;

    let creds = Credentials {
        openrouter: Some("or-key".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;
    likes.assert_async().await;
    assert_eq!(records.len(), 1);
    assert!(records[0].hf_likes.is_none());
}

#[tokio::test]
async fn failing_provider_does_not_affect_others() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/together/models")
        .with_status(401)
        .with_body(r#"{"error": "invalid api key"}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/groq/models")
        .with_status(200)
        .with_body("this is not json")
        .create_async()
        .await;
    let replicate = server
        .mock("GET", "/replicate/models")
        .match_header("authorization", "Token r8-token")
        .with_status(200)
        .with_body(r#"{"results": [{"owner": {"username": "stability-ai"}, "name": "sdxl"}]}"#)
        .create_async()
        .await;

    let creds = Credentials {
        together: Some("tg".into()),
        groq: Some("gsk".into()),
        replicate: Some("r8-token".into()),
        ..Default::default()
    };
    let (records, outcomes) = aggregator(&server, creds).collect_with_outcomes().await;
    replicate.assert_async().await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].model, "stability-ai/sdxl");
    assert_eq!(records[0].provider, "Replicate");

    let outcome = |kind: ProviderKind| {
        outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, o)| o.clone())
            .unwrap()
    };
    assert!(matches!(outcome(ProviderKind::Together), ProviderOutcome::Failed(msg) if msg.contains("401")));
    assert!(matches!(outcome(ProviderKind::Groq), ProviderOutcome::Failed(_)));
    assert_eq!(outcome(ProviderKind::Replicate), ProviderOutcome::Fetched(1));
    assert_eq!(outcome(ProviderKind::OpenRouter), ProviderOutcome::Skipped);
}

#[tokio::test]
async fn open_weight_list_follows_hf_token() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/hf/models/meta-llama/Llama-3.3-70B-Instruct")
        .match_header("authorization", "Bearer hf-token")
        .with_status(200)
        .with_body(r#"{"id": "meta-llama/Llama-3.3-70B-Instruct", "likes": 2100}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/hf/models/gpt2")
        .with_status(200)
        .with_body(r#"{"id": "gpt2"}"#)
        .create_async()
        .await;
    // Mistral is left unmocked and fails.

    let creds = Credentials {
        huggingface: Some("hf-token".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;

    let models: Vec<_> = records.iter().map(|r| r.model.as_str()).collect();
    assert_eq!(
        models,
        [
            "meta-llama/Llama-3.3-70B-Instruct",
            "mistralai/Mistral-7B-Instruct-v0.2",
            "gpt2"
        ]
    );
    assert!(records.iter().all(|r| r.provider == "Hugging Face" && r.is_free()));
    assert_eq!(records[0].hf_likes, Some(2100));
    assert_eq!(records[0].context_length, Some(128000));
    assert_eq!(records[1].hf_likes, None);
    assert_eq!(records[2].hf_likes, Some(0), "missing likes field counts as zero");
}

#[tokio::test]
async fn providers_are_appended_in_registry_order() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/groq/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "gemma2-9b-it"}]}"#)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/together/models")
        .with_status(200)
        .with_body(r#"[{"id": "together/one"}]"#)
        .create_async()
        .await;

    let creds = Credentials {
        together: Some("tg".into()),
        groq: Some("gsk".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;
    let providers: Vec<_> = records.iter().map(|r| r.provider.as_str()).collect();
    assert_eq!(providers, ["Together AI", "Groq"]);
    assert_eq!(records[1].prompt_price, Some(0.10));
}

#[tokio::test]
async fn star_lookup_runs_anonymously_without_pat() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/openrouter/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "meta-llama/llama-3.1-8b-instruct"}]}"#)
        .create_async()
        .await;
    let stars = server
        .mock("GET", "/github/repos/meta-llama/llama")
        .match_header("accept", "application/vnd.github+json")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"stargazers_count": 57000}"#)
        .expect(1)
        .create_async()
        .await;

    let creds = Credentials {
        openrouter: Some("or-key".into()),
        ..Default::default()
    };
    let records = aggregator(&server, creds).collect().await;
    stars.assert_async().await;
    assert_eq!(records[0].stars, Some(57000));
}

#[tokio::test]
async fn unreachable_provider_fails_alone() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/groq/models")
        .with_status(200)
        .with_body(r#"{"data": [{"id": "gemma2-9b-it"}]}"#)
        .create_async()
        .await;

    let endpoints = Endpoints {
        together_models: "http://127.0.0.1:1/models".into(),
        ..Endpoints::rooted_at(&server.url())
    };
    let creds = Credentials {
        together: Some("tg".into()),
        groq: Some("gsk".into()),
        ..Default::default()
    };
    let agg = Aggregator::new(endpoints, Catalog::bundled().expect("bundled catalog"), creds)
        .expect("client should build");
    let (records, outcomes) = agg.collect_with_outcomes().await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].provider, "Groq");
    assert!(matches!(
        outcomes.iter().find(|(k, _)| *k == ProviderKind::Together),
        Some((_, ProviderOutcome::Failed(_)))
    ));
    assert!(outcomes.contains(&(ProviderKind::Groq, ProviderOutcome::Fetched(1))));
}
