//! Integration tests for the OpenAI-compatible embedding provider.
//!
//! Uses a mock HTTP server so no real provider is contacted.

use ragline_embeddings::{
    EmbeddingError, EmbeddingProvider, OpenAiEmbeddings, PROBE_SENTENCE, probe_dimension,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedding_body(vectors: &[(usize, Vec<f32>)]) -> serde_json::Value {
    let data: Vec<serde_json::Value> = vectors
        .iter()
        .map(|(index, embedding)| {
            serde_json::json!({
                "object": "embedding",
                "index": index,
                "embedding": embedding,
            })
        })
        .collect();

    serde_json::json!({
        "object": "list",
        "model": "text-embedding-3-small",
        "data": data,
        "usage": { "prompt_tokens": 8, "total_tokens": 8 }
    })
}

fn provider(server: &MockServer) -> OpenAiEmbeddings {
    OpenAiEmbeddings::new("text-embedding-3-small")
        .with_api_key("sk-test")
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_embed_batch_is_one_request_and_order_preserving() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
            (0, vec![1.0, 0.0]),
            (1, vec![0.0, 1.0]),
            (2, vec![0.5, 0.5]),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let texts = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let embeddings = provider(&server).embed(&texts).await.unwrap();

    // One vector per input, all with the same width.
    assert_eq!(embeddings.len(), texts.len());
    assert!(embeddings.iter().all(|e| e.len() == 2));
    assert_eq!(embeddings[0], vec![1.0, 0.0]);
    assert_eq!(embeddings[2], vec![0.5, 0.5]);
}

#[tokio::test]
async fn test_embed_reorders_by_wire_index() {
    let server = MockServer::start().await;

    // Items arrive out of order; the index field is authoritative.
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
            (1, vec![0.0, 1.0]),
            (0, vec![1.0, 0.0]),
        ])))
        .mount(&server)
        .await;

    let texts = vec!["first".to_string(), "second".to_string()];
    let embeddings = provider(&server).embed(&texts).await.unwrap();

    assert_eq!(embeddings[0], vec![1.0, 0.0]);
    assert_eq!(embeddings[1], vec![0.0, 1.0]);
}

#[tokio::test]
async fn test_embed_rejects_count_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vec![1.0, 0.0])])),
        )
        .mount(&server)
        .await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let err = provider(&server).embed(&texts).await.unwrap_err();

    assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_embed_rejects_uneven_widths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
            (0, vec![1.0, 0.0]),
            (1, vec![1.0, 0.0, 0.0]),
        ])))
        .mount(&server)
        .await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let err = provider(&server).embed(&texts).await.unwrap_err();

    assert!(matches!(err, EmbeddingError::DimensionMismatch { .. }));
}

#[tokio::test]
async fn test_embed_empty_batch_skips_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[])))
        .expect(0)
        .mount(&server)
        .await;

    let embeddings = provider(&server).embed(&[]).await.unwrap();
    assert!(embeddings.is_empty());
}

#[tokio::test]
async fn test_embed_surfaces_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let texts = vec!["one".to_string()];
    let err = provider(&server).embed(&texts).await.unwrap_err();

    assert!(matches!(err, EmbeddingError::ApiRequest(_)));
}

#[tokio::test]
async fn test_probe_dimension_against_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(embedding_body(&[(0, vec![0.1; 1536])])),
        )
        .mount(&server)
        .await;

    let provider = provider(&server);
    let dimension = probe_dimension(&provider).await.unwrap();
    assert_eq!(dimension, 1536);

    // The probe sends exactly the sentinel sentence.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["input"], serde_json::json!([PROBE_SENTENCE]));
}
