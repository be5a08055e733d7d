#![allow(dead_code)]

//! Shared test rig: in-memory stores, mock LLM backends, and a fully
//! wired router

pub mod memory_index;
pub mod memory_store;
pub mod mock_llm;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use wayfinder_classifier::Classifier;
use wayfinder_config::{
    ClassifierConfig, DataConfig, LlmConfig, ProviderConfig, RagConfig, RouterConfig,
};
use wayfinder_core::{QueryOptions, QueryRequest, Role};
use wayfinder_data::{DataEngine, RecordStore};
use wayfinder_llm::LlmGateway;
use wayfinder_observability::Metrics;
use wayfinder_rag::{RagEngine, VectorSearch};
use wayfinder_router::QueryRouter;

pub use memory_index::InMemoryVectors;
pub use memory_store::InMemoryStore;
pub use mock_llm::MockLlm;

/// A wired core plus handles for assertions
pub struct Rig {
    pub router: QueryRouter,
    pub metrics: Arc<Metrics>,
    pub store: Arc<InMemoryStore>,
}

/// Provider entry pointing at a mock backend
pub fn provider(id: &str, mock: &MockLlm) -> ProviderConfig {
    ProviderConfig {
        id: id.to_owned(),
        base_url: mock.url(),
        api_key: SecretString::from("test-key".to_owned()),
        model: "test-model".to_owned(),
        timeout_ms: 500,
        max_retries: 1,
        backoff_initial_ms: 1,
    }
}

/// Build the full core against seeded in-memory stores
pub async fn rig(providers: Vec<ProviderConfig>) -> Rig {
    rig_with_store(providers, Arc::new(InMemoryStore::seeded())).await
}

/// Build the full core against a caller-provided record store
pub async fn rig_with_store(providers: Vec<ProviderConfig>, store: Arc<InMemoryStore>) -> Rig {
    let metrics = Arc::new(Metrics::new(256));

    let llm_config = LlmConfig { providers };
    let gateway = Arc::new(LlmGateway::from_config(&llm_config, Arc::clone(&metrics)));

    let classifier = Classifier::build(&ClassifierConfig::default(), None).await;

    let data = DataEngine::new(
        Arc::clone(&store) as Arc<dyn RecordStore>,
        DataConfig::default(),
        Duration::from_millis(1000),
    );

    let rag = RagEngine::new(
        Arc::new(InMemoryVectors) as Arc<dyn VectorSearch>,
        Arc::clone(&gateway),
        RagConfig::default(),
        Duration::from_millis(1000),
    );

    let router = QueryRouter::new(
        classifier,
        data,
        rag,
        gateway,
        Arc::clone(&metrics),
        &RouterConfig::default(),
        &RagConfig::default(),
    );

    Rig {
        router,
        metrics,
        store,
    }
}

/// An authenticated request, the way the transport layer would deliver it
pub fn request(query: &str, user_id: &str, role: Role) -> QueryRequest {
    QueryRequest {
        query: query.to_owned(),
        user_id: user_id.to_owned(),
        role,
        partner_id: None,
        options: QueryOptions::default(),
    }
}

/// Same, with a partner id attached
pub fn partner_request(query: &str, user_id: &str, partner_id: &str) -> QueryRequest {
    QueryRequest {
        query: query.to_owned(),
        user_id: user_id.to_owned(),
        role: Role::Partner,
        partner_id: Some(partner_id.to_owned()),
        options: QueryOptions::default(),
    }
}
