//! Integration tests for the Extractor

#[cfg(test)]
mod tests {
    use crate::{ExtractorConfig, LlmExtractor};
    use gleaner_domain::traits::KnowledgeExtractor;
    use gleaner_domain::{ExtractionError, Sentiment};
    use gleaner_llm::{LlmError, MockProvider};
    use std::time::Duration;

    const GOOD_REPLY: &str = r#"{
        "summary": "Alice joined Acme as an engineer.",
        "title": "Alice Joins Acme",
        "topics": ["careers", "engineering", "Acme"],
        "sentiment": "positive",
        "keywords": ["alice", "acme", "engineer"]
    }"#;

    #[tokio::test]
    async fn test_full_extraction_flow() {
        let llm = MockProvider::new(GOOD_REPLY);
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        let result = extractor
            .extract_structured("Alice works at Acme")
            .await
            .unwrap();

        assert_eq!(result.summary, "Alice joined Acme as an engineer.");
        assert_eq!(result.title.as_deref(), Some("Alice Joins Acme"));
        assert_eq!(result.topics.len(), 3);
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(extractor.provider().call_count(), 1);
    }

    #[tokio::test]
    async fn test_extraction_with_invalid_json() {
        let llm = MockProvider::new("This is not JSON");
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        let result = extractor.extract_structured("Some text").await;
        assert!(matches!(result, Err(ExtractionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_extraction_missing_summary_is_malformed() {
        let llm = MockProvider::new(r#"{"topics": ["a", "b", "c"]}"#);
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        let err = extractor.extract_structured("Some text").await.unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
        assert!(err.detail().contains("summary"));
    }

    #[tokio::test]
    async fn test_remote_failure_is_remote_error() {
        let mut llm = MockProvider::default();
        llm.add_error("outage", LlmError::Communication("HTTP 503: unavailable".into()));
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        let err = extractor
            .extract_structured("during the outage")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "remote_error");
        assert!(err.detail().contains("503"));
    }

    #[tokio::test]
    async fn test_provider_timeout_is_timeout() {
        let mut llm = MockProvider::default();
        llm.add_error("slow", LlmError::Timeout("operation timed out".into()));
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        let err = extractor.extract_structured("slow text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extraction_timeout_enforced() {
        let llm = MockProvider::new(GOOD_REPLY).with_delay(Duration::from_secs(60));
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default())
            .with_timeout(Duration::from_secs(2));

        let err = extractor.extract_structured("Some text").await.unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout(_)));
        assert_eq!(extractor.provider().call_count(), 1);
    }

    #[tokio::test]
    async fn test_prompt_carries_text() {
        let mut llm = MockProvider::new("not json");
        llm.add_response("the quick brown fox", GOOD_REPLY);
        let extractor = LlmExtractor::new(llm, &ExtractorConfig::default());

        assert!(extractor
            .extract_structured("the quick brown fox")
            .await
            .is_ok());
    }
}
