//! Grounding Engine 场景测试（内存知识索引）

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use serde_json::json;
    use tactician::grounding::{extract_entities, GroundingEngine, LookupPath, SeenFacts};
    use tactician::knowledge::{FactKind, IndexNames, KnowledgeClient, StaticSearchBackend, MAX_HITS_PER_KIND};

    fn engine(backend: StaticSearchBackend) -> (GroundingEngine, Arc<StaticSearchBackend>) {
        let backend = Arc::new(backend);
        let client = KnowledgeClient::new(backend.clone(), IndexNames::new("units", "items", "traits"));
        (GroundingEngine::new(Arc::new(client)), backend)
    }

    fn catalog() -> StaticSearchBackend {
        StaticSearchBackend::new()
            .with_doc("units", json!({"name": "Yasuo", "tier": 4, "description": "4-cost Duelist carry"}))
            .with_doc("units", json!({"name": "Garen", "tier": 1, "trait_names": ["Mighty Mech"]}))
            .with_doc("items", json!({"name": "Infinity Edge", "components": ["B.F. Sword", "Sparring Gloves"]}))
            .with_doc("traits", json!({"name": "Duelist", "breakpoints": [2, 4, 6], "desc": "Attack speed per hit"}))
    }

    #[tokio::test]
    async fn test_direct_hit_skips_extraction() {
        let (engine, backend) = engine(catalog());

        let result = engine.ground("What changed in the patch notes for Yasuo?", None).await;

        assert_eq!(result.path, LookupPath::Direct);
        assert_eq!(result.added, 1);
        assert_eq!(
            result.digest.as_deref(),
            Some("Retrieved facts:\n[unit] Yasuo: 4-cost Duelist carry")
        );
        assert_eq!(backend.query_count(), 3);
    }

    #[tokio::test]
    async fn test_no_entities_falls_back_to_whole_text() {
        let (engine, backend) = engine(catalog());

        let result = engine.ground("asdf qwer", None).await;

        assert!(result.digest.is_none());
        assert_eq!(result.added, 0);
        assert_eq!(result.path, LookupPath::Entities(vec!["asdf qwer".to_string()]));

        let queries = backend.queries();
        assert_eq!(queries.len(), 6);
        let fallback: Vec<(&str, &str)> = queries[3..]
            .iter()
            .map(|(index, query, _)| (index.as_str(), query.as_str()))
            .collect();
        assert_eq!(
            fallback,
            vec![("units", "asdf qwer"), ("items", "asdf qwer"), ("traits", "asdf qwer")]
        );
    }

    #[tokio::test]
    async fn test_direct_hits_across_kinds() {
        let (engine, _) = engine(catalog());

        let result = engine
            .ground("Is Infinity Edge good on Yasuo with Duelist?", None)
            .await;

        assert_eq!(result.path, LookupPath::Direct);
        let digest = result.digest.unwrap();
        let lines: Vec<&str> = digest.lines().collect();
        assert_eq!(lines[0], "Retrieved facts:");
        assert_eq!(lines[1], "[unit] Yasuo: 4-cost Duelist carry");
        assert!(lines[2].starts_with("[item] Infinity Edge: {"));
        assert_eq!(lines[3], "[trait] Duelist: Attack speed per hit");
        assert_eq!(result.added, 3);
    }

    #[tokio::test]
    async fn test_same_text_same_facts() {
        let (engine, _) = engine(catalog());
        let text = "Garen and Yasuo";

        let first = engine.ground(text, None).await;
        let second = engine.ground(text, None).await;

        assert_eq!(first.facts, second.facts);
        assert_eq!(first.digest, second.digest);
        assert_eq!(first.added, 2);
    }

    #[tokio::test]
    async fn test_seen_facts_suppress_repeats_until_cleared() {
        let (engine, _) = engine(catalog());
        let seen = SeenFacts::new();

        let first = engine.ground("Tell me about Yasuo", Some(&seen)).await;
        assert_eq!(first.added, 1);

        let second = engine.ground("Yasuo again please", Some(&seen)).await;
        assert_eq!(second.added, 0);
        assert!(second.digest.is_none());

        let mixed = engine.ground("Yasuo or Garen?", Some(&seen)).await;
        assert_eq!(mixed.added, 1);
        assert_eq!(mixed.digest.as_deref().map(|d| d.contains("[unit] Garen")), Some(true));
        assert!(!mixed.digest.unwrap_or_default().contains("Yasuo:"));

        seen.clear();
        let after_reset = engine.ground("Tell me about Yasuo", Some(&seen)).await;
        assert_eq!(after_reset.added, 1);
    }

    #[tokio::test]
    async fn test_lookup_cap_per_kind() {
        let mut backend = StaticSearchBackend::new();
        for i in 0..8 {
            backend = backend.with_doc("units", json!({"name": format!("Garen {i}")}));
            backend = backend.with_doc("items", json!({"name": format!("Garen Blade {i}")}));
        }
        let (engine, _) = engine(backend);

        let result = engine.ground("Garen", None).await;

        for kind in FactKind::ALL {
            let count = result.facts.iter().filter(|f| f.kind == kind).count();
            assert!(count <= MAX_HITS_PER_KIND, "{kind}: {count}");
        }
        assert_eq!(result.added, 2 * MAX_HITS_PER_KIND);
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_empty() {
        let (engine, backend) = engine(StaticSearchBackend::failing());
        let seen = SeenFacts::new();

        let result = engine.ground("Yasuo", Some(&seen)).await;

        assert_eq!(result.added, 0);
        assert!(result.digest.is_none());
        assert!(result.facts.is_empty());
        assert!(seen.is_empty());
        assert!(backend.query_count() >= 1);
    }

    #[test]
    fn test_extraction_without_capitals_returns_text() {
        for text in ["asdf qwer", "what is the best item", "1 2 3"] {
            let expected: HashSet<String> = [text.to_string()].into_iter().collect();
            let got: HashSet<String> = extract_entities(text).into_iter().collect();
            assert_eq!(got, expected);
        }
    }
}
