use std::collections::HashSet;

use qasearch::search::{combine_results, KeywordHit, SemanticHit, UrlTemplate, WeightedFusion};

const EPS: f64 = 1e-5;

fn template() -> UrlTemplate {
    UrlTemplate::new("https://yeahub.ru/questions/{id}")
}

fn semantic_hits() -> Vec<SemanticHit> {
    vec![
        SemanticHit::new("10", 0.91, "Что такое замыкание?", "https://yeahub.ru/questions/10"),
        SemanticHit::new("11", 0.55, "Что такое промис?", "https://yeahub.ru/questions/11"),
        SemanticHit::new("12", 0.42, "Event loop", "https://yeahub.ru/questions/12"),
    ]
}

fn keyword_hits() -> Vec<KeywordHit> {
    vec![
        KeywordHit::new("11", 0.6, "Что такое промис?"),
        KeywordHit::new("20", 0.3, "Промисы и async/await"),
    ]
}

#[test]
fn test_union_of_ids() {
    let fused = combine_results(&semantic_hits(), &keyword_hits(), 0.7, 0.3, &template());

    let ids: HashSet<&str> = fused.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(fused.len(), 4, "3 + 2 - 1 overlapping id");
    assert_eq!(ids.len(), fused.len(), "Each id appears once");
    assert!(ids.contains("20"));
}

#[test]
fn test_scores_and_order() {
    let fused = WeightedFusion::default().fuse(&semantic_hits(), &keyword_hits(), &template());

    assert!(fused.windows(2).all(|w| w[0].score >= w[1].score));

    let overlap = fused.iter().find(|r| r.id == "11").unwrap();
    assert!((overlap.score - (0.7 * 0.55 + 0.3 * 0.6)).abs() < EPS);

    let keyword_only = fused.iter().find(|r| r.id == "20").unwrap();
    assert!((keyword_only.score - 0.3 * 0.3).abs() < EPS);
    assert_eq!(keyword_only.url, "https://yeahub.ru/questions/20");
    assert_eq!(keyword_only.title, "Промисы и async/await");
}

#[test]
fn test_keyword_only_input() {
    let fused = combine_results(&[], &keyword_hits(), 0.7, 0.3, &template());
    assert_eq!(fused.len(), 2);
    assert_eq!(fused[0].id, "11");
    assert!(fused.iter().all(|r| r.url.starts_with("https://yeahub.ru/questions/")));
}

#[test]
fn test_results_serialize_flat() {
    let fused = combine_results(&semantic_hits()[..1], &[], 0.7, 0.3, &template());
    let json = serde_json::to_value(&fused).unwrap();
    assert_eq!(json[0]["id"], "10");
    assert_eq!(json[0]["url"], "https://yeahub.ru/questions/10");
    assert!(json[0].get("fields").is_none());
}
