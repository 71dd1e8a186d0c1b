// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! OpenSearch Translator
//!
//! Renders the [`Clause`] AST as OpenSearch query DSL JSON.
//!
//! # Shapes
//!
//! ```text
//! {term: {field: value}}
//! {range: {field: {gte: iso, lte: iso}}}
//! {match: {field: value}}
//! {match_phrase: {field: text}}
//! {bool: {should: [...], minimum_should_match: 1}}
//! {bool: {must: [...], must_not: [...]}}
//! {knn: {field: {vector, k?, max_distance?, min_score?, filter: {bool: {...}}}}}
//! {hybrid: {queries: [knn, bool]}}
//! ```

use serde_json::{json, Map, Value};

use super::clause::{BoolFilter, Clause, HybridQuery, KnnQuery};

/// OpenSearch DSL translator
pub struct OpenSearchTranslator;

impl OpenSearchTranslator {
    /// Translate a clause tree to JSON
    pub fn translate(clause: &Clause) -> Value {
        match clause {
            Clause::Term { field, value } => Self::keyed("term", field, json!(value)),
            Clause::Range { field, gte, lte } => {
                Self::keyed("range", field, json!({ "gte": gte, "lte": lte }))
            }
            Clause::Match { field, value } => Self::keyed("match", field, json!(value)),
            Clause::MatchPhrase { field, text } => Self::keyed("match_phrase", field, json!(text)),
            Clause::AnyOf(clauses) => json!({
                "bool": {
                    "should": Self::translate_all(clauses),
                    "minimum_should_match": 1,
                }
            }),
            Clause::Bool(filter) => Self::translate_bool(filter),
            Clause::Knn(knn) => Self::translate_knn(knn),
            Clause::Hybrid(hybrid) => Self::translate_hybrid(hybrid),
        }
    }

    fn translate_all(clauses: &[Clause]) -> Vec<Value> {
        clauses.iter().map(Self::translate).collect()
    }

    fn translate_bool(filter: &BoolFilter) -> Value {
        json!({
            "bool": {
                "must": Self::translate_all(&filter.must),
                "must_not": Self::translate_all(&filter.must_not),
            }
        })
    }

    fn translate_knn(knn: &KnnQuery) -> Value {
        let mut params = Map::new();
        params.insert("vector".into(), json!(knn.vector));
        if let Some(k) = knn.k {
            params.insert("k".into(), json!(k));
        }
        if let Some(max_distance) = knn.max_distance {
            params.insert("max_distance".into(), json!(max_distance));
        }
        if let Some(min_score) = knn.min_score {
            params.insert("min_score".into(), json!(min_score));
        }
        params.insert("filter".into(), Self::translate_bool(&knn.filter));

        Self::keyed("knn", &knn.field, Value::Object(params))
    }

    fn translate_hybrid(hybrid: &HybridQuery) -> Value {
        json!({
            "hybrid": {
                "queries": [
                    Self::translate_knn(&hybrid.vector),
                    Self::translate_bool(&hybrid.keyword),
                ]
            }
        })
    }

    /// `{kind: {field: body}}` with a dynamic field name.
    fn keyed(kind: &str, field: &str, body: Value) -> Value {
        let mut inner = Map::new();
        inner.insert(field.to_string(), body);
        let mut outer = Map::new();
        outer.insert(kind.to_string(), Value::Object(inner));
        Value::Object(outer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term() {
        let value = OpenSearchTranslator::translate(&Clause::term("tags", "pain"));
        assert_eq!(value, json!({ "term": { "tags": "pain" } }));
    }

    #[test]
    fn test_range() {
        let clause = Clause::range("createdAt", "2013-09-06T00:00:00.000Z", "2023-10-15T00:00:00.000Z");
        assert_eq!(
            OpenSearchTranslator::translate(&clause),
            json!({
                "range": {
                    "createdAt": {
                        "gte": "2013-09-06T00:00:00.000Z",
                        "lte": "2023-10-15T00:00:00.000Z"
                    }
                }
            })
        );
    }

    #[test]
    fn test_match_and_phrase() {
        assert_eq!(
            OpenSearchTranslator::translate(&Clause::match_text("title", "Feature request")),
            json!({ "match": { "title": "Feature request" } })
        );
        assert_eq!(
            OpenSearchTranslator::translate(&Clause::match_phrase("title", "text")),
            json!({ "match_phrase": { "title": "text" } })
        );
    }

    #[test]
    fn test_any_of() {
        let clause = Clause::any_of(vec![
            Clause::term("tags", "pain"),
            Clause::term("tags", "gain"),
        ]);
        assert_eq!(
            OpenSearchTranslator::translate(&clause),
            json!({
                "bool": {
                    "should": [
                        { "term": { "tags": "pain" } },
                        { "term": { "tags": "gain" } }
                    ],
                    "minimum_should_match": 1
                }
            })
        );
    }

    #[test]
    fn test_empty_bool_keeps_both_lists() {
        let value = OpenSearchTranslator::translate(&Clause::Bool(BoolFilter::new()));
        assert_eq!(value, json!({ "bool": { "must": [], "must_not": [] } }));
    }

    #[test]
    fn test_knn_omits_unset_options() {
        let knn = KnnQuery {
            field: "embedding".into(),
            vector: vec![0.5, 0.25],
            k: None,
            max_distance: Some(0.75),
            min_score: None,
            filter: BoolFilter::new().must(Clause::term("tags", "interview")),
        };
        assert_eq!(
            OpenSearchTranslator::translate(&Clause::Knn(knn)),
            json!({
                "knn": {
                    "embedding": {
                        "vector": [0.5, 0.25],
                        "max_distance": 0.75,
                        "filter": {
                            "bool": {
                                "must": [{ "term": { "tags": "interview" } }],
                                "must_not": []
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_knn_vector_keeps_embedder_digits() {
        let knn = KnnQuery {
            field: "embedding".into(),
            vector: vec![0.1, 0.3],
            k: Some(3),
            max_distance: None,
            min_score: None,
            filter: BoolFilter::new(),
        };
        let body = serde_json::to_string(&Clause::Knn(knn)).unwrap();
        assert!(body.contains(r#""vector":[0.1,0.3]"#), "{body}");
    }

    #[test]
    fn test_hybrid_vector_first() {
        let hybrid = HybridQuery {
            vector: KnnQuery {
                field: "embedding".into(),
                vector: vec![1.0],
                k: Some(10),
                max_distance: None,
                min_score: None,
                filter: BoolFilter::new(),
            },
            keyword: BoolFilter::new().must(Clause::match_phrase("title", "text")),
        };
        let value = OpenSearchTranslator::translate(&Clause::Hybrid(hybrid));
        let queries = value["hybrid"]["queries"].as_array().unwrap();

        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0]["knn"]["embedding"]["k"], json!(10));
        assert_eq!(
            queries[1],
            json!({
                "bool": {
                    "must": [{ "match_phrase": { "title": "text" } }],
                    "must_not": []
                }
            })
        );
    }
}
