mod common;

use blindspot::{IngestionPipeline, NoveltyRanker, ValidationError, DEFAULT_WINDOW};
use common::{economics_corpus, open_hashing_store, open_store_with, record, topics, AngleEmbedder};
use tempfile::TempDir;

fn arc_corpus() -> Vec<serde_json::Value> {
  vec![
    record("A", "Near", "ten degrees", 5),
    record("B", "Near", "twenty degrees", 5),
    record("C", "Near", "thirty degrees", 5),
    record("D", "Near", "forty degrees", 5),
    record("E", "Far", "one hundred seventy degrees", 5),
  ]
}

fn arc_embedder() -> AngleEmbedder {
  AngleEmbedder::new(&[
    ("Q", 0.0),
    ("A", 10.0),
    ("B", 20.0),
    ("C", 30.0),
    ("D", 40.0),
    ("E", 170.0),
  ])
}

#[tokio::test(flavor = "multi_thread")]
async fn test_economics_topics_surface_hormesis() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  IngestionPipeline::new(&store).ingest(&economics_corpus()).await.unwrap();

  let found = NoveltyRanker::new(&store)
    .find_novel_concept(&topics(&["Economics", "Trade"]), 20)
    .await
    .unwrap()
    .expect("a concept should be found");

  assert_eq!(found.name, "Hormesis");
  assert_eq!(found.domain, "Biology");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_topic_order_does_not_change_the_pick() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  IngestionPipeline::new(&store).ingest(&economics_corpus()).await.unwrap();
  let ranker = NoveltyRanker::new(&store);

  let forward = ranker.find_novel_concept(&topics(&["Economics", "Trade"]), 20).await.unwrap();
  let reversed = ranker.find_novel_concept(&topics(&["Trade", "Economics"]), 20).await.unwrap();
  assert_eq!(forward, reversed);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_store_returns_none() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  let ranker = NoveltyRanker::new(&store);

  for known in [vec!["Economics"], vec!["Physics", "Chemistry"], vec!["x"]] {
    let found = ranker.find_novel_concept(&topics(&known), DEFAULT_WINDOW).await.unwrap();
    assert_eq!(found, None);
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_result_is_always_a_corpus_member() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  let corpus = economics_corpus();
  IngestionPipeline::new(&store).ingest(&corpus).await.unwrap();

  let names: Vec<&str> = corpus.iter().map(|r| r["name"].as_str().unwrap()).collect();
  let ranker = NoveltyRanker::new(&store);

  for known in [vec!["Biology"], vec!["Economics"], vec!["Quantum", "Poetry"], vec!["80%"]] {
    for window in [1, 2, 3, 50] {
      let found = ranker.find_novel_concept(&topics(&known), window).await.unwrap().unwrap();
      assert!(names.contains(&found.name.as_str()), "{} not in corpus", found.name);
    }
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_pick_is_maximum_within_window_only() {
  let temp = TempDir::new().unwrap();
  let store = open_store_with(temp.path(), arc_embedder()).await;
  IngestionPipeline::new(&store).ingest(&arc_corpus()).await.unwrap();
  let ranker = NoveltyRanker::new(&store);

  let expected = [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E"), (20, "E")];
  for (window, name) in expected {
    let found = ranker.find_novel_concept(&topics(&["Q"]), window).await.unwrap().unwrap();
    assert_eq!(found.name, name, "window {window}");
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ranked_window_is_farthest_first() {
  let temp = TempDir::new().unwrap();
  let store = open_store_with(temp.path(), arc_embedder()).await;
  IngestionPipeline::new(&store).ingest(&arc_corpus()).await.unwrap();

  let ranked = NoveltyRanker::new(&store).ranked_window(&topics(&["Q"]), 3).await.unwrap();
  let names: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(names, vec!["C", "B", "A"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_equal_distances_pick_smallest_name() {
  let temp = TempDir::new().unwrap();
  let store = open_store_with(
    temp.path(),
    AngleEmbedder::new(&[("Q", 0.0), ("Near", 5.0), ("Twin B", 90.0), ("Twin A", 90.0)]),
  )
  .await;
  IngestionPipeline::new(&store)
    .ingest(&[
      record("Twin B", "x", "b", 3),
      record("Near", "x", "n", 3),
      record("Twin A", "x", "a", 3),
    ])
    .await
    .unwrap();

  let found = NoveltyRanker::new(&store).find_novel_concept(&topics(&["Q"]), 3).await.unwrap();
  assert_eq!(found.map(|c| c.name), Some("Twin A".to_string()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_blank_topics_are_rejected() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  IngestionPipeline::new(&store).ingest(&economics_corpus()).await.unwrap();

  let err =
    NoveltyRanker::new(&store).find_novel_concept(&topics(&[" ", ""]), 20).await.unwrap_err();
  assert!(matches!(err, blindspot::BlindspotError::Validation(ValidationError::EmptyTopics)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_topics_without_words_are_rejected() {
  let temp = TempDir::new().unwrap();
  let store = open_hashing_store(temp.path()).await;
  IngestionPipeline::new(&store).ingest(&economics_corpus()).await.unwrap();

  let err = NoveltyRanker::new(&store).find_novel_concept(&topics(&["%%%"]), 20).await;
  assert!(matches!(err, Err(blindspot::BlindspotError::Validation(ValidationError::EmptyTopics))));
}
