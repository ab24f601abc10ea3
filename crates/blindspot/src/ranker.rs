//! Distance-inversion ranking
//!
//! The store is asked for the `window` concepts closest to what the caller
//! already knows. That window is the relevance prefilter. Within it the order
//! is flipped and the farthest candidate is the blindspot. Anything outside
//! the window is never considered, even if it is farther away.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::concept::Concept;
use crate::error::{BlindspotError, Result, ValidationError};
use crate::store::{ConceptStore, QueryResult};

pub const DEFAULT_WINDOW: usize = 20;

pub struct NoveltyRanker<'a> {
  store: &'a ConceptStore,
}

impl<'a> NoveltyRanker<'a> {
  pub fn new(store: &'a ConceptStore) -> Self {
    Self { store }
  }

  /// Most distant concept within the relevance window around `known_topics`.
  /// `Ok(None)` means the store is empty.
  pub async fn find_novel_concept(
    &self,
    known_topics: &[String],
    window: usize,
  ) -> Result<Option<Concept>> {
    let ranked = self.ranked_window(known_topics, window).await?;
    Ok(ranked.into_iter().next().map(|candidate| candidate.concept))
  }

  /// The whole relevance window ordered farthest first
  pub async fn ranked_window(
    &self,
    known_topics: &[String],
    window: usize,
  ) -> Result<Vec<QueryResult>> {
    let query_text = fuse_topics(known_topics)?;
    if window == 0 {
      return Err(ValidationError::ZeroWindow.into());
    }

    // The store caps the window at its row count
    let candidates = match self.store.query(&query_text, window).await {
      Err(BlindspotError::Validation(ValidationError::EmptyQuery)) => {
        return Err(ValidationError::EmptyTopics.into());
      }
      other => other?,
    };
    if candidates.is_empty() {
      tracing::info!("concept store is empty, no blindspot to suggest");
      return Ok(Vec::new());
    }

    let effective_window = candidates.len();
    let ranked = rank_by_novelty(candidates);

    if let Some(best) = ranked.first() {
      tracing::debug!(
        query = %query_text,
        window = effective_window,
        selected = %best.id,
        distance = best.distance,
        "selected blindspot"
      );
    }
    Ok(ranked)
  }
}

/// Collapse the topic set into one query string.
///
/// Topics are trimmed, blanks dropped, then sorted and de-duplicated so the
/// result depends only on the set of topics, not on their order.
pub fn fuse_topics(known_topics: &[String]) -> Result<String, ValidationError> {
  let topics: BTreeSet<&str> =
    known_topics.iter().map(|topic| topic.trim()).filter(|topic| !topic.is_empty()).collect();

  if topics.is_empty() {
    return Err(ValidationError::EmptyTopics);
  }
  Ok(topics.into_iter().collect::<Vec<_>>().join(", "))
}

/// Order candidates farthest first. Equal distances fall back to ascending
/// name so the pick never depends on the index's native ordering.
pub fn rank_by_novelty(mut candidates: Vec<QueryResult>) -> Vec<QueryResult> {
  candidates.sort_by(novelty_order);
  candidates
}

fn novelty_order(a: &QueryResult, b: &QueryResult) -> Ordering {
  b.distance.total_cmp(&a.distance).then_with(|| a.concept.name.cmp(&b.concept.name))
}
