//! Display formatting utilities for CLI output

use colored::*;

use crate::concept::Concept;
use crate::store::QueryResult;

const WRAP_WIDTH: usize = 80;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.len() + 1 + word.len() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// Display a concept card
pub fn display_concept(concept: &Concept, distance: Option<f32>) {
  println!("=== {} ({}) ===", concept.name.yellow().bold(), concept.domain.blue());

  for line in wrap_text(&concept.explanation, WRAP_WIDTH) {
    println!("{line}");
  }

  let mut footer = format!("utility {}/10", concept.utility);
  if let Some(distance) = distance {
    footer.push_str(&format!(", distance {distance:.3}"));
  }
  println!("{}", footer.dimmed());
  println!();
}

/// Runners-up from the novelty window, farthest first
pub fn display_alternatives(alternatives: &[QueryResult]) {
  if alternatives.is_empty() {
    return;
  }

  println!("{}", "Also worth a look:".bold());
  for candidate in alternatives {
    println!(
      "  {} {} ({}) {}",
      "•".cyan(),
      candidate.concept.name.yellow(),
      candidate.concept.domain.blue(),
      format!("distance {:.3}", candidate.distance).dimmed()
    );
  }
}

/// Nearest neighbours, closest first
pub fn display_neighbours(results: &[QueryResult]) {
  for (rank, result) in results.iter().enumerate() {
    println!(
      "{:>3}. {} ({}) {}",
      rank + 1,
      result.concept.name.yellow().bold(),
      result.concept.domain.blue(),
      format!("distance {:.3}", result.distance).dimmed()
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_wrap_text_respects_width() {
    let lines = wrap_text("one two three four five", 9);
    assert_eq!(lines, vec!["one two", "three", "four five"]);
  }

  #[test]
  fn test_wrap_text_keeps_blank_paragraphs() {
    let lines = wrap_text("first\n\nsecond", 80);
    assert_eq!(lines, vec!["first", "", "second"]);
  }
}
