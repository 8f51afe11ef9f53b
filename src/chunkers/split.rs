//! Piece splitting and watermark aggregation.
//!
//! All lengths are measured in characters, so a split never lands inside a
//! multi-byte character.

use crate::error::{ChunkError, Result};
use crate::types::config::{validate_max_len, validate_watermarks};

/// Split every review longer than `max_len` characters into consecutive
/// `max_len`-character pieces plus a shorter remainder.
///
/// Reviews at or under `max_len` pass through unchanged. Concatenating the
/// pieces of a review gives back the review. Empty reviews yield nothing.
pub fn split_oversized<S: AsRef<str>>(reviews: &[S], max_len: usize) -> Result<Vec<String>> {
    validate_max_len(max_len)?;

    let mut pieces = Vec::with_capacity(reviews.len());
    for review in reviews {
        let mut rest = review.as_ref();
        // Byte offset of the first character past `max_len`, if there is one.
        while let Some((boundary, _)) = rest.char_indices().nth(max_len) {
            pieces.push(rest[..boundary].to_string());
            rest = &rest[boundary..];
        }
        if !rest.is_empty() {
            pieces.push(rest.to_string());
        }
    }

    Ok(pieces)
}

/// Output of the first aggregation pass.
enum Slot {
    /// A closed chunk and its length
    Chunk(String, usize),
    /// A piece that neither merged nor forced a close
    Deferred(String, usize),
}

/// Greedily merge consecutive pieces into chunks no longer than `high`.
///
/// A running chunk absorbs the next piece while it is shorter than `low`
/// and the result stays shorter than `high`; once it is longer than `low`
/// it closes. A piece that hits neither rule is deferred, and every piece
/// after it is deferred too, so nothing overtakes it. The second pass folds
/// each deferred piece, in order, into the last chunk when the result is at
/// most `high`, or emits it as a new chunk otherwise. Pieces keep their
/// input order and appear exactly once. Empty pieces are skipped.
pub fn aggregate<I>(pieces: I, low: usize, high: usize) -> Result<Vec<String>>
where
    I: IntoIterator<Item = String>,
{
    validate_watermarks(low, high)?;

    let mut slots = Vec::new();
    let mut running = String::new();
    let mut running_len = 0;
    let mut deferred: Vec<(String, usize)> = Vec::new();

    for piece in pieces {
        let piece_len = piece.chars().count();
        if piece_len == 0 {
            continue;
        }
        if piece_len > high {
            return Err(ChunkError::InvalidConfiguration(format!(
                "piece of {piece_len} characters exceeds high watermark ({high})"
            )));
        }

        if running_len == 0 {
            running = piece;
            running_len = piece_len;
        } else if !deferred.is_empty() {
            deferred.push((piece, piece_len));
        } else if running_len < low && running_len + piece_len < high {
            running.push_str(&piece);
            running_len += piece_len;
        } else if running_len > low {
            slots.push(Slot::Chunk(std::mem::replace(&mut running, piece), running_len));
            running_len = piece_len;
        } else {
            deferred.push((piece, piece_len));
        }
    }
    if running_len > 0 {
        slots.push(Slot::Chunk(running, running_len));
    }
    slots.extend(deferred.into_iter().map(|(p, len)| Slot::Deferred(p, len)));

    let mut chunks: Vec<(String, usize)> = Vec::with_capacity(slots.len());
    for slot in slots {
        match slot {
            Slot::Chunk(text, len) => chunks.push((text, len)),
            Slot::Deferred(piece, len) => match chunks.last_mut() {
                Some((last, last_len)) if *last_len + len <= high => {
                    last.push_str(&piece);
                    *last_len += len;
                }
                _ => chunks.push((piece, len)),
            },
        }
    }

    Ok(chunks.into_iter().map(|(text, _)| text).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lengths(chunks: &[String]) -> Vec<usize> {
        chunks.iter().map(|c| c.chars().count()).collect()
    }

    /// Deterministic pseudo-random review lengths.
    fn varied_reviews(count: usize, seed: u64) -> Vec<String> {
        let mut state = seed;
        (0..count)
            .map(|i| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                let len = (state >> 33) as usize % 5000;
                let letter = (b'a' + (i % 26) as u8) as char;
                letter.to_string().repeat(len)
            })
            .collect()
    }

    #[test]
    fn test_split_long_review() {
        let review = "x".repeat(4500);
        let pieces = split_oversized(&[review], 2000).unwrap();
        assert_eq!(lengths(&pieces), vec![2000, 2000, 500]);
    }

    #[test]
    fn test_split_exact_multiple_has_no_empty_tail() {
        let pieces = split_oversized(&["y".repeat(4000)], 2000).unwrap();
        assert_eq!(lengths(&pieces), vec![2000, 2000]);
    }

    #[test]
    fn test_short_reviews_pass_through() {
        let reviews = vec!["you can fish".to_string(), "10/10".to_string()];
        let pieces = split_oversized(&reviews, 2000).unwrap();
        assert_eq!(pieces, reviews);
    }

    #[test]
    fn test_split_round_trip() {
        for review in varied_reviews(50, 7) {
            for max_len in [1, 3, 100, 2000] {
                let pieces = split_oversized(&[review.as_str()], max_len).unwrap();
                assert_eq!(pieces.concat(), review);
                assert!(pieces.iter().all(|p| {
                    let n = p.chars().count();
                    n > 0 && n <= max_len
                }));
            }
        }
    }

    #[test]
    fn test_split_multibyte_characters() {
        let review = "é日本語🎮".repeat(3);
        let pieces = split_oversized(&[review.as_str()], 4).unwrap();
        assert_eq!(lengths(&pieces), vec![4, 4, 4, 3]);
        assert_eq!(pieces.concat(), review);
    }

    #[test]
    fn test_split_skips_empty_reviews() {
        let pieces = split_oversized(&["", "ok", ""], 10).unwrap();
        assert_eq!(pieces, vec!["ok".to_string()]);
    }

    #[test]
    fn test_split_zero_max_len() {
        assert!(matches!(
            split_oversized(&["text"], 0),
            Err(ChunkError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_aggregate_forty_short_reviews() {
        let pieces = vec!["r".repeat(50); 40];
        let chunks = aggregate(pieces, 1500, 2000).unwrap();
        // 30 pieces reach the low watermark exactly; the other 10 are
        // deferred and all fold back up to the ceiling.
        assert_eq!(lengths(&chunks), vec![2000]);
        assert_eq!(chunks.concat().len(), 2000);
    }

    #[test]
    fn test_aggregate_small_input_yields_one_chunk() {
        let reviews = vec!["great game", "meh", "would play again"];
        let pieces = split_oversized(&reviews, 2000).unwrap();
        let chunks = aggregate(pieces, 1500, 2000).unwrap();
        assert_eq!(chunks, vec!["great gamemehwould play again".to_string()]);
    }

    #[test]
    fn test_aggregate_closes_above_low() {
        let pieces = vec!["a".repeat(12), "b".repeat(3)];
        let chunks = aggregate(pieces, 10, 20).unwrap();
        assert_eq!(chunks, vec!["a".repeat(12), "bbb".to_string()]);
    }

    #[test]
    fn test_gap_piece_that_does_not_fit_opens_a_chunk() {
        let pieces = vec!["a".repeat(5), "b".repeat(16), "ccc".to_string()];
        let chunks = aggregate(pieces, 10, 20).unwrap();
        assert_eq!(chunks, vec!["a".repeat(5), format!("{}ccc", "b".repeat(16))]);
    }

    #[test]
    fn test_small_pieces_after_low_watermark_fold_together() {
        let pieces = vec!["a".repeat(10), "b".into(), "c".into(), "d".into()];
        let chunks = aggregate(pieces, 10, 20).unwrap();
        assert_eq!(chunks, vec![format!("{}bcd", "a".repeat(10))]);
    }

    #[test]
    fn test_deferred_pieces_keep_input_order() {
        let pieces = vec!["a".repeat(5), "b".repeat(16), "c".repeat(3), "d".repeat(12)];
        let chunks = aggregate(pieces.clone(), 10, 20).unwrap();
        assert_eq!(
            chunks,
            vec!["a".repeat(5), format!("{}{}", "b".repeat(16), "c".repeat(3)), "d".repeat(12)]
        );
        assert_eq!(chunks.concat(), pieces.concat());
    }

    #[test]
    fn test_gap_piece_at_low_watermark_folds_back() {
        let pieces = vec!["a".repeat(10), "b".repeat(4), "c".repeat(2)];
        let chunks = aggregate(pieces, 10, 20).unwrap();
        assert_eq!(chunks, vec![format!("{}{}cc", "a".repeat(10), "b".repeat(4))]);
    }

    #[test]
    fn test_gap_piece_fold_allows_exact_ceiling() {
        let pieces = vec!["a".repeat(10), "b".repeat(10)];
        let chunks = aggregate(pieces, 10, 20).unwrap();
        assert_eq!(lengths(&chunks), vec![20]);
    }

    #[test]
    fn test_aggregate_rejects_bad_watermarks() {
        assert!(aggregate(vec!["x".to_string()], 2000, 1500).is_err());
        assert!(aggregate(vec!["x".to_string()], 0, 1500).is_err());
        assert!(aggregate(vec!["x".to_string()], 1500, 1500).is_err());
    }

    #[test]
    fn test_aggregate_rejects_piece_above_ceiling() {
        assert!(aggregate(vec!["x".repeat(21)], 10, 20).is_err());
    }

    #[test]
    fn test_aggregate_empty_input() {
        let chunks = aggregate(Vec::<String>::new(), 1500, 2000).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_no_loss_and_size_bound() {
        for seed in 1..20 {
            let reviews = varied_reviews(60, seed);
            let pieces = split_oversized(&reviews, 2000).unwrap();
            let chunks = aggregate(pieces, 1500, 2000).unwrap();

            // Order is preserved, so the concatenations match exactly.
            assert_eq!(chunks.concat(), reviews.concat());
            for len in lengths(&chunks) {
                assert!(len > 0 && len <= 2000, "chunk of {len} chars");
            }
        }
    }
}
