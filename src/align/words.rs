use super::{AlignedWord, WordTiming};
use crate::subtitle::Segment;
use tracing::debug;

/// Map translated words onto original word timings.
///
/// Pairs words positionally when the counts match, otherwise spreads the
/// translated words across the original time span in proportion to their length.
pub fn align_translated_words(original: &[WordTiming], translated_text: &str) -> Vec<AlignedWord> {
    match align_words_exactly(original, translated_text) {
        Some(aligned) => {
            debug!("Exact word alignment for {} words", aligned.len());
            aligned
        }
        None => {
            debug!(
                "Word count mismatch ({} original vs {} translated), using proportional timing",
                original.len(),
                translated_text.split_whitespace().count()
            );
            align_by_proportional_timing(original, translated_text)
        }
    }
}

/// Positional pairing; `None` when the word counts differ.
pub fn align_words_exactly(
    original: &[WordTiming],
    translated_text: &str,
) -> Option<Vec<AlignedWord>> {
    let translated: Vec<&str> = translated_text.split_whitespace().collect();
    if translated.len() != original.len() {
        return None;
    }

    Some(
        translated
            .into_iter()
            .zip(original)
            .map(|(text, word)| AlignedWord {
                text: text.to_string(),
                start: word.start,
                end: word.end,
                original_word: word.text.clone(),
            })
            .collect(),
    )
}

/// Distribute the original span across translated words by character length.
///
/// Each word gets `(chars + 1) / total_chars` of the span, where `total_chars`
/// is the character length of the whole translated text. Empty when there are
/// no original words.
pub fn align_by_proportional_timing(
    original: &[WordTiming],
    translated_text: &str,
) -> Vec<AlignedWord> {
    let (Some(first), Some(last)) = (original.first(), original.last()) else {
        return Vec::new();
    };

    let total_duration = last.end - first.start;
    let total_chars = translated_text.chars().count() as f64;
    if total_chars == 0.0 {
        return Vec::new();
    }

    translated_text
        .split_whitespace()
        .scan(first.start, |cursor, word| {
            let duration = (word.chars().count() + 1) as f64 / total_chars * total_duration;
            let start = *cursor;
            *cursor += duration;
            Some(AlignedWord {
                text: word.to_string(),
                start,
                end: start + duration,
                original_word: String::new(),
            })
        })
        .collect()
}

/// Project aligned words onto plain segments with sequential ids.
pub fn create_word_level_segments(words: &[AlignedWord]) -> Vec<Segment> {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| Segment::new(i, word.start, word.end, word.text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> WordTiming {
        WordTiming {
            text: text.to_string(),
            start,
            end,
            loss: Some(0.01),
        }
    }

    fn sample_words() -> Vec<WordTiming> {
        vec![
            word("Hello", 0.0, 0.5),
            word("world", 0.6, 1.1),
            word("this", 1.2, 1.6),
            word("is", 1.7, 1.9),
            word("test", 2.0, 2.5),
        ]
    }

    #[test]
    fn test_exact_alignment_preserves_timing() {
        let original = sample_words();

        let result = align_translated_words(&original, "Hallo Welt das ist Test");

        assert_eq!(result.len(), 5);
        for (aligned, orig) in result.iter().zip(&original) {
            assert_eq!(aligned.start, orig.start);
            assert_eq!(aligned.end, orig.end);
            assert_eq!(aligned.original_word, orig.text);
        }
        assert_eq!(result[0].text, "Hallo");
        assert_eq!(result[4].text, "Test");
    }

    #[test]
    fn test_mismatch_falls_back_to_proportional() {
        let original = sample_words();

        let result = align_translated_words(&original, "Hallo Welt Test");

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].start, original[0].start);
        assert!(result.iter().all(|w| w.original_word.is_empty()));
        assert_eq!(
            result.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(),
            vec!["Hallo", "Welt", "Test"]
        );
    }

    #[test]
    fn test_proportional_durations() {
        let original = vec![word("a", 1.0, 2.0), word("b", 2.0, 3.0)];
        // 9 characters total; "ab" gets 3/9 and "cdef" gets 5/9 of 2 seconds
        let result = align_by_proportional_timing(&original, "ab cdef x");

        assert_eq!(result.len(), 3);
        assert!((result[0].start - 1.0).abs() < 1e-9);
        assert!((result[0].end - (1.0 + 2.0 * 3.0 / 9.0)).abs() < 1e-9);
        assert!((result[1].start - result[0].end).abs() < 1e-9);
        assert!((result[1].end - result[1].start - 2.0 * 5.0 / 9.0).abs() < 1e-9);
        // the trailing word overshoots by one character's share
        assert!((result[2].end - (3.0 + 2.0 / 9.0)).abs() < 1e-9);
    }

    #[test]
    fn test_proportional_counts_characters_not_bytes() {
        let original = vec![word("x", 0.0, 1.0)];
        let ascii = align_by_proportional_timing(&original, "Grosse Welt");
        let umlaut = align_by_proportional_timing(&original, "Große Welt");

        // "Große" is 5 chars against 10 total; "Grosse" is 6 against 11
        assert!((umlaut[0].end - 6.0 / 10.0).abs() < 1e-9);
        assert!((ascii[0].end - 7.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_proportional_empty_original() {
        assert!(align_by_proportional_timing(&[], "Hallo Welt").is_empty());
        assert!(align_translated_words(&[], "Hallo Welt").is_empty());
    }

    #[test]
    fn test_exact_requires_equal_counts() {
        assert!(align_words_exactly(&sample_words(), "nur drei Worte").is_none());
        assert!(align_words_exactly(&[], "").unwrap().is_empty());
    }

    #[test]
    fn test_create_word_level_segments() {
        let aligned = vec![
            AlignedWord {
                text: "Hallo".to_string(),
                start: 0.0,
                end: 0.5,
                original_word: "Hello".to_string(),
            },
            AlignedWord {
                text: "Welt".to_string(),
                start: 0.6,
                end: 1.1,
                original_word: "world".to_string(),
            },
        ];

        let segments = create_word_level_segments(&aligned);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id, 0);
        assert_eq!(segments[0].text, "Hallo");
        assert_eq!(segments[1].id, 1);
        assert_eq!(segments[1].start, 0.6);
        assert_eq!(segments[1].end, 1.1);
    }
}
