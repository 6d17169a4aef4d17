use super::Segment;

/// Greedily merge consecutive segments until each has more than `min_words` words.
///
/// A segment is closed once its word count exceeds `min_words`; until then every
/// following segment is absorbed into it (text joined by a single space, `end`
/// taken from the absorbed segment, `start` untouched). A short trailing segment
/// has nothing left to absorb and is emitted as is. Ids are renumbered 0..N.
pub fn merge_segments(segments: Vec<Segment>, min_words: usize) -> Vec<Segment> {
    let merged = segments
        .into_iter()
        .fold(Vec::<Segment>::new(), |mut out, segment| {
            match out.last_mut() {
                Some(open) if open.word_count() <= min_words => absorb(open, segment),
                _ => out.push(segment),
            }
            out
        });

    renumber(merged)
}

fn absorb(open: &mut Segment, next: Segment) {
    open.text = join_words(&open.text, &next.text);
    open.end = next.end;
    open.original_text = match (open.original_text.take(), next.original_text) {
        (Some(a), Some(b)) => Some(join_words(&a, &b)),
        (a, b) => a.or(b),
    };
}

fn join_words(a: &str, b: &str) -> String {
    match (a.trim(), b.trim()) {
        ("", b) => b.to_string(),
        (a, "") => a.to_string(),
        (a, b) => format!("{a} {b}"),
    }
}

/// Re-number segment ids sequentially starting from 0.
pub fn renumber(segments: Vec<Segment>) -> Vec<Segment> {
    segments
        .into_iter()
        .enumerate()
        .map(|(i, mut segment)| {
            segment.id = i;
            segment
        })
        .collect()
}

/// The `max` longest segments, longest first; ties keep their original order.
pub fn select_voice_samples(segments: &[Segment], max: usize) -> Vec<Segment> {
    let mut by_length: Vec<&Segment> = segments.iter().collect();
    by_length.sort_by(|a, b| b.duration().total_cmp(&a.duration()));
    by_length.into_iter().take(max).cloned().collect()
}
