use serde::Serialize;

/// Position-aligned slices of the two sequences, rendered on one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk<'a> {
    /// Zero-based position of the first character of the chunk
    pub offset: usize,
    pub first: &'a str,
    pub second: &'a str,
}

impl Chunk<'_> {
    /// Width in characters
    pub fn len(&self) -> usize {
        self.first.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

/// Number of positions compared: the shorter of the two lengths
pub fn truncation_length(first: &str, second: &str) -> usize {
    first.chars().count().min(second.chars().count())
}

/// Split both sequences into chunks of `width` characters over their common
/// length. The last chunk may be shorter; chunks come out in sequence order.
/// A width of zero is treated as one.
pub fn chunk_pair<'a>(first: &'a str, second: &'a str, width: usize) -> Vec<Chunk<'a>> {
    let width = width.max(1);
    let limit = truncation_length(first, second);

    let first_slices = char_slices(truncate_chars(first, limit), width);
    let second_slices = char_slices(truncate_chars(second, limit), width);

    first_slices
        .into_iter()
        .zip(second_slices)
        .enumerate()
        .map(|(index, (first, second))| Chunk {
            offset: index * width,
            first,
            second,
        })
        .collect()
}

fn truncate_chars(text: &str, count: usize) -> &str {
    let end = text
        .char_indices()
        .nth(count)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    &text[..end]
}

fn char_slices(text: &str, width: usize) -> Vec<&str> {
    let mut slices = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let split = rest
            .char_indices()
            .nth(width)
            .map(|(index, _)| index)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(split);
        slices.push(head);
        rest = tail;
    }
    slices
}
