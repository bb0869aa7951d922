//! Small string helpers used by path handling and diagnostics.

/// Splits `source` on any of the `delimiters` characters, skipping empty tokens.
pub fn split<'a>(source: &'a str, delimiters: &str) -> Vec<&'a str> {
    source
        .split(|c: char| delimiters.contains(c))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Levenshtein distance between two strings (by `char`).
pub fn distance(source: &str, target: &str) -> usize {
    let source: Vec<char> = source.chars().collect();
    let target: Vec<char> = target.chars().collect();
    let (short, long) = if source.len() > target.len() {
        (&target, &source)
    } else {
        (&source, &target)
    };

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for j in 1..=long.len() {
        let mut diagonal = row[0];
        row[0] += 1;
        for i in 1..=short.len() {
            let saved = row[i];
            row[i] = if short[i - 1] == long[j - 1] {
                diagonal
            } else {
                row[i - 1].min(row[i]).min(diagonal) + 1
            };
            diagonal = saved;
        }
    }
    row[short.len()]
}

/// Sorts `words` by their distance to `source`, keeping at most `limit` entries
/// (`0` keeps everything).
pub fn sort_by_distance(source: &str, words: &[String], limit: usize) -> Vec<String> {
    let mut sorted = words.to_vec();
    sorted.sort_by_cached_key(|word| distance(word, source));
    if limit > 0 {
        sorted.truncate(limit);
    }
    sorted
}
