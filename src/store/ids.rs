/// Next id in a prefixed sequence: the largest numeric suffix among `existing`
/// plus one. Gaps left by deletions are never refilled, so ids are not reused.
///
/// Scans the whole collection on each call.
pub fn next_sequential_id<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    format!("{prefix}{}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_after_max_not_count() {
        assert_eq!(next_sequential_id("g", ["g1", "g3"]), "g4");
    }

    #[test]
    fn empty_collection_starts_at_one() {
        assert_eq!(next_sequential_id("i", std::iter::empty()), "i1");
    }

    #[test]
    fn ignores_foreign_and_malformed_ids() {
        assert_eq!(next_sequential_id("kr", ["kr2", "g9", "krx", "kr10"]), "kr11");
    }
}
