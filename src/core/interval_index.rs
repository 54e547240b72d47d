/// Finds the smallest index whose element satisfies `predicate`.
///
/// `predicate` must be monotonic over `items`: false for a (possibly empty)
/// prefix and true for the remaining suffix. Returns `None` when the true
/// suffix is empty. Runs in `O(log n)` predicate calls.
pub fn find_boundary<T, F>(items: &[T], mut predicate: F) -> Option<usize>
where
    F: FnMut(&T) -> bool,
{
    let mut low = 0usize;
    let mut high = items.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if predicate(&items[mid]) {
            high = mid;
        } else {
            low = mid + 1;
        }
    }

    (low < items.len()).then_some(low)
}

/// Like [`find_boundary`] but substitutes `items.len()` when nothing matches,
/// which is what slicing callers need as an exclusive end.
pub fn boundary_or_len<T, F>(items: &[T], predicate: F) -> usize
where
    F: FnMut(&T) -> bool,
{
    find_boundary(items, predicate).unwrap_or(items.len())
}

#[cfg(test)]
mod tests {
    use super::{boundary_or_len, find_boundary};

    #[test]
    fn finds_first_true_index() {
        let items = [1, 3, 5, 7, 9];
        assert_eq!(find_boundary(&items, |v| *v >= 5), Some(2));
        assert_eq!(find_boundary(&items, |v| *v >= 0), Some(0));
        assert_eq!(find_boundary(&items, |v| *v > 8), Some(4));
    }

    #[test]
    fn returns_none_when_suffix_is_empty() {
        let items = [1, 2, 3];
        assert_eq!(find_boundary(&items, |v| *v > 3), None);
        assert_eq!(boundary_or_len(&items, |v| *v > 3), 3);
        assert_eq!(find_boundary::<i32, _>(&[], |_| true), None);
    }

    #[test]
    fn uses_logarithmic_number_of_probes() {
        let items: Vec<u32> = (0..1_000_000).collect();
        let mut probes = 0u32;
        let found = find_boundary(&items, |v| {
            probes += 1;
            *v >= 765_432
        });
        assert_eq!(found, Some(765_432));
        assert!(probes <= 21, "expected <= 21 probes, got {probes}");
    }
}
