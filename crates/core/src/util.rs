/// Returns `items[offset..offset + limit]` (clamped) and the total length.
pub fn paginate<T: Clone>(items: &[T], limit: usize, offset: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let start = offset.min(total);
    let end = start.saturating_add(limit).min(total);
    (items[start..end].to_vec(), total)
}

/// Removes later duplicates while keeping first-seen order.
pub fn dedup_stable<T: Eq + std::hash::Hash + Clone>(items: &mut Vec<T>) {
    let mut seen = std::collections::HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_within_bounds() {
        let items = [1, 2, 3, 4, 5];
        assert_eq!(paginate(&items, 2, 1), (vec![2, 3], 5));
        assert_eq!(paginate(&items, 10, 3), (vec![4, 5], 5));
    }

    #[test]
    fn offset_past_end_is_empty() {
        let items = [1, 2, 3];
        assert_eq!(paginate(&items, 2, 3), (vec![], 3));
        assert_eq!(paginate(&items, 2, 100), (vec![], 3));
        assert_eq!(paginate(&items, usize::MAX, 1), (vec![2, 3], 3));
    }

    #[test]
    fn dedup_keeps_first() {
        let mut items = vec![3, 1, 3, 2, 1];
        dedup_stable(&mut items);
        assert_eq!(items, vec![3, 1, 2]);
    }
}
