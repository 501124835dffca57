/// `page`-th slice of `page_size` items, 1-based. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movements() -> Vec<String> {
        (1..=5).map(|i| format!("Movimento {i} - 0{i}/01/2023")).collect()
    }

    #[test]
    fn test_first_page() {
        let items = movements();
        assert_eq!(
            paginate(&items, 1, 2),
            &["Movimento 1 - 01/01/2023", "Movimento 2 - 02/01/2023"]
        );
    }

    #[test]
    fn test_last_partial_page() {
        let items = movements();
        assert_eq!(paginate(&items, 3, 2), &["Movimento 5 - 05/01/2023"]);
    }

    #[test]
    fn test_out_of_range() {
        let items = movements();
        assert!(paginate(&items, 4, 2).is_empty());
        assert!(paginate(&items, 0, 2).is_empty());
        assert!(paginate(&items, 1, 0).is_empty());
        assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    }
}
