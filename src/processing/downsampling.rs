/// Keep every `stride`-th item, starting with the first. A stride of 0 or
/// 1 keeps everything.
pub fn every_nth<T: Clone>(items: &[T], stride: usize) -> Vec<T> {
    items.iter().step_by(stride.max(1)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_and_every_nth() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(every_nth(&items, 3), vec![0, 3, 6, 9]);
        assert_eq!(every_nth(&items, 4), vec![0, 4, 8]);
    }

    #[test]
    fn unit_stride_is_identity() {
        let items = vec![5, 1, 4];
        assert_eq!(every_nth(&items, 1), items);
        assert_eq!(every_nth(&items, 0), items);
        assert!(every_nth::<u8>(&[], 2).is_empty());
    }
}
