#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use crate::cluster::{Coordinate, Item, ItemSet, ItemStore, ItemsChanged, Signal};

    fn item(id: u32) -> Item<u32> {
        Item::new(id, Coordinate::new(f64::from(id), f64::from(id)))
    }

    fn ids(set: &ItemSet<u32>) -> Vec<u32> {
        set.iter().map(|i| i.payload).collect()
    }

    fn recording_store(initial: &[u32]) -> (ItemStore<u32>, Arc<Mutex<Vec<ItemsChanged>>>) {
        let store = ItemStore::from_set(initial.iter().map(|&id| item(id)).collect());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |e: &ItemsChanged| sink.lock().push(*e));
        (store, events)
    }

    #[test]
    fn test_remove_indices() {
        let mut set: ItemSet<u32> = (0..6).map(item).collect();
        assert_eq!(set.remove_indices(&[4, 1, 1, 99]), 2);
        assert_eq!(ids(&set), vec![0, 2, 3, 5]);
        assert_eq!(set.remove_indices(&[]), 0);
    }

    #[test]
    fn test_replace_range_clamps() {
        let mut set: ItemSet<u32> = (0..4).map(item).collect();
        assert_eq!(set.replace_range(1..3, [item(10), item(11), item(12)]), (2, 3));
        assert_eq!(ids(&set), vec![0, 10, 11, 12, 3]);

        assert_eq!(set.replace_range(4..50, [item(20)]), (1, 1));
        assert_eq!(ids(&set), vec![0, 10, 11, 12, 20]);
        assert_eq!(set.remove(9), None);
    }

    #[test]
    fn test_one_signal_per_batch() {
        let (store, events) = recording_store(&[]);

        store.add_all((0..5).map(item));
        store.add(item(5));
        assert_eq!(store.remove_indices(&[0, 2]), 2);
        assert_eq!(store.remove_where(|i| i.payload > 3), 2);
        store.replace_range(0..1, [item(7), item(8)]);
        store.clear();

        let events = events.lock();
        let revisions: Vec<u64> = events.iter().map(|e| e.revision).collect();
        let lens: Vec<usize> = events.iter().map(|e| e.len).collect();
        assert_eq!(revisions, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(lens, vec![5, 6, 4, 2, 3, 0]);
        assert_eq!(store.revision(), 6);
    }

    #[test]
    fn test_no_signal_without_change() {
        let (store, events) = recording_store(&[1, 2]);

        store.add_all(std::iter::empty());
        assert_eq!(store.remove_at(10), None);
        assert_eq!(store.remove_where(|_| false), 0);
        store.replace_range(1..1, []);
        assert!(events.lock().is_empty());

        store.replace_all([item(3)]);
        store.clear();
        store.clear();
        assert_eq!(events.lock().len(), 2);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let (store, _events) = recording_store(&[1, 2, 3]);
        let before = store.snapshot();

        store.remove_at(0);
        store.add(item(9));

        assert_eq!(ids(&before), vec![1, 2, 3]);
        assert_eq!(ids(&store.snapshot()), vec![2, 3, 9]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_signal_unsubscribe() {
        let signal: Signal<u32> = Signal::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let first = signal.subscribe(move |v: &u32| sink.lock().push(*v));
        let sink = Arc::clone(&seen);
        signal.subscribe(move |v: &u32| sink.lock().push(v * 10));
        assert_eq!(signal.listener_count(), 2);

        signal.emit(&1);
        assert!(signal.unsubscribe(first));
        assert!(!signal.unsubscribe(first));
        signal.emit(&2);

        assert_eq!(*seen.lock(), vec![1, 10, 20]);
    }
}
