// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
use tokio::sync::watch;

use std::fmt;
use std::sync::Arc;

use crate::image_buffer::TemperatureMatrix;

/// Holds the most recent value of one feed.
///
/// Writers swap in a whole new [`Arc`], so readers see either the old value or the new one, never
/// a mix of the two. Nothing is kept besides the latest value.
pub(crate) struct FrameCell<T> {
    sender: watch::Sender<Option<Arc<T>>>,
}

impl<T> FrameCell<T> {
    pub(crate) fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Overwrite the stored value.
    pub(crate) fn replace(&self, value: T) {
        self.sender.send_replace(Some(Arc::new(value)));
    }

    /// A snapshot of the current value, or `None` if nothing has been stored yet.
    pub(crate) fn latest(&self) -> Option<Arc<T>> {
        self.sender.borrow().clone()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sender.borrow().is_none()
    }
}

impl<T> Default for FrameCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FrameCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCell")
            .field("empty", &self.is_empty())
            .finish()
    }
}

/// The latest frame of each feed. The two cells are independent of each other.
#[derive(Debug, Default)]
pub(crate) struct FrameStore {
    /// Raw bytes of the last accepted camera image.
    pub(crate) image: FrameCell<Bytes>,

    /// The last accepted thermal sensor frame.
    pub(crate) thermal: FrameCell<TemperatureMatrix>,
}

#[cfg(test)]
mod store_test {
    use super::{FrameCell, FrameStore};
    use crate::image_buffer::TemperatureMatrix;
    use bytes::Bytes;
    use std::convert::TryFrom;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let store = FrameStore::default();
        assert!(store.image.is_empty());
        assert!(store.image.latest().is_none());
        assert!(store.thermal.latest().is_none());
    }

    #[test]
    fn last_writer_wins() {
        let cell = FrameCell::new();
        cell.replace(1u32);
        cell.replace(2u32);
        assert_eq!(cell.latest().as_deref(), Some(&2));
    }

    #[test]
    fn snapshot_survives_replacement() {
        let cell = FrameCell::new();
        cell.replace(Bytes::from_static(b"first"));
        let snapshot = cell.latest().unwrap();
        cell.replace(Bytes::from_static(b"second"));
        assert_eq!(&snapshot[..], b"first");
        assert_eq!(&cell.latest().unwrap()[..], b"second");
    }

    #[test]
    fn cells_are_independent() {
        let store = FrameStore::default();
        store.image.replace(Bytes::from_static(b"image"));
        assert!(store.thermal.is_empty());
        let matrix = TemperatureMatrix::try_from(vec![30.0; 768]).unwrap();
        store.thermal.replace(matrix.clone());
        assert_eq!(&store.image.latest().unwrap()[..], b"image");
        assert_eq!(store.thermal.latest().as_deref(), Some(&matrix));
    }

    #[test]
    fn no_torn_reads() {
        const PAYLOAD_SIZE: usize = 64 * 1024;
        let cell = Arc::new(FrameCell::new());
        cell.replace(Bytes::from(vec![0u8; PAYLOAD_SIZE]));
        let done = Arc::new(AtomicBool::new(false));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut reads = 0usize;
                    while !done.load(Ordering::Relaxed) || reads == 0 {
                        let snapshot = cell.latest().unwrap();
                        let first = snapshot[0];
                        assert_eq!(snapshot.len(), PAYLOAD_SIZE);
                        assert!(
                            snapshot.iter().all(|b| *b == first),
                            "observed a mix of two writes"
                        );
                        reads += 1;
                    }
                    reads
                })
            })
            .collect();
        for n in 0..500u32 {
            let fill = (n % 251) as u8;
            cell.replace(Bytes::from(vec![fill; PAYLOAD_SIZE]));
        }
        done.store(true, Ordering::Relaxed);
        for reader in readers {
            assert!(reader.join().unwrap() > 0);
        }
    }
}
