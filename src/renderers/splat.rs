// Copyright @yucwang 2026

use crate::math::constants::Vector3f;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A radiance contribution deposited on a pixel other than the one whose
/// primary ray produced it.
#[derive(Debug, Clone, Copy)]
pub struct SplatXY {
    pub x: u32,
    pub y: u32,
    pub color: Vector3f,
}

/// Multi-producer append buffer. The common path is a single fetch_add on
/// the length cursor plus a raw slot write; the mutex is taken only to grow
/// the storage or to snapshot it.
///
/// Invariant: a slot below `len` is written exactly once, by the producer
/// that reserved it. Snapshots are only meaningful once producers for the
/// current pass have finished.
pub struct SplatQueue {
    len: AtomicUsize,
    capacity: AtomicUsize,
    growing: AtomicBool,
    writers: AtomicUsize,
    storage: Mutex<Vec<SplatXY>>,
    slots: AtomicUsize, // base pointer of the slot array, published on grow
}

unsafe impl Send for SplatQueue {}
unsafe impl Sync for SplatQueue {}

impl SplatQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut storage = vec![
            SplatXY { x: 0, y: 0, color: Vector3f::zeros() };
            capacity
        ];
        let slots = storage.as_mut_ptr() as usize;
        Self {
            len: AtomicUsize::new(0),
            capacity: AtomicUsize::new(capacity),
            growing: AtomicBool::new(false),
            writers: AtomicUsize::new(0),
            storage: Mutex::new(storage),
            slots: AtomicUsize::new(slots),
        }
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire).min(self.capacity.load(Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&self, splat: SplatXY) {
        let index = self.len.fetch_add(1, Ordering::AcqRel);
        loop {
            if index >= self.capacity.load(Ordering::Acquire) {
                self.grow(index + 1);
                continue;
            }

            // announce the write, then re-check that no grow is migrating
            // the slots out from under us
            self.writers.fetch_add(1, Ordering::AcqRel);
            if self.growing.load(Ordering::Acquire) {
                self.writers.fetch_sub(1, Ordering::AcqRel);
                while self.growing.load(Ordering::Acquire) {
                    std::hint::spin_loop();
                }
                continue;
            }

            let base = self.slots.load(Ordering::Acquire) as *mut SplatXY;
            unsafe {
                std::ptr::write(base.add(index), splat);
            }
            self.writers.fetch_sub(1, Ordering::AcqRel);
            return;
        }
    }

    /// Grow-and-copy under the mutex, double-checking after acquisition so
    /// only the first producer that observed overflow pays for it.
    fn grow(&self, required: usize) {
        let mut storage = match self.storage.lock() {
            Ok(storage) => storage,
            Err(poisoned) => poisoned.into_inner(),
        };
        if storage.len() >= required {
            return;
        }

        self.growing.store(true, Ordering::Release);
        while self.writers.load(Ordering::Acquire) > 0 {
            std::hint::spin_loop();
        }

        let new_capacity = (storage.len() * 2).max(required);
        storage.resize(new_capacity,
                       SplatXY { x: 0, y: 0, color: Vector3f::zeros() });
        self.slots.store(storage.as_mut_ptr() as usize, Ordering::Release);
        self.capacity.store(new_capacity, Ordering::Release);
        self.growing.store(false, Ordering::Release);
    }

    /// Stable copy of the recorded entries. Holds the growth lock so a
    /// concurrent resize cannot race the read; entries stay in the queue.
    pub fn snapshot(&self) -> Vec<SplatXY> {
        let storage = match self.storage.lock() {
            Ok(storage) => storage,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = self.len.load(Ordering::Acquire).min(storage.len());
        storage[..count].to_vec()
    }

    pub fn clear(&self) {
        self.len.store(0, Ordering::Release);
    }
}

/* Tests for SplatQueue */
