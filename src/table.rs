use std::ops::Index;

use crate::utils::MyHash;

/// Hash-consing storage: every distinct value is stored exactly once.
///
/// Values live in a dense vector (index 0 is a sentry and never handed out),
/// collisions are chained through `next`. The bucket array doubles when the
/// load factor exceeds 2.
pub struct Table<T> {
    data: Vec<T>,
    next: Vec<u32>,
    buckets: Vec<u32>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 30, "Storage bits should be in the range 0..=30");

        let size = 1usize << bits;
        Self {
            data: vec![T::default()],
            next: vec![0],
            buckets: vec![0; size],
            bitmask: (size - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    /// Number of stored values (the sentry excluded).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index]
    }

    fn alloc(&mut self, value: T) -> usize {
        self.data.push(value);
        self.next.push(0);
        assert!(self.data.len() <= i32::MAX as usize, "Storage is full");
        self.data.len() - 1
    }
}

impl<T> Table<T>
where
    T: MyHash + Eq,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a value into the table and return its index, reusing an equal one.
    pub fn put(&mut self, value: T) -> usize {
        let bucket = self.bucket_index(&value);
        let mut index = self.buckets[bucket] as usize;
        while index != 0 {
            if self.data[index] == value {
                return index;
            }
            index = self.next[index] as usize;
        }

        let i = self.alloc(value);
        self.next[i] = self.buckets[bucket];
        self.buckets[bucket] = i as u32;

        if self.size() > 2 * self.num_buckets() {
            self.grow();
        }
        i
    }

    fn grow(&mut self) {
        let size = self.buckets.len() * 2;
        log::debug!("Growing unique table to {} buckets", size);
        self.buckets = vec![0; size];
        self.bitmask = (size - 1) as u64;
        for i in 1..self.data.len() {
            let bucket = self.bucket_index(&self.data[i]);
            self.next[i] = self.buckets[bucket];
            self.buckets[bucket] = i as u32;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
