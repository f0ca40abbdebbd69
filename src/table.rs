//! Hash-consing node table.
//!
//! Values live in a growable arena and are chained into buckets by hash,
//! so that [`Table::put`] returns the same index for equal values.
//! Index 0 is a reserved sentry and never handed out.

use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

pub struct Table<T> {
    data: Vec<Entry<T>>,
    buckets: Vec<usize>,
    bitmask: u64,
}

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");

        let buckets_size = 1 << bits;
        let mut data = Vec::with_capacity(buckets_size);
        data.push(Entry {
            value: T::default(),
            next: 0,
        });

        Self {
            data,
            buckets: vec![0; buckets_size],
            bitmask: (buckets_size - 1) as u64,
        }
    }
}

impl<T> Table<T> {
    /// Number of stored values (excluding the sentry).
    pub fn size(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of hash buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    /// Get the index of the next value in the same bucket (0 terminates).
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }

    /// Append a value without hash-consing and return its index.
    pub fn add(&mut self, value: T) -> usize {
        self.data.push(Entry { value, next: 0 });
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

    /// Look up `value` and return its index, inserting it if absent.
    pub fn put(&mut self, value: T) -> usize {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        if index == 0 {
            let i = self.add(value);
            self.buckets[bucket_index] = i;
            return i;
        }

        loop {
            if &value == self.value(index) {
                return index;
            }
            let next = self.next(index);
            if next == 0 {
                let i = self.add(value);
                self.data[index].next = i;
                return i;
            }
            index = next;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
