//! Render Buffer Pool
//!
//! Reusable byte buffers for renders streamed to a destination. A buffer
//! is checked out as a [`PooledBuffer`] guard and goes back to the pool
//! when the guard drops, on every exit path.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Maximum number of idle buffers kept
const MAX_POOLED: usize = 64;
/// Buffers that grew beyond this capacity are dropped instead of pooled
const MAX_POOLED_CAPACITY: usize = 256 * 1024;

static POOL: BufferPool = BufferPool::new();

/// Pool of idle byte buffers
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub const fn new() -> Self {
        BufferPool {
            idle: parking_lot::const_mutex(Vec::new()),
        }
    }

    /// Check out an empty buffer with at least `capacity` bytes reserved
    pub fn get(&self, capacity: usize) -> PooledBuffer<'_> {
        let mut buf = self.idle.lock().pop().unwrap_or_default();
        buf.reserve(capacity);
        PooledBuffer { buf, pool: self }
    }

    fn put(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        buf.clear();
        let mut idle = self.idle.lock();
        if idle.len() < MAX_POOLED {
            idle.push(buf);
        }
    }

    /// Number of idle buffers
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide pool
pub fn global() -> &'static BufferPool {
    &POOL
}

/// Check out a buffer from the process-wide pool
pub fn get(capacity: usize) -> PooledBuffer<'static> {
    POOL.get(capacity)
}

/// Buffer checked out from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    buf: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_returned_on_drop() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.get(16);
            assert!(buf.capacity() >= 16);
            buf.extend_from_slice(b"hello");
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 1);

        // Reused buffer comes back empty
        let buf = pool.get(0);
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 16);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_oversized_buffer_dropped() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.get(0);
            buf.reserve(MAX_POOLED_CAPACITY + 1);
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn test_returned_on_panic_unwind() {
        let pool = BufferPool::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _buf = pool.get(8);
            panic!("render failed");
        }));
        assert!(result.is_err());
        assert_eq!(pool.idle(), 1);
    }
}
