use std::sync::{Arc, Mutex};

use bytes::BytesMut;

const BUFFER_CAPACITY: usize = 4096;
const MAX_POOLED: usize = 128;

/// A shared pool of read buffers. A connection checks a buffer out when it
/// starts and checks it back in when it closes, so steady-state traffic
/// reuses buffers instead of allocating one per connection.
///
/// Check-out/check-in are atomic with respect to each other; a buffer
/// handed out is owned exclusively by one connection until returned.
#[derive(Clone)]
pub struct BufferPool {
    buffers: Arc<Mutex<Vec<BytesMut>>>,
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool {
            buffers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Takes a buffer out of the pool, allocating a fresh one if the pool
    /// is empty.
    pub fn checkout(&self) -> BytesMut {
        let buffer = self.buffers.lock().unwrap().pop();
        buffer.unwrap_or_else(|| BytesMut::with_capacity(BUFFER_CAPACITY))
    }

    /// Returns a buffer to the pool, cleared of any leftover bytes. Buffers
    /// beyond the pool cap are dropped.
    pub fn checkin(&self, mut buffer: BytesMut) {
        buffer.clear();

        let mut buffers = self.buffers.lock().unwrap();
        if buffers.len() < MAX_POOLED {
            buffers.push(buffer);
        }
    }

    pub fn size(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}
