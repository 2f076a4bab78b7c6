use std::collections::VecDeque;

/// A finite-capacity, in-order byte buffer shared by a producer (the
/// "Writer" surface: [`ByteStream::push`], [`ByteStream::close`]) and a
/// consumer (the "Reader" surface: [`ByteStream::peek`], [`ByteStream::pop`]).
///
/// Both surfaces are exposed as methods on the same struct rather than
/// split into two handles. The stream is single-threaded and each call
/// leaves it in a consistent state, so there is no need for separate
/// ownership.
#[derive(Debug)]
pub struct ByteStream {
    buffer: VecDeque<u8>,
    capacity: usize,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    /// New `ByteStream` with the given capacity.
    pub fn new(capacity: usize) -> Self {
        ByteStream {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    // -- Writer surface --

    /// Push as much of `data` as available capacity allows; excess bytes
    /// are silently dropped. Pushing non-empty data after `close()` sets
    /// the error flag instead.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed {
            if !data.is_empty() {
                log::warn!("ByteStream::push: write after close, setting error");
                self.set_error();
            }
            return;
        }

        let to_push = data.len().min(self.available_capacity());
        self.buffer.extend(&data[..to_push]);
        self.bytes_pushed += to_push as u64;
        log::trace!("ByteStream::push: pushed {to_push} bytes ({} requested)", data.len());
    }

    /// Signal that no more bytes will be pushed.
    pub fn close(&mut self) {
        self.closed = true;
        log::trace!("ByteStream::close");
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// How many bytes may still be pushed right now.
    pub fn available_capacity(&self) -> usize {
        self.capacity - (self.bytes_pushed - self.bytes_popped) as usize
    }

    /// Total bytes ever pushed (monotonic).
    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    // -- Reader surface --

    /// Peek at the buffered bytes without consuming them. Returns a
    /// contiguous view when possible.
    pub fn peek(&mut self) -> &[u8] {
        self.buffer.make_contiguous()
    }

    /// Remove `len` bytes from the front of the buffer. Setting error if
    /// `len` exceeds what is buffered, or if the stream is already
    /// finished.
    pub fn pop(&mut self, len: usize) {
        if self.is_finished() || len > self.bytes_buffered() {
            log::warn!(
                "ByteStream::pop: invalid pop of {len} bytes (buffered={}, finished={})",
                self.bytes_buffered(),
                self.is_finished()
            );
            self.set_error();
            return;
        }

        self.buffer.drain(..len);
        self.bytes_popped += len as u64;
        log::trace!("ByteStream::pop: popped {len} bytes");
    }

    /// The stream is finished once it is closed and fully drained.
    pub fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Latch the error flag. Monotonic: never clears once set.
    pub fn set_error(&mut self) {
        self.error = true;
    }

    pub fn bytes_buffered(&self) -> usize {
        (self.bytes_pushed - self.bytes_popped) as usize
    }

    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_data(size: usize) -> Vec<u8> {
        (0..size as u8).collect()
    }

    #[test]
    fn test_construction() {
        let bs = ByteStream::new(100);
        assert_eq!(bs.available_capacity(), 100);
        assert_eq!(bs.bytes_buffered(), 0);
        assert_eq!(bs.bytes_pushed(), 0);
        assert_eq!(bs.bytes_popped(), 0);
        assert!(!bs.is_closed());
        assert!(!bs.has_error());
        assert!(!bs.is_finished());
    }

    #[test]
    fn test_available_capacity() {
        let mut bs = ByteStream::new(10);
        assert_eq!(bs.available_capacity(), 10);

        bs.push(&generate_data(4));
        assert_eq!(bs.available_capacity(), 6);

        bs.push(&generate_data(6));
        assert_eq!(bs.available_capacity(), 0);
        assert_eq!(bs.bytes_buffered(), 10);
    }

    #[test]
    fn test_single_push_and_pop() {
        let mut bs = ByteStream::new(20);
        let data = b"hello world";
        bs.push(data);
        assert_eq!(bs.bytes_pushed(), data.len() as u64);
        assert_eq!(bs.bytes_buffered(), data.len());

        assert_eq!(bs.peek(), data);
        bs.pop(data.len());
        assert_eq!(bs.bytes_popped(), data.len() as u64);
        assert_eq!(bs.bytes_buffered(), 0);
    }

    #[test]
    fn test_many_pushes_and_pops() {
        let mut bs = ByteStream::new(1024);
        let chunk_size = 64;
        let num_chunks = 10;

        for i in 1..num_chunks {
            bs.push(&generate_data(chunk_size));
            assert_eq!(bs.bytes_pushed(), (i * chunk_size) as u64);
            assert_eq!(bs.bytes_buffered(), i * chunk_size);
        }

        for i in 1..num_chunks {
            let expected: Vec<u8> = generate_data(chunk_size);
            assert_eq!(&bs.peek()[..chunk_size], &expected[..]);
            bs.pop(chunk_size);
            assert_eq!(bs.bytes_popped(), (i * chunk_size) as u64);
        }

        assert_eq!(bs.bytes_buffered(), 0);
    }

    #[test]
    fn test_push_over_capacity_drops_excess() {
        let capacity = 20;
        let mut bs = ByteStream::new(capacity);
        bs.push(&generate_data(50));
        assert_eq!(bs.bytes_pushed(), capacity as u64);
        assert_eq!(bs.bytes_buffered(), capacity);
        assert!(!bs.has_error());

        // Buffer is full now; further pushes drop everything.
        bs.push(&generate_data(50));
        assert_eq!(bs.bytes_pushed(), capacity as u64);
    }

    #[test]
    fn test_pop_more_than_buffered_sets_error() {
        let mut bs = ByteStream::new(20);
        bs.push(b"hello world");
        assert_eq!(bs.bytes_buffered(), 11);

        bs.pop(5);
        assert_eq!(bs.bytes_popped(), 5);
        assert_eq!(bs.bytes_buffered(), 6);

        bs.pop(99);
        assert!(bs.has_error());
    }

    #[test]
    fn test_peek() {
        let mut bs = ByteStream::new(20);
        bs.push(b"hello world");
        assert_eq!(&bs.peek()[..5], b"hello");
        assert_eq!(bs.peek(), b"hello world");
    }

    #[test]
    fn test_close_then_push_sets_error() {
        let mut bs = ByteStream::new(20);
        bs.close();
        assert!(bs.is_closed());
        assert!(!bs.has_error());

        bs.push(b"hello world");
        assert!(bs.has_error());
    }

    #[test]
    fn test_close_then_push_empty_is_not_an_error() {
        let mut bs = ByteStream::new(20);
        bs.close();
        bs.push(&[]);
        assert!(!bs.has_error());
    }

    #[test]
    fn test_is_finished() {
        let mut bs = ByteStream::new(20);
        assert!(!bs.is_finished());

        bs.push(b"hello world");
        bs.pop(11);
        assert!(!bs.is_finished());

        bs.close();
        assert!(bs.is_finished());
    }

    #[test]
    fn test_pop_past_finished_sets_error() {
        let mut bs = ByteStream::new(20);
        bs.push(b"ab");
        bs.pop(2);
        bs.close();
        assert!(bs.is_finished());

        bs.pop(0);
        assert!(bs.has_error());
    }

    #[test]
    fn test_invariant_pushed_minus_popped_bounded_by_capacity() {
        let mut bs = ByteStream::new(5);
        for _ in 0..10 {
            bs.push(b"xxxxxxxxxx");
            assert!(bs.bytes_pushed() - bs.bytes_popped() <= 5);
            bs.pop(bs.bytes_buffered().min(2));
        }
    }
}
