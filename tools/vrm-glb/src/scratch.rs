//! Call-scoped scratch memory for sparse payloads

#[cfg(test)]
thread_local! {
    static LIVE: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Fixed-size byte buffer released when dropped
///
/// Sparse index/value payloads are staged here and copied into the blob; the
/// scratch never outlives the encoder call that created it.
pub(crate) struct ScratchBytes {
    bytes: Vec<u8>,
}

impl ScratchBytes {
    /// Zeroed scratch of exactly `len` bytes
    pub(crate) fn zeroed(len: usize) -> Self {
        #[cfg(test)]
        LIVE.with(|live| live.set(live.get() + 1));
        Self {
            bytes: vec![0; len],
        }
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Drop for ScratchBytes {
    fn drop(&mut self) {
        #[cfg(test)]
        LIVE.with(|live| live.set(live.get() - 1));
    }
}

/// Scratch buffers currently alive on this thread
#[cfg(test)]
pub(crate) fn live_scratch_buffers() -> usize {
    LIVE.with(|live| live.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_is_released_on_drop() {
        assert_eq!(live_scratch_buffers(), 0);
        {
            let mut scratch = ScratchBytes::zeroed(12);
            scratch.as_mut_slice()[0] = 7;
            assert_eq!(scratch.as_slice().len(), 12);
            assert_eq!(live_scratch_buffers(), 1);
        }
        assert_eq!(live_scratch_buffers(), 0);
    }
}
