use crate::tcp::byte_stream::ByteStream;
use std::collections::BTreeMap;

/// Reassembles arbitrarily-overlapping, out-of-order byte fragments
/// (addressed by absolute stream index) into the in-order stream written
/// to an owned [`ByteStream`].
///
/// Pending fragments are kept in a `BTreeMap` keyed by their start index,
/// with pairwise-disjoint `[start, end)` ranges; overlapping or adjacent
/// fragments are merged on insert so the map never grows past the number
/// of genuine gaps in the stream.
#[derive(Debug)]
pub struct Reassembler {
    output: ByteStream,
    pending: BTreeMap<u64, Box<[u8]>>,
    last_index: Option<u64>,
}

impl Reassembler {
    /// New `Reassembler` writing into the given `ByteStream`.
    pub fn new(output: ByteStream) -> Self {
        Reassembler {
            output,
            pending: BTreeMap::new(),
            last_index: None,
        }
    }

    /// Insert a fragment of `data` starting at absolute stream index
    /// `first_index`. `is_last` marks this fragment as carrying the final
    /// byte of the stream.
    pub fn insert(&mut self, first_index: u64, data: &[u8], is_last: bool) {
        let unassembled = self.output.bytes_pushed();
        let unacceptable = unassembled + self.output.available_capacity() as u64;

        if is_last {
            let claimed_end = first_index + data.len() as u64;
            self.last_index = Some(self.last_index.map_or(claimed_end, |cur| cur.min(claimed_end)));
        }

        if data.is_empty() || first_index >= unacceptable {
            log::trace!("Reassembler::insert: discarding segment at {first_index}, len={}", data.len());
            self.close_if_done();
            return;
        }

        // Right-truncate to the window.
        let mut first_index = first_index;
        let mut data = data;
        if first_index + data.len() as u64 > unacceptable {
            let keep = (unacceptable - first_index) as usize;
            data = &data[..keep];
            log::warn!("Reassembler::insert: right-truncated segment to {keep} bytes (window full)");
        }

        // Left-truncate / discard the part already assembled.
        if first_index + data.len() as u64 <= unassembled {
            self.close_if_done();
            return;
        }
        if first_index < unassembled {
            let drop = (unassembled - first_index) as usize;
            data = &data[drop..];
            first_index = unassembled;
        }

        self.store_and_merge(first_index, data);
        self.drain_contiguous();
        self.close_if_done();
    }

    /// Total length of stored, not-yet-assembled fragments. Diagnostic only.
    pub fn count_bytes_pending(&self) -> u64 {
        self.pending.values().map(|b| b.len() as u64).sum()
    }

    pub fn output(&self) -> &ByteStream {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ByteStream {
        &mut self.output
    }

    fn store_and_merge(&mut self, start: u64, data: &[u8]) {
        let mut merged_start = start;
        let mut merged_end = start + data.len() as u64;
        let mut merged: Vec<u8> = data.to_vec();

        // Any stored fragment overlapping or touching [merged_start, merged_end)
        // gets folded in. Bytes at the same absolute index are identical in a
        // well-formed stream, so the new fragment's bytes win on overlap.
        let overlapping: Vec<(u64, u64)> = self
            .pending
            .range(..)
            .filter_map(|(&seg_start, seg_data)| {
                let seg_end = seg_start + seg_data.len() as u64;
                if seg_end >= merged_start && seg_start <= merged_end {
                    Some((seg_start, seg_end))
                } else {
                    None
                }
            })
            .collect();

        for (seg_start, seg_end) in overlapping {
            let seg_data = self.pending.remove(&seg_start).unwrap();

            if seg_start < merged_start {
                // Existing fragment extends before the new one: splice its
                // prefix in front.
                let prefix_len = (merged_start - seg_start) as usize;
                let mut new_merged = seg_data[..prefix_len].to_vec();
                new_merged.extend_from_slice(&merged);
                merged = new_merged;
                merged_start = seg_start;
            }
            if seg_end > merged_end {
                // Existing fragment extends past the new one: append its
                // suffix.
                let suffix_start = (merged_end - seg_start) as usize;
                merged.extend_from_slice(&seg_data[suffix_start..]);
                merged_end = seg_end;
            }
        }

        log::trace!("Reassembler::insert: storing merged segment [{merged_start}, {merged_end})");
        self.pending.insert(merged_start, merged.into_boxed_slice());
    }

    fn drain_contiguous(&mut self) {
        let next = self.output.bytes_pushed();
        if let Some((&start, _)) = self.pending.iter().next() {
            if start == next {
                let data = self.pending.remove(&start).unwrap();
                self.output.push(&data);
            }
        }
    }

    fn close_if_done(&mut self) {
        if let Some(last_index) = self.last_index {
            if self.output.bytes_pushed() == last_index {
                self.output.close();
            }
        }
    }
}
