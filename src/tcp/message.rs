use crate::tcp::flags::SegmentFlags;
use crate::tcp::wrap32::Wrap32;

/// A message sent from a `TCPSender` to a peer `TCPReceiver`.
///
/// Its *sequence length* (`SYN + payload.len() + FIN`) is what occupies
/// space on the absolute sequence axis; `RST` contributes nothing to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TCPSenderMessage {
    pub seqno: Wrap32,
    pub syn: bool,
    pub payload: Box<[u8]>,
    pub fin: bool,
    pub rst: bool,
}

impl TCPSenderMessage {
    pub fn sequence_length(&self) -> usize {
        self.syn as usize + self.payload.len() + self.fin as usize
    }

    pub fn flags(&self) -> SegmentFlags {
        let mut flags = SegmentFlags::empty();
        if self.syn {
            flags |= SegmentFlags::SYN;
        }
        if self.fin {
            flags |= SegmentFlags::FIN;
        }
        if self.rst {
            flags |= SegmentFlags::RST;
        }
        flags
    }
}

/// A message sent from a `TCPReceiver` back to the peer `TCPSender`.
///
/// `ackno` is absent only before the first SYN has been observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TCPReceiverMessage {
    pub ackno: Option<Wrap32>,
    pub window_size: u16,
    pub rst: bool,
}
