use bitflags::bitflags;

bitflags! {
    /// Control bits carried by a [`crate::tcp::message::TCPSenderMessage`].
    /// Only the three this protocol core reasons about; header options,
    /// urgent data, and congestion bits are out of scope.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SegmentFlags: u8 {
        const RST = 1 << 2;
        const SYN = 1 << 1;
        const FIN = 1 << 0;
    }
}
