use crate::tcp::byte_stream::ByteStream;
use crate::tcp::message::{TCPReceiverMessage, TCPSenderMessage};
use crate::tcp::reassembler::Reassembler;
use crate::tcp::wrap32::Wrap32;

/// The receiving half of a TCP-style endpoint. A thin, mostly-stateless
/// wrapper around a [`Reassembler`] plus the ISN once it has been learned
/// from the peer's SYN.
#[derive(Debug)]
pub struct TCPReceiver {
    reassembler: Reassembler,
    zero_point: Option<Wrap32>,
}

impl TCPReceiver {
    /// New `TCPReceiver` with an inbound stream of the given capacity.
    pub fn new(capacity: usize) -> Self {
        TCPReceiver {
            reassembler: Reassembler::new(ByteStream::new(capacity)),
            zero_point: None,
        }
    }

    /// Process one message from the peer sender.
    pub fn receive(&mut self, message: TCPSenderMessage) {
        if message.rst {
            log::warn!("TCPReceiver::receive: RST received, setting error");
            self.reassembler.output_mut().set_error();
            return;
        }

        if message.syn {
            if self.zero_point.is_none() {
                self.zero_point = Some(message.seqno);
                log::debug!("TCPReceiver::receive: learned ISN {:?}", message.seqno);
            } else {
                log::trace!("TCPReceiver::receive: ignoring SYN after zero_point already latched");
            }
        }

        let Some(zero_point) = self.zero_point else {
            log::trace!("TCPReceiver::receive: dropping segment before SYN seen");
            return;
        };

        let checkpoint = self.reassembler.output().bytes_pushed() + 1;
        let abs_seqno = message.seqno.unwrap(zero_point, checkpoint);

        if !message.syn && abs_seqno == 0 {
            log::warn!("TCPReceiver::receive: dropping invalid non-SYN segment resolving to abs seqno 0");
            return;
        }

        let stream_index = if message.syn { 0 } else { abs_seqno - 1 };
        self.reassembler.insert(stream_index, &message.payload, message.fin);
    }

    /// Build the ack/window message to send back to the peer.
    pub fn send(&self) -> TCPReceiverMessage {
        let rst = self.reassembler.output().has_error();
        let window_size = self.reassembler.output().available_capacity().min(u16::MAX as usize) as u16;

        let ackno = self.zero_point.map(|zero_point| {
            let mut next = self.reassembler.output().bytes_pushed() + 1;
            if self.reassembler.output().is_closed() {
                next += 1;
            }
            Wrap32::wrap(next, zero_point)
        });

        TCPReceiverMessage { ackno, window_size, rst }
    }

    /// The reassembled inbound stream, for the application to read from.
    pub fn inbound_stream(&self) -> &ByteStream {
        self.reassembler.output()
    }

    pub fn inbound_stream_mut(&mut self) -> &mut ByteStream {
        self.reassembler.output_mut()
    }
}
