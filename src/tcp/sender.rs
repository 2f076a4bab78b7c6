use crate::tcp::byte_stream::ByteStream;
use crate::tcp::config::{ConfigError, SenderConfig, MAX_PAYLOAD_SIZE};
use crate::tcp::message::{TCPReceiverMessage, TCPSenderMessage};
use crate::tcp::wrap32::Wrap32;
use std::collections::VecDeque;

#[derive(Debug)]
struct OutstandingSegment {
    segment: TCPSenderMessage,
    abs_seqno: u64,
}

/// A simple elapsed-time counter. The sender only ever observes time
/// through [`TCPSender::tick`]; it never reads a wall clock.
#[derive(Debug, Default)]
struct Timer {
    running: bool,
    elapsed_ms: u64,
}

impl Timer {
    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) {
        self.running = true;
        self.elapsed_ms = 0;
    }

    fn stop(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
    }

    fn reset(&mut self) {
        self.running = true;
        self.elapsed_ms = 0;
    }

    fn pass_time(&mut self, ms: u64) {
        if self.running {
            self.elapsed_ms += ms;
        }
    }
}

/// The sending half of a TCP-style endpoint: owns the outbound
/// [`ByteStream`], assigns sequence numbers, tracks outstanding segments,
/// and retransmits with exponential backoff on timeout.
#[derive(Debug)]
pub struct TCPSender {
    outbound: ByteStream,
    isn: Wrap32,
    max_payload_size: usize,

    initial_rto_ms: u64,
    rto_ms: u64,
    consecutive_retransmissions: u64,

    timer: Timer,

    window_size: u16,
    last_ackno: u64,
    next_abs_seqno: u64,
    outstanding: VecDeque<OutstandingSegment>,
}

impl TCPSender {
    /// New `TCPSender` with the given outbound-stream capacity, ISN, and
    /// initial retransmission timeout in milliseconds.
    pub fn new(capacity: usize, isn: Wrap32, initial_rto_ms: u64) -> Self {
        TCPSender {
            outbound: ByteStream::new(capacity),
            isn,
            max_payload_size: MAX_PAYLOAD_SIZE,
            initial_rto_ms,
            rto_ms: initial_rto_ms,
            consecutive_retransmissions: 0,
            timer: Timer::default(),
            window_size: 1,
            last_ackno: 0,
            next_abs_seqno: 0,
            outstanding: VecDeque::new(),
        }
    }

    /// Like [`TCPSender::new`], but takes a validated [`SenderConfig`]
    /// instead of a bare RTO, also overriding the max payload size.
    pub fn with_config(capacity: usize, isn: Wrap32, config: SenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut sender = TCPSender::new(capacity, isn, config.initial_rto_ms);
        sender.max_payload_size = config.max_payload_size;
        Ok(sender)
    }

    /// The outbound stream's Writer face, for the application to push
    /// bytes to and eventually close.
    pub fn outbound_stream(&mut self) -> &mut ByteStream {
        &mut self.outbound
    }

    /// How many sequence numbers are currently outstanding (sent but not
    /// yet cumulatively acked).
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.outstanding.iter().map(|os| os.segment.sequence_length() as u64).sum()
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retransmissions
    }

    /// Build segments from the outbound stream and hand them to
    /// `transmit` until the peer's window is exhausted.
    pub fn push(&mut self, mut transmit: impl FnMut(TCPSenderMessage)) {
        if self.outbound.has_error() {
            log::warn!("TCPSender::push: outbound stream in error, sending RST");
            let mut msg = self.make_empty_message();
            msg.rst = true;
            transmit(msg);
            return;
        }

        let effective_window = if self.window_size > 0 { self.window_size as u64 } else { 1 };
        let flight = self.sequence_numbers_in_flight();
        let mut available_window = effective_window.saturating_sub(flight);

        while available_window > 0 {
            let mut syn = false;
            if self.next_abs_seqno == 0 {
                syn = true;
                available_window -= 1;
            }

            let payload_len = (available_window as usize).min(self.max_payload_size);
            let peeked = self.outbound.peek();
            let payload_len = payload_len.min(peeked.len());
            let payload: Box<[u8]> = peeked[..payload_len].into();
            self.outbound.pop(payload_len);
            available_window -= payload_len as u64;

            let mut fin = false;
            if self.outbound.is_finished()
                && available_window > 0
                && self.next_abs_seqno < self.outbound.bytes_popped() + 2
            {
                fin = true;
                available_window -= 1;
            }

            let segment = TCPSenderMessage {
                seqno: Wrap32::wrap(self.next_abs_seqno, self.isn),
                syn,
                payload,
                fin,
                rst: false,
            };

            if segment.sequence_length() == 0 {
                break;
            }

            log::debug!(
                "TCPSender::push: sending seqno={}, syn={}, payload_len={}, fin={}",
                self.next_abs_seqno,
                segment.syn,
                segment.payload.len(),
                segment.fin
            );

            self.outstanding.push_back(OutstandingSegment {
                abs_seqno: self.next_abs_seqno,
                segment: segment.clone(),
            });
            self.next_abs_seqno += segment.sequence_length() as u64;

            transmit(segment);

            if !self.timer.is_running() {
                self.timer.start();
            }
        }
    }

    /// Process an ack/window update from the peer receiver.
    pub fn receive(&mut self, msg: TCPReceiverMessage) {
        if msg.rst {
            log::warn!("TCPSender::receive: RST received, setting error");
            self.outbound.set_error();
            return;
        }

        self.window_size = msg.window_size;

        let Some(ackno) = msg.ackno else {
            return;
        };

        let abs_ackno = ackno.unwrap(self.isn, self.next_abs_seqno);
        if abs_ackno > self.next_abs_seqno {
            log::warn!("TCPSender::receive: ignoring spurious ack beyond next_abs_seqno");
            return;
        }

        if abs_ackno > self.last_ackno {
            self.last_ackno = abs_ackno;
            self.rto_ms = self.initial_rto_ms;
            self.consecutive_retransmissions = 0;
            log::debug!("TCPSender::receive: ack advanced to {abs_ackno}, RTO reset to {}", self.rto_ms);

            while let Some(os) = self.outstanding.front() {
                let seg_end = os.abs_seqno + os.segment.sequence_length() as u64;
                if seg_end <= abs_ackno {
                    self.outstanding.pop_front();
                } else {
                    break;
                }
            }

            if self.sequence_numbers_in_flight() > 0 {
                self.timer.reset();
            }
        }

        if self.outstanding.is_empty() {
            self.timer.stop();
        }
    }

    /// Advance the retransmission timer by `ms_elapsed` and retransmit the
    /// earliest outstanding segment if the RTO has elapsed.
    pub fn tick(&mut self, ms_elapsed: u64, mut transmit: impl FnMut(TCPSenderMessage)) {
        if !self.timer.is_running() {
            return;
        }

        self.timer.pass_time(ms_elapsed);

        if self.timer.elapsed_ms >= self.rto_ms {
            if let Some(os) = self.outstanding.front() {
                log::debug!(
                    "TCPSender::tick: retransmitting seqno={}, RTO was {}",
                    os.abs_seqno,
                    self.rto_ms
                );
                transmit(os.segment.clone());

                if self.window_size > 0 {
                    self.rto_ms *= 2;
                    self.consecutive_retransmissions += 1;
                }
                self.timer.reset();
            } else {
                self.timer.stop();
            }
        }
    }

    /// An empty message carrying just the current sequence number (and RST
    /// if the outbound stream is in error). Not tracked as outstanding.
    pub fn make_empty_message(&self) -> TCPSenderMessage {
        TCPSenderMessage {
            seqno: Wrap32::wrap(self.next_abs_seqno, self.isn),
            syn: false,
            payload: Box::from([]),
            fin: false,
            rst: self.outbound.has_error(),
        }
    }
}
