use std::fmt;
use std::ops::Add;

/// A 32-bit wrapping sequence number. Carries no absolute position on its
/// own; a zero point (ISN) and a nearby checkpoint are needed to recover
/// the 64-bit absolute offset it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wrap32 {
    value: u32,
}

impl Wrap32 {
    const WRAP_SIZE: u64 = 1 << 32;
    const HALF_WRAP: u64 = 1 << 31;

    pub fn new(value: u32) -> Self {
        Wrap32 { value }
    }

    /// Wrap an absolute sequence number `n` given the zero point `isn`.
    pub fn wrap(n: u64, isn: Wrap32) -> Self {
        let wrapped = Wrap32::new((n.wrapping_add(isn.value as u64)) as u32);
        log::trace!("Wrap32::wrap({n}, {isn:?}) -> {wrapped:?}");
        wrapped
    }

    /// Unwrap `self` to the absolute sequence number nearest `checkpoint`,
    /// given the zero point `isn`.
    pub fn unwrap(&self, isn: Wrap32, checkpoint: u64) -> u64 {
        // Relative offset of `self` from the zero point, in [0, 2^32).
        let relative = self.value.wrapping_sub(isn.value) as u64;

        // Number of full wraps `k` that place `relative` closest to checkpoint.
        let k = (checkpoint + Self::HALF_WRAP).saturating_sub(relative) >> 32;

        let absolute = relative + k * Self::WRAP_SIZE;
        log::trace!("Wrap32::unwrap({self:?}, {isn:?}, {checkpoint}) -> {absolute}");
        absolute
    }
}

impl Add for Wrap32 {
    type Output = Wrap32;

    fn add(self, other: Wrap32) -> Wrap32 {
        Wrap32::new(self.value.wrapping_add(other.value))
    }
}

impl fmt::Display for Wrap32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

// -- Unit tests --
