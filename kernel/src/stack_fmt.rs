// No-alloc fmt::Write buffer plus the `SS.s` time format used on screen.
// StackFmt<N> owns a [u8; N] and silently truncates on overflow.

use core::fmt::{self, Write};

pub struct StackFmt<const N: usize> {
    buf: [u8; N],
    len: usize,
}

impl<const N: usize> StackFmt<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for StackFmt<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Write for StackFmt<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let n = bytes.len().min(N - self.len);
        self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        self.len += n;
        Ok(())
    }
}

/// Whole tenths of a second in `ms`, the unit the counter redraws on.
#[inline]
pub const fn tenths(ms: u64) -> u64 {
    ms / 100
}

/// Write `ms` as seconds with one decimal, zero padded: `07.3`, `59.9`.
pub fn write_seconds<W: Write>(w: &mut W, ms: u64) -> fmt::Result {
    write!(w, "{:02}.{}", ms / 1000, (ms % 1000) / 100)
}
