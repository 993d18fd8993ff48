//! Compilation-target data layout.
//!
//! Type lowering (§4.1) needs to know how wide `int`, `long`, and `float`
//! are on the machine we are compiling for before it can pick an IR
//! integer/float width. Rather than hardcoding LP64 assumptions this is
//! threaded through as an explicit collaborator, mirroring how the
//! reference compiler's native backend carries a `target_lexicon::Triple`
//! around instead of assuming the host triple.

use target_lexicon::{PointerWidth, Triple};

/// Bit widths for the handful of C integer/float categories lowering cares
/// about, plus the pointer width shared by every `ptr` IR type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub pointer_bits: u8,
    pub char_bits: u8,
    pub short_bits: u8,
    pub int_bits: u8,
    pub long_bits: u8,
    pub long_long_bits: u8,
    pub float_bits: u8,
    pub double_bits: u8,
}

impl Target {
    /// Derive a layout from a target triple. Only the pointer width varies
    /// across the triples we expect to see (`long` is 64-bit everywhere
    /// except LLP64 Windows, which this core does not special-case yet).
    pub fn from_triple(triple: &Triple) -> Self {
        let pointer_bits = match triple.pointer_width() {
            Ok(PointerWidth::U16) => 16,
            Ok(PointerWidth::U32) => 32,
            Ok(PointerWidth::U64) => 64,
            Err(_) => 64,
        };

        Target {
            pointer_bits,
            char_bits: 8,
            short_bits: 16,
            int_bits: 32,
            long_bits: if pointer_bits >= 64 { 64 } else { 32 },
            long_long_bits: 64,
            float_bits: 32,
            double_bits: 64,
        }
    }

    /// The layout for the triple Cargo is building for.
    pub fn host() -> Self {
        Self::from_triple(&Triple::host())
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::from_triple(&Triple::unknown())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_four_bit_triple_has_64_bit_pointers_and_long() {
        let triple: Triple = "x86_64-unknown-linux-gnu".parse().unwrap();
        let target = Target::from_triple(&triple);
        assert_eq!(target.pointer_bits, 64);
        assert_eq!(target.long_bits, 64);
        assert_eq!(target.int_bits, 32);
    }

    #[test]
    fn thirty_two_bit_triple_has_32_bit_pointers_and_long() {
        let triple: Triple = "i686-unknown-linux-gnu".parse().unwrap();
        let target = Target::from_triple(&triple);
        assert_eq!(target.pointer_bits, 32);
        assert_eq!(target.long_bits, 32);
    }
}
