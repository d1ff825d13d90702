//! Castling-rights mask of a position.

use crate::core::Color;

use std::fmt;

bitflags! {
    /// The four castling rights packed into one byte. The mask participates
    /// in the Zobrist hash, so its bit layout is fixed.
    pub struct Castling: u8 {
        const WHITE_KINGSIDE  = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE  = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;
        const WHITE_ALL = Self::WHITE_KINGSIDE.bits | Self::WHITE_QUEENSIDE.bits;
        const BLACK_ALL = Self::BLACK_KINGSIDE.bits | Self::BLACK_QUEENSIDE.bits;
        const ALL = Self::WHITE_ALL.bits | Self::BLACK_ALL.bits;
    }
}

impl Castling {
    /// Both rights of one color.
    #[inline(always)]
    pub fn color_all(c: Color) -> Castling {
        match c {
            Color::White => Castling::WHITE_ALL,
            Color::Black => Castling::BLACK_ALL,
        }
    }

    /// The kingside right of one color.
    #[inline(always)]
    pub fn kingside(c: Color) -> Castling {
        match c {
            Color::White => Castling::WHITE_KINGSIDE,
            Color::Black => Castling::BLACK_KINGSIDE,
        }
    }

    /// The queenside right of one color.
    #[inline(always)]
    pub fn queenside(c: Color) -> Castling {
        match c {
            Color::White => Castling::WHITE_QUEENSIDE,
            Color::Black => Castling::BLACK_QUEENSIDE,
        }
    }

    /// Returns `true` if color `c` still has the kingside right.
    #[inline(always)]
    pub fn has_kingside(self, c: Color) -> bool {
        self.contains(Castling::kingside(c))
    }

    /// Returns `true` if color `c` still has the queenside right.
    #[inline(always)]
    pub fn has_queenside(self, c: Color) -> bool {
        self.contains(Castling::queenside(c))
    }
}

impl fmt::Display for Castling {
    /// Formats the mask the way the FEN castling field does (`-` when no
    /// rights remain).
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        if self.contains(Castling::WHITE_KINGSIDE) {
            write!(f, "K")?;
        }
        if self.contains(Castling::WHITE_QUEENSIDE) {
            write!(f, "Q")?;
        }
        if self.contains(Castling::BLACK_KINGSIDE) {
            write!(f, "k")?;
        }
        if self.contains(Castling::BLACK_QUEENSIDE) {
            write!(f, "q")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_fen() {
        assert_eq!(Castling::ALL.to_string(), "KQkq");
        assert_eq!(Castling::empty().to_string(), "-");
        assert_eq!(
            (Castling::WHITE_KINGSIDE | Castling::BLACK_QUEENSIDE).to_string(),
            "Kq"
        );
    }

    #[test]
    fn per_color_helpers() {
        let mask = Castling::WHITE_ALL;
        assert!(mask.has_kingside(Color::White));
        assert!(mask.has_queenside(Color::White));
        assert!(!mask.has_kingside(Color::Black));
    }
}
