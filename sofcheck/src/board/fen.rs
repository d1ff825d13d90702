//! FEN parsing and formatting for [`Board`], plus validation and the pretty
//! printers.
//!
//! [`Board`]: ../struct.Board.html

use super::castle_rights::Castling;
use super::Board;
use crate::core::piece_move::{enpassant_dst_row, enpassant_src_row};
use crate::core::sq::{NO_SQ, SQ};
use crate::core::{Cell, Color, Piece};

use std::fmt;

/// Errors encountered while reading a FEN string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenParseError {
    /// A field separator was missing.
    ExpectedSpace,
    /// A numeric field could not be read as an unsigned 16-bit value.
    ExpectedUint16,
    /// A character which has no meaning at its position.
    UnexpectedCharacter,
    /// A board row describes more than eight squares.
    BoardRowOverflow,
    /// A board row describes fewer than eight squares.
    BoardRowUnderflow,
    /// More than eight board rows.
    TooManyRows,
    /// Fewer than eight board rows.
    NotEnoughRows,
    /// The same castling right was listed twice.
    CastlingDuplicate,
    /// The castling field was empty.
    CastlingFieldMissing,
    /// The en-passant field does not denote a valid cell for the side to
    /// move.
    EnpassantInvalidCell,
    /// The parsed position fails validation.
    InvalidPosition(ValidateError),
}

impl fmt::Display for FenParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FenParseError::ExpectedSpace => write!(f, "expected space"),
            FenParseError::ExpectedUint16 => write!(f, "expected unsigned 16-bit integer"),
            FenParseError::UnexpectedCharacter => write!(f, "unexpected character"),
            FenParseError::BoardRowOverflow => write!(f, "too many items in board row"),
            FenParseError::BoardRowUnderflow => write!(f, "too few items in board row"),
            FenParseError::TooManyRows => write!(f, "too many board rows"),
            FenParseError::NotEnoughRows => write!(f, "too few board rows"),
            FenParseError::CastlingDuplicate => write!(f, "duplicate castling right"),
            FenParseError::CastlingFieldMissing => write!(f, "castling field is missing"),
            FenParseError::EnpassantInvalidCell => write!(f, "invalid en-passant cell"),
            FenParseError::InvalidPosition(v) => write!(f, "invalid position: {}", v),
        }
    }
}

impl std::error::Error for FenParseError {}

/// Defects [`Board::validate`] can find in a position.
///
/// [`Board::validate`]: ../struct.Board.html#method.validate
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// Cells hold values outside the valid range.
    BadData,
    /// A side has more than sixteen pieces.
    TooManyPieces,
    /// A side has no king.
    NoKing,
    /// A side has more than one king.
    TooManyKings,
    /// The en-passant pawn stands on an impossible row.
    InvalidEnpassantRow,
    /// A pawn stands on the first or the last row.
    InvalidPawnPosition,
    /// The king of the side not to move is attacked.
    OpponentKingAttacked,
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidateError::BadData => write!(f, "bad cell data"),
            ValidateError::TooManyPieces => write!(f, "more than 16 pieces of one color"),
            ValidateError::NoKing => write!(f, "missing king"),
            ValidateError::TooManyKings => write!(f, "more than one king of one color"),
            ValidateError::InvalidEnpassantRow => write!(f, "invalid en-passant row"),
            ValidateError::InvalidPawnPosition => write!(f, "pawn on the first or last row"),
            ValidateError::OpponentKingAttacked => write!(f, "opponent's king is attacked"),
        }
    }
}

impl std::error::Error for ValidateError {}

/// Board rendering style for terminal output.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PrettyStyle {
    Ascii,
    Utf8,
}

pub(super) fn board_from_fen(s: &str) -> Result<Board, FenParseError> {
    let mut b = Board::empty();
    let mut fields = s.split(' ').filter(|f| !f.is_empty());

    // 1. Piece placement
    let placement = fields.next().ok_or(FenParseError::NotEnoughRows)?;
    let mut rows = 0usize;
    for row_str in placement.split('/') {
        if rows == 8 {
            return Err(FenParseError::TooManyRows);
        }
        let mut file = 0u8;
        for ch in row_str.chars() {
            if let Some(skip) = ch.to_digit(10) {
                if skip == 0 || skip == 9 {
                    return Err(FenParseError::UnexpectedCharacter);
                }
                file += skip as u8;
            } else {
                let cell = Cell::from_char(ch).ok_or(FenParseError::UnexpectedCharacter)?;
                if file >= 8 {
                    return Err(FenParseError::BoardRowOverflow);
                }
                b.cells[SQ::make(file, rows as u8).0 as usize] = cell;
                file += 1;
            }
            if file > 8 {
                return Err(FenParseError::BoardRowOverflow);
            }
        }
        if file < 8 {
            return Err(FenParseError::BoardRowUnderflow);
        }
        rows += 1;
    }
    if rows != 8 {
        return Err(FenParseError::NotEnoughRows);
    }

    // 2. Side to move
    let side = fields.next().ok_or(FenParseError::ExpectedSpace)?;
    b.side = match side {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(FenParseError::UnexpectedCharacter),
    };

    // 3. Castling rights
    let castling = fields.next().ok_or(FenParseError::ExpectedSpace)?;
    if castling.is_empty() {
        return Err(FenParseError::CastlingFieldMissing);
    }
    if castling != "-" {
        for ch in castling.chars() {
            let right = match ch {
                'K' => Castling::WHITE_KINGSIDE,
                'Q' => Castling::WHITE_QUEENSIDE,
                'k' => Castling::BLACK_KINGSIDE,
                'q' => Castling::BLACK_QUEENSIDE,
                _ => return Err(FenParseError::UnexpectedCharacter),
            };
            if b.castling.contains(right) {
                return Err(FenParseError::CastlingDuplicate);
            }
            b.castling.insert(right);
        }
    }

    // 4. En passant. The FEN names the square behind the double-moved pawn;
    // internally we keep the square of the pawn itself.
    let ep = fields.next().ok_or(FenParseError::ExpectedSpace)?;
    if ep != "-" {
        let sq = SQ::from_algebraic(ep).ok_or(FenParseError::EnpassantInvalidCell)?;
        if sq.rank() != enpassant_dst_row(b.side) {
            return Err(FenParseError::EnpassantInvalidCell);
        }
        b.ep_square = SQ::make(sq.file(), enpassant_src_row(b.side));
    }

    // 5, 6. Move counters
    let counter = fields.next().ok_or(FenParseError::ExpectedSpace)?;
    b.move_counter = counter
        .parse::<u16>()
        .map_err(|_| FenParseError::ExpectedUint16)?;
    let number = fields.next().ok_or(FenParseError::ExpectedSpace)?;
    b.move_number = number
        .parse::<u16>()
        .map_err(|_| FenParseError::ExpectedUint16)?;

    b.update();
    b.validate().map_err(FenParseError::InvalidPosition)?;
    Ok(b)
}

pub(super) fn board_to_fen(b: &Board) -> String {
    let mut s = String::with_capacity(90);
    for rank in 0..8u8 {
        if rank != 0 {
            s.push('/');
        }
        let mut blanks = 0u32;
        for file in 0..8u8 {
            let cell = b.cells[SQ::make(file, rank).0 as usize];
            match cell.to_char() {
                Some(ch) => {
                    if blanks != 0 {
                        s.push(std::char::from_digit(blanks, 10).unwrap());
                        blanks = 0;
                    }
                    s.push(ch);
                }
                None => blanks += 1,
            }
        }
        if blanks != 0 {
            s.push(std::char::from_digit(blanks, 10).unwrap());
        }
    }

    s.push(' ');
    s.push(match b.side {
        Color::White => 'w',
        Color::Black => 'b',
    });
    s.push(' ');
    s.push_str(&b.castling.to_string());
    s.push(' ');
    if b.ep_square == NO_SQ {
        s.push('-');
    } else {
        let behind = b.ep_square.offset(b.side.pawn_forward_delta());
        s.push(behind.file_char());
        s.push(behind.rank_char());
    }
    s.push(' ');
    s.push_str(&b.move_counter.to_string());
    s.push(' ');
    s.push_str(&b.move_number.to_string());
    s
}

pub(super) fn board_to_pretty(b: &Board, style: PrettyStyle) -> String {
    let mut s = String::with_capacity(300);
    for rank in 0..8u8 {
        s.push((b'8' - rank) as char);
        s.push('|');
        for file in 0..8u8 {
            let cell = b.cells[SQ::make(file, rank).0 as usize];
            match style {
                PrettyStyle::Ascii => {
                    s.push(cell.to_char().unwrap_or('.'));
                }
                PrettyStyle::Utf8 => {
                    s.push(utf8_cell_char(cell));
                }
            }
            if file != 7 {
                s.push(' ');
            }
        }
        s.push('\n');
    }
    s.push_str("--+----------------\n");
    s.push_str("  |a b c d e f g h\n");
    s
}

fn utf8_cell_char(cell: Cell) -> char {
    match cell {
        Cell::Empty => '.',
        Cell::WhitePawn => '♙',
        Cell::WhiteKing => '♔',
        Cell::WhiteKnight => '♘',
        Cell::WhiteBishop => '♗',
        Cell::WhiteRook => '♖',
        Cell::WhiteQueen => '♕',
        Cell::BlackPawn => '♟',
        Cell::BlackKing => '♚',
        Cell::BlackKnight => '♞',
        Cell::BlackBishop => '♝',
        Cell::BlackRook => '♜',
        Cell::BlackQueen => '♛',
    }
}

pub(super) fn validate(b: &Board) -> Result<(), ValidateError> {
    use crate::board::movegen::is_cell_attacked;
    use crate::core::masks::BB_ROW;

    // Counts per side, kings, and pawn rows.
    for &color in [Color::White, Color::Black].iter() {
        let total = b.color_bb(color).count_bits();
        if total > 16 {
            return Err(ValidateError::TooManyPieces);
        }
        let kings = b.piece_bb(color, Piece::King).count_bits();
        if kings == 0 {
            return Err(ValidateError::NoKing);
        }
        if kings > 1 {
            return Err(ValidateError::TooManyKings);
        }
        let pawns = b.piece_bb(color, Piece::Pawn);
        if (pawns.0 & (BB_ROW[0] | BB_ROW[7])) != 0 {
            return Err(ValidateError::InvalidPawnPosition);
        }
    }

    if b.ep_square != NO_SQ && b.ep_square.rank() != enpassant_src_row(b.side) {
        return Err(ValidateError::InvalidEnpassantRow);
    }

    // The side that just moved must not have left its king in check.
    let opponent = b.side.invert();
    if is_cell_attacked(b, b.king_pos(opponent), b.side) {
        return Err(ValidateError::OpponentKingAttacked);
    }

    Ok(())
}
