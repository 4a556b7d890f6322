use chess::{Board, ChessMove, Color, Game, GameResult, Piece, Square};
use std::str::FromStr;

use crate::error::IllegalMoveError;
use crate::models::Outcome;

/// Opaque rules engine consulted by the game loop.
///
/// Moves are exchanged as text; the oracle decides whether a move is legal in
/// the current position and what the position looks like afterwards.
pub trait RulesOracle: Send + Sync {
    /// Current position in FEN.
    fn position(&self) -> String;

    /// Checks that `notation` is legal without changing the position.
    fn check(&self, notation: &str) -> Result<(), IllegalMoveError>;

    /// Plays `notation` and returns the outcome of the resulting position.
    fn apply(&mut self, notation: &str) -> Result<Outcome, IllegalMoveError>;

    fn outcome(&self) -> Outcome;

    /// Back to the standard starting position.
    fn reset(&mut self);
}

/// [`RulesOracle`] backed by the `chess` crate.
///
/// `chess::Board` does not track the halfmove clock or fullmove number, so
/// both are kept here and spliced into the FEN.
pub struct ChessRules {
    game: Game,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl ChessRules {
    pub fn new() -> Self {
        ChessRules {
            game: Game::new(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    #[cfg(test)]
    pub fn from_fen(fen: &str) -> Result<Self, chess::Error> {
        let board = Board::from_str(fen)?;
        let mut counters = fen.split_whitespace().skip(4).map(str::parse::<u32>);
        let halfmove_clock = counters.next().and_then(Result::ok).unwrap_or(0);
        let fullmove_number = counters.next().and_then(Result::ok).unwrap_or(1);
        Ok(ChessRules {
            game: Game::new_with_board(board),
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse(&self, notation: &str) -> Result<ChessMove, IllegalMoveError> {
        let board = self.game.current_position();
        let illegal = || IllegalMoveError {
            notation: notation.to_string(),
            fen: self.position(),
        };

        let san = canonical_san(notation);
        if san.is_empty() {
            return Err(illegal());
        }

        let chess_move = ChessMove::from_san(&board, &san)
            .or_else(|_| ChessMove::from_str(&san))
            .map_err(|_| illegal())?;

        if board.legal(chess_move) {
            Ok(chess_move)
        } else {
            Err(illegal())
        }
    }

    fn advance_counters(&mut self, board: &Board, chess_move: ChessMove) {
        let pawn_move = board.piece_on(chess_move.get_source()) == Some(Piece::Pawn);
        let capture = board.piece_on(chess_move.get_dest()).is_some();
        if pawn_move || capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
    }
}

/// Rewrites spellings `ChessMove::from_san` doesn't know: zeros for castling,
/// `=` before a promotion piece, and trailing check or annotation marks.
fn canonical_san(notation: &str) -> String {
    let bare = notation.trim().trim_end_matches(['+', '#', '!', '?']);
    match bare {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        _ => match bare.split_once('=') {
            Some((target, piece)) => format!("{}{}", target, piece.to_ascii_uppercase()),
            None => bare.to_string(),
        },
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        ChessRules::new()
    }
}

impl RulesOracle for ChessRules {
    fn position(&self) -> String {
        let board = self.game.current_position().to_string();
        let fields: Vec<&str> = board.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn check(&self, notation: &str) -> Result<(), IllegalMoveError> {
        self.parse(notation).map(|_| ())
    }

    fn apply(&mut self, notation: &str) -> Result<Outcome, IllegalMoveError> {
        let chess_move = self.parse(notation)?;
        let before = self.game.current_position();
        if !self.game.make_move(chess_move) {
            return Err(IllegalMoveError {
                notation: notation.to_string(),
                fen: self.position(),
            });
        }
        self.advance_counters(&before, chess_move);

        // Claim repetition and fifty-move draws for the players
        if self.game.result().is_none() && self.game.can_declare_draw() {
            self.game.declare_draw();
        }

        Ok(self.outcome())
    }

    fn outcome(&self) -> Outcome {
        match self.game.result() {
            Some(result) => outcome_of(result),
            None if has_insufficient_material(&self.game.current_position()) => Outcome::Draw,
            None => Outcome::InProgress,
        }
    }

    fn reset(&mut self) {
        *self = ChessRules::new();
    }
}

fn outcome_of(result: GameResult) -> Outcome {
    match result {
        GameResult::WhiteCheckmates | GameResult::BlackResigns => Outcome::WhiteWins,
        GameResult::BlackCheckmates | GameResult::WhiteResigns => Outcome::BlackWins,
        GameResult::Stalemate | GameResult::DrawAccepted | GameResult::DrawDeclared => {
            Outcome::Draw
        }
    }
}

/// Neither side can possibly deliver mate: bare kings, a single minor piece, or
/// one bishop each on the same square colour.
pub fn has_insufficient_material(board: &Board) -> bool {
    let mut minors = [0u32; 2];
    let mut bishop_square_colors: [Option<usize>; 2] = [None, None];

    for square in chess::ALL_SQUARES {
        let (Some(piece), Some(color)) = (board.piece_on(square), board.color_on(square)) else {
            continue;
        };
        let side = color.to_index();

        match piece {
            Piece::King => {}
            Piece::Pawn | Piece::Rook | Piece::Queen => return false,
            Piece::Knight => minors[side] += 1,
            Piece::Bishop => {
                minors[side] += 1;
                bishop_square_colors[side] = Some(square_color(square));
            }
        }
    }

    let white = minors[Color::White.to_index()];
    let black = minors[Color::Black.to_index()];

    match (white, black) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => {
            // One bishop each on the same square colour; a knight can still help mate
            matches!(bishop_square_colors, [Some(w), Some(b)] if w == b)
        }
        _ => false,
    }
}

fn square_color(square: Square) -> usize {
    (square.get_rank().to_index() + square.get_file().to_index()) % 2
}
