use chess_rules_core::Position;

/// Text diagram with rank 8 on top, as White sees the board.
pub fn render(position: &Position) -> String {
    let mut out = String::new();

    for row in 0..8 {
        out.push(char::from(b'8' - row as u8));
        out.push(' ');
        for col in 0..8 {
            let symbol = position
                .piece_at_coords(row, col)
                .map_or('.', |piece| piece.char());
            out.push(' ');
            out.push(symbol);
        }
        out.push('\n');
    }
    out.push_str("   a b c d e f g h");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_start() {
        let diagram = render(&Position::new());
        let lines: Vec<&str> = diagram.lines().collect();

        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8  r n b q k b n r");
        assert_eq!(lines[4], "4  . . . . . . . .");
        assert_eq!(lines[7], "1  R N B Q K B N R");
        assert_eq!(lines[8], "   a b c d e f g h");
    }
}
