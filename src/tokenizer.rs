// 🔤 CSV Tokenizer - raw text → ragged grid of cells
//
// Purely lexical: no header skipping, no trimming, no type coercion.
// Handles RFC-4180 quoting ("" inside quotes → ") and all three line-ending
// conventions (\n, \r\n, bare \r).

/// Rows × cells. Rows may have different lengths.
pub type Grid = Vec<Vec<String>>;

/// Tokenize a whole CSV document into a grid.
///
/// A row (and the cell under the cursor) only comes into existence when a
/// character is read while it is current, so a trailing line terminator does
/// not produce an extra empty row and empty input yields zero rows.
/// An unterminated quote at the end of input is closed implicitly.
pub fn tokenize(text: &str) -> Grid {
    let mut grid: Grid = Vec::new();
    let mut in_quotes = false;
    let mut row = 0usize;
    let mut col = 0usize;

    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        ensure_cell(&mut grid, row, col);

        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    grid[row][col].push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => col += 1,
            '\r' if !in_quotes => {
                // \r\n is one terminator, not two
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row += 1;
                col = 0;
            }
            '\n' if !in_quotes => {
                row += 1;
                col = 0;
            }
            _ => grid[row][col].push(c),
        }
    }

    grid
}

fn ensure_cell(grid: &mut Grid, row: usize, col: usize) {
    while grid.len() <= row {
        grid.push(Vec::new());
    }
    let cells = &mut grid[row];
    while cells.len() <= col {
        cells.push(String::new());
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_simple_rows() {
        let grid = tokenize("a,b,c\n1,2,3");

        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], row(&["a", "b", "c"]));
        assert_eq!(grid[1], row(&["1", "2", "3"]));
    }

    #[test]
    fn test_quoted_field_round_trip() {
        // a,"b" encoded as "a,""b"""
        let grid = tokenize("\"a,\"\"b\"\"\",next");

        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0], row(&["a,\"b\"", "next"]));
    }

    #[test]
    fn test_line_ending_equivalence() {
        let lf = tokenize("h1,h2\nx,\"y\nz\"\n,\n");
        let crlf = tokenize("h1,h2\r\nx,\"y\nz\"\r\n,\r\n");
        let cr = tokenize("h1,h2\rx,\"y\nz\"\r,\r");

        assert_eq!(lf, crlf);
        assert_eq!(lf, cr);
        assert_eq!(lf.len(), 3);
        assert_eq!(lf[1], row(&["x", "y\nz"]));
    }

    #[test]
    fn test_crlf_is_single_terminator() {
        let grid = tokenize("a\r\nb\r\n");

        assert_eq!(grid, vec![row(&["a"]), row(&["b"])]);
    }

    #[test]
    fn test_blank_line_is_a_row() {
        let grid = tokenize("a\n\nb");

        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], row(&[""]));
    }

    #[test]
    fn test_unterminated_quote_closes_at_eof() {
        let grid = tokenize("a,\"open,still\nopen");

        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0], row(&["a", "open,still\nopen"]));
    }

    #[test]
    fn test_no_trimming_or_coercion() {
        let grid = tokenize("  spaced , 001 ");

        assert_eq!(grid[0], row(&["  spaced ", " 001 "]));
    }

    #[test]
    fn test_ragged_rows() {
        let grid = tokenize("a,b,c\nd\ne,f,");

        assert_eq!(grid[0].len(), 3);
        assert_eq!(grid[1].len(), 1);
        assert_eq!(grid[2].len(), 2);
    }
}
