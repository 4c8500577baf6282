//! 16×2 character display rendered to the log.
//!
//! Keeps a character buffer like the controller chip would and logs a row
//! whenever its content changes.

use tracing::debug;

use lapgate_common::consts::{DISPLAY_COLS, DISPLAY_ROWS};
use lapgate_common::hal::TextDisplay;

const ROWS: usize = DISPLAY_ROWS as usize;

/// Text display that reports through `tracing`.
#[derive(Debug, Clone)]
pub struct ConsoleDisplay {
    name: String,
    rows: [[u8; DISPLAY_COLS]; ROWS],
    cursor: (usize, usize),
    backlight: bool,
}

impl ConsoleDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: [[b' '; DISPLAY_COLS]; ROWS],
            cursor: (0, 0),
            backlight: true,
        }
    }

    /// Current content of `row`, trailing spaces included.
    pub fn row(&self, row: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| std::str::from_utf8(r).ok())
            .unwrap_or("")
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }
}

impl TextDisplay for ConsoleDisplay {
    fn clear(&mut self) {
        self.rows = [[b' '; DISPLAY_COLS]; ROWS];
        self.cursor = (0, 0);
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.cursor = (col as usize, row as usize);
    }

    fn print(&mut self, text: &str) {
        let (mut col, row) = self.cursor;
        let Some(line) = self.rows.get_mut(row) else {
            return;
        };
        let before = *line;
        for c in text.chars() {
            if col >= DISPLAY_COLS {
                break;
            }
            line[col] = if c.is_ascii() { c as u8 } else { b'?' };
            col += 1;
        }
        self.cursor.0 = col;
        if before != *line {
            debug!(display = %self.name, row, "|{}|", self.row(row));
        }
    }

    fn set_backlight(&mut self, on: bool) {
        if self.backlight != on {
            debug!(display = %self.name, on, "backlight");
        }
        self.backlight = on;
    }
}
