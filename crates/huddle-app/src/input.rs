//! Terminal-agnostic keyboard input and the line editor.

/// Keyboard input abstraction.
///
/// Decouples application logic from terminal libraries (crossterm, termion,
/// etc.) enabling deterministic simulation testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Printable character.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key (delete character before cursor).
    Backspace,
    /// Delete key (delete character at cursor).
    Delete,
    /// Escape key (quit).
    Esc,
    /// Left arrow key.
    Left,
    /// Right arrow key.
    Right,
    /// Home key (cursor to start).
    Home,
    /// End key (cursor to end).
    End,
}

/// Outcome of a key press on the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    /// Nothing changed.
    Unchanged,
    /// Cursor moved; text is the same.
    Moved,
    /// Text changed.
    Edited,
    /// Enter pressed. Carries the submitted line; the buffer is now empty.
    Submit(String),
    /// Escape pressed.
    Cancel,
}

/// Single-line text input.
///
/// The cursor counts characters, not bytes, so multi-byte input edits
/// cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// Text buffer for user input.
    buffer: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply a key press.
    pub fn apply(&mut self, key: KeyInput) -> InputEdit {
        let len = self.buffer.chars().count();

        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                InputEdit::Edited
            },
            KeyInput::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputEdit::Edited
            },
            KeyInput::Delete if self.cursor < len => {
                let at = self.byte_offset(self.cursor);
                self.buffer.remove(at);
                InputEdit::Edited
            },
            KeyInput::Left if self.cursor > 0 => {
                self.cursor -= 1;
                InputEdit::Moved
            },
            KeyInput::Right if self.cursor < len => {
                self.cursor += 1;
                InputEdit::Moved
            },
            KeyInput::Home if self.cursor > 0 => {
                self.cursor = 0;
                InputEdit::Moved
            },
            KeyInput::End if self.cursor < len => {
                self.cursor = len;
                InputEdit::Moved
            },
            KeyInput::Enter => {
                self.cursor = 0;
                InputEdit::Submit(std::mem::take(&mut self.buffer))
            },
            KeyInput::Esc => InputEdit::Cancel,
            KeyInput::Backspace
            | KeyInput::Delete
            | KeyInput::Left
            | KeyInput::Right
            | KeyInput::Home
            | KeyInput::End => InputEdit::Unchanged,
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }
}
