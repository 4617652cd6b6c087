use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Single-line text input with a cursor, used for the draft fields.
pub struct TextInput {
    title: &'static str,
    placeholder: &'static str,
    value: String,
    cursor_position: usize,
    is_focused: bool,
}

impl TextInput {
    pub fn new(title: &'static str, placeholder: &'static str) -> Self {
        Self {
            title,
            placeholder,
            value: String::new(),
            cursor_position: 0,
            is_focused: false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self
            .value
            .char_indices()
            .map(|(i, _)| i)
            .nth(self.cursor_position)
            .unwrap_or(self.value.len());
        self.value.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let mut chars: Vec<char> = self.value.chars().collect();
            chars.remove(self.cursor_position - 1);
            self.value = chars.into_iter().collect();
            self.cursor_position -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, text_style) = if self.value.is_empty() {
            (self.placeholder, Style::default().fg(Color::DarkGray))
        } else {
            (self.value.as_str(), Style::default())
        };

        let paragraph = Paragraph::new(text).block(block).style(text_style);
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width - 1 {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}
