use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

/// A titled list of keyed entries with one highlighted. Used for the welcome
/// menu and the grade and difficulty pickers.
pub struct Menu<'a> {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(title: &str, subtitle: &str, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            items: Vec::new(),
            selected: 0,
            theme,
        }
    }

    pub fn item(mut self, key: &str, label: &str, description: &str) -> Self {
        self.items.push(MenuItem {
            key: key.to_string(),
            label: label.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                &*self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&*self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|item| Constraint::Length(if item.description.is_empty() { 1 } else { 3 }))
                    .collect::<Vec<_>>(),
            )
            .split(layout[2]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);

            let mut label_style = Style::default().fg(if is_selected {
                colors.accent()
            } else {
                colors.fg()
            });
            if is_selected {
                label_style = label_style.add_modifier(Modifier::BOLD);
            }

            let mut lines = vec![Line::from(Span::styled(label_text, label_style))];
            if !item.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("     {}", item.description),
                    Style::default().fg(colors.text_dim()),
                )));
            }

            if let Some(row) = rows.get(i) {
                Paragraph::new(lines).render(*row, buf);
            }
        }
    }
}
