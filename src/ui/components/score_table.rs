use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table, Widget};

use crate::store::schema::HighScore;
use crate::ui::theme::Theme;

pub struct ScoreTable<'a> {
    pub scores: &'a [HighScore],
    /// Entry to highlight, e.g. the score just recorded.
    pub highlight: Option<uuid::Uuid>,
    pub theme: &'a Theme,
}

impl<'a> ScoreTable<'a> {
    pub fn new(scores: &'a [HighScore], theme: &'a Theme) -> Self {
        Self {
            scores,
            highlight: None,
            theme,
        }
    }

    pub fn highlight(mut self, id: Option<uuid::Uuid>) -> Self {
        self.highlight = id;
        self
    }
}

impl Widget for ScoreTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" High Scores ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        if self.scores.is_empty() {
            Paragraph::new(vec![
                Line::from(""),
                Line::styled(
                    "  No high scores yet. Play a quiz to get on the board!",
                    Style::default().fg(colors.text_dim()),
                ),
            ])
            .block(block)
            .render(area, buf);
            return;
        }

        let header = Row::new(["#", "Name", "Score", "Correct", "Grade", "Topic", "Date"])
            .style(
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            );

        let rows = self.scores.iter().enumerate().map(|(i, entry)| {
            let style = if Some(entry.id) == self.highlight {
                Style::default()
                    .fg(colors.accent())
                    .bg(colors.selection_bg())
            } else {
                Style::default().fg(colors.fg())
            };
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(entry.name.clone()),
                Cell::from(entry.score.to_string()),
                Cell::from(format!(
                    "{}/{} ({}%)",
                    entry.correct_answers, entry.total_questions, entry.percentage
                )),
                Cell::from(format!("{} \u{00b7} {}", entry.grade, entry.difficulty)),
                Cell::from(entry.topic.clone()),
                Cell::from(
                    entry
                        .timestamp
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d")
                        .to_string(),
                ),
            ])
            .style(style)
        });

        Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(20),
                Constraint::Length(6),
                Constraint::Length(13),
                Constraint::Length(10),
                Constraint::Min(12),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(block)
        .render(area, buf);
    }
}
