use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::result::SessionResult;
use crate::ui::theme::Theme;

/// End-of-quiz summary.
pub struct Dashboard<'a> {
    pub result: &'a SessionResult,
    pub player: &'a str,
    /// 1-based place on the high score table, if the result made it.
    pub rank: Option<usize>,
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(result: &'a SessionResult, player: &'a str, theme: &'a Theme) -> Self {
        Self {
            result,
            player,
            rank: None,
            theme,
        }
    }

    pub fn rank(mut self, rank: Option<usize>) -> Self {
        self.rank = rank;
        self
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Quiz Complete ")
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut title_spans = vec![Span::styled(
            format!("Well played, {}!", self.player),
            Style::default()
                .fg(colors.accent())
                .add_modifier(Modifier::BOLD),
        )];
        if self.result.ended_early {
            title_spans.push(Span::styled(
                "  (ended early)",
                Style::default().fg(colors.text_dim()),
            ));
        }
        Paragraph::new(Line::from(title_spans))
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let score_line = Line::from(vec![
            Span::styled("  Score:    ", Style::default().fg(colors.fg())),
            Span::styled(
                self.result.score.to_string(),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                match self.rank {
                    Some(rank) => format!("  (#{rank} on the high score table)"),
                    None => String::new(),
                },
                Style::default().fg(colors.text_dim()),
            ),
        ]);
        Paragraph::new(score_line).render(layout[1], buf);

        let pct = self.result.percentage();
        let pct_color = if pct >= 80 {
            colors.success()
        } else if pct >= 40 {
            colors.warning()
        } else {
            colors.error()
        };
        let correct_line = Line::from(vec![
            Span::styled("  Correct:  ", Style::default().fg(colors.fg())),
            Span::styled(
                format!("{pct}%"),
                Style::default().fg(pct_color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ({}/{} questions)",
                    self.result.correct_answers, self.result.total_questions
                ),
                Style::default().fg(colors.text_dim()),
            ),
        ]);
        Paragraph::new(correct_line).render(layout[2], buf);

        Paragraph::new(Line::from(Span::styled(
            format!("  {}", self.result.feedback_message()),
            Style::default().fg(colors.fg()),
        )))
        .wrap(Wrap { trim: false })
        .render(layout[3], buf);
    }
}
