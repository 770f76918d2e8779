use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::grading;
use crate::session::question::QuizQuestion;
use crate::ui::theme::Theme;

/// A scrollable list of questions with their answers, for the quiz preview
/// and the question bank browser.
pub struct QuestionList<'a> {
    pub title: String,
    pub items: Vec<(&'a QuizQuestion, Option<String>)>,
    pub scroll: usize,
    pub empty_message: String,
    pub theme: &'a Theme,
}

impl<'a> QuestionList<'a> {
    pub fn new(title: &str, theme: &'a Theme) -> Self {
        Self {
            title: title.to_string(),
            items: Vec::new(),
            scroll: 0,
            empty_message: String::new(),
            theme,
        }
    }

    /// Add a question with an optional dimmed note (topic, date, ...).
    pub fn push(&mut self, question: &'a QuizQuestion, note: Option<String>) {
        self.items.push((question, note));
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn empty_message(mut self, message: &str) -> Self {
        self.empty_message = message.to_string();
        self
    }

    pub fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        if self.items.is_empty() {
            return vec![
                Line::from(""),
                Line::styled(
                    format!("  {}", self.empty_message),
                    Style::default().fg(colors.text_dim()),
                ),
            ];
        }

        let mut lines = Vec::new();
        for (i, (question, note)) in self.items.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(colors.accent())),
                Span::styled(
                    question.prompt().to_string(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]));
            if let QuizQuestion::MultipleChoice { options, .. } = question {
                lines.push(Line::styled(
                    format!("     Options: {}", options.join(" | ")),
                    Style::default().fg(colors.fg()),
                ));
            }
            lines.push(Line::from(vec![
                Span::styled("     Answer: ", Style::default().fg(colors.text_dim())),
                Span::styled(
                    grading::correct_answer_text(question),
                    Style::default().fg(colors.success()),
                ),
            ]));
            if let Some(note) = note {
                lines.push(Line::styled(
                    format!("     {note}"),
                    Style::default().fg(colors.text_dim()),
                ));
            }
            lines.push(Line::from(""));
        }
        lines
    }
}

impl Widget for QuestionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        let scroll = u16::try_from(self.scroll).unwrap_or(u16::MAX);
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_shows_message() {
        let theme = Theme::default();
        let list = QuestionList::new("Bank", &theme).empty_message("Nothing here.");
        let lines = list.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].content, "  Nothing here.");
    }

    #[test]
    fn test_items_show_answer_and_note() {
        let theme = Theme::default();
        let question = QuizQuestion::FillInTheBlank {
            question: "She ___ to school.".to_string(),
            correct_answer: "goes".to_string(),
        };
        let mut list = QuestionList::new("Preview", &theme);
        list.push(&question, Some("Topic: My Town".to_string()));
        let text: Vec<String> = list
            .lines()
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(text[0], "  1. She ___ to school.");
        assert_eq!(text[1], "     Answer: goes");
        assert_eq!(text[2], "     Topic: My Town");
    }
}
