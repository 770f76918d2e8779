use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::answer::{Answer, AnswerDraft};
use crate::session::question::QuizQuestion;
use crate::session::quiz::{Feedback, Verdict};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// The current question with the answer being composed, or the verdict once
/// it was submitted.
pub struct QuestionCard<'a> {
    pub question: &'a QuizQuestion,
    pub number: usize,
    pub total: usize,
    pub draft: Option<&'a AnswerDraft>,
    pub input: &'a LineInput,
    pub feedback: Option<&'a Feedback>,
    pub theme: &'a Theme,
}

impl<'a> QuestionCard<'a> {
    pub fn new(question: &'a QuizQuestion, input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            question,
            number: 1,
            total: 1,
            draft: None,
            input,
            feedback: None,
            theme,
        }
    }

    pub fn position(mut self, number: usize, total: usize) -> Self {
        self.number = number;
        self.total = total;
        self
    }

    pub fn draft(mut self, draft: Option<&'a AnswerDraft>) -> Self {
        self.draft = draft;
        self
    }

    pub fn feedback(mut self, feedback: Option<&'a Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let mut lines = vec![
            Line::from(Span::styled(
                self.question.prompt().to_string(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        match self.question {
            QuizQuestion::MultipleChoice {
                options,
                correct_answer,
                ..
            } => {
                let cursor = match self.draft {
                    Some(AnswerDraft::Choice { cursor, .. }) => Some(*cursor),
                    _ => None,
                };
                let chosen = match self.feedback.and_then(|f| f.answer.as_ref()) {
                    Some(Answer::Choice(text)) => Some(text.as_str()),
                    _ => None,
                };
                for (i, option) in options.iter().enumerate() {
                    let style = if self.feedback.is_some() {
                        if option == correct_answer {
                            Style::default().fg(colors.success()).add_modifier(Modifier::BOLD)
                        } else if chosen == Some(option.as_str()) {
                            Style::default().fg(colors.error())
                        } else {
                            Style::default().fg(colors.text_dim())
                        }
                    } else if cursor == Some(i) {
                        Style::default()
                            .fg(colors.accent())
                            .bg(colors.selection_bg())
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    let marker = if cursor == Some(i) && self.feedback.is_none() {
                        ">"
                    } else {
                        " "
                    };
                    lines.push(Line::from(Span::styled(
                        format!(" {marker} [{}] {option}", i + 1),
                        style,
                    )));
                }
            }
            QuizQuestion::FillInTheBlank { .. } => match self.feedback {
                Some(feedback) => {
                    let typed = match &feedback.answer {
                        Some(Answer::Text(text)) => text.clone(),
                        _ => "(no answer)".to_string(),
                    };
                    let color = if feedback.verdict == Verdict::Correct {
                        colors.success()
                    } else {
                        colors.error()
                    };
                    lines.push(Line::from(vec![
                        Span::styled("  Your answer: ", Style::default().fg(colors.text_dim())),
                        Span::styled(typed, Style::default().fg(color)),
                    ]));
                }
                None => {
                    let mut line = self.input.to_line(
                        Style::default().fg(colors.fg()),
                        Style::default().fg(colors.bg()).bg(colors.accent()),
                    );
                    line.spans.insert(
                        0,
                        Span::styled("  Answer: ", Style::default().fg(colors.text_dim())),
                    );
                    lines.push(line);
                }
            },
            QuizQuestion::Matching { pairs, .. } => {
                let (definitions, choices, row) = match self.draft {
                    Some(AnswerDraft::Matching {
                        definitions,
                        choices,
                        row,
                    }) => (definitions.as_slice(), choices.as_slice(), *row),
                    _ => (&[][..], &[][..], 0),
                };
                let submitted = match self.feedback.and_then(|f| f.answer.as_ref()) {
                    Some(Answer::Matches(matches)) => Some(matches),
                    _ => None,
                };
                let width = pairs.iter().map(|p| p.term.chars().count()).max().unwrap_or(0);

                for (i, pair) in pairs.iter().enumerate() {
                    let picked = choices
                        .get(i)
                        .copied()
                        .flatten()
                        .and_then(|c| definitions.get(c))
                        .map(|d| d.as_str());
                    let (text, style) = match (self.feedback, submitted) {
                        (Some(_), Some(matches)) => {
                            let given = matches.get(&pair.term);
                            if given == Some(&pair.definition) {
                                (pair.definition.clone(), Style::default().fg(colors.success()))
                            } else {
                                (
                                    given.cloned().unwrap_or_default(),
                                    Style::default().fg(colors.error()),
                                )
                            }
                        }
                        (Some(_), None) => (String::new(), Style::default().fg(colors.error())),
                        (None, _) => match picked {
                            Some(d) => (d.to_string(), Style::default().fg(colors.fg())),
                            None => (
                                "(choose with \u{2190}/\u{2192})".to_string(),
                                Style::default().fg(colors.text_dim()),
                            ),
                        },
                    };
                    let active = self.feedback.is_none() && i == row;
                    let term_style = if active {
                        Style::default()
                            .fg(colors.accent())
                            .bg(colors.selection_bg())
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(colors.fg())
                    };
                    let marker = if active { ">" } else { " " };
                    lines.push(Line::from(vec![
                        Span::styled(format!(" {marker} {:<width$}", pair.term), term_style),
                        Span::styled("  \u{2192}  ", Style::default().fg(colors.text_dim())),
                        Span::styled(text, style),
                    ]));
                }
            }
        }

        if let Some(feedback) = self.feedback {
            lines.push(Line::from(""));
            let color = match feedback.verdict {
                Verdict::Correct => colors.success(),
                Verdict::Incorrect => colors.error(),
                Verdict::TimedOut => colors.warning(),
            };
            let mut headline = vec![Span::styled(
                feedback.verdict.headline(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            if feedback.points > 0 {
                headline.push(Span::styled(
                    format!("  +{} points", feedback.points),
                    Style::default().fg(colors.accent()),
                ));
            }
            lines.push(Line::from(headline));
            if feedback.verdict != Verdict::Correct {
                lines.push(Line::from(vec![
                    Span::styled("Correct answer: ", Style::default().fg(colors.text_dim())),
                    Span::styled(
                        feedback.correct_answer.clone(),
                        Style::default().fg(colors.success()),
                    ),
                ]));
            }
        }

        lines
    }
}

impl Widget for QuestionCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(format!(
                " Question {} of {} \u{00b7} {} ",
                self.number,
                self.total,
                self.question.kind().label()
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn mc() -> QuizQuestion {
        QuizQuestion::MultipleChoice {
            question: "Pick one".to_string(),
            options: vec!["cat".to_string(), "dog".to_string()],
            correct_answer: "dog".to_string(),
        }
    }

    #[test]
    fn test_choice_cursor_is_marked() {
        let theme = Theme::default();
        let input = LineInput::default();
        let question = mc();
        let draft = AnswerDraft::Choice { cursor: 1, len: 2 };
        let card = QuestionCard::new(&question, &input, &theme).draft(Some(&draft));
        let lines = text(&card.lines());
        assert_eq!(lines[2], "   [1] cat");
        assert_eq!(lines[3], " > [2] dog");
    }

    #[test]
    fn test_feedback_shows_correct_answer() {
        let theme = Theme::default();
        let input = LineInput::default();
        let question = mc();
        let feedback = Feedback {
            verdict: Verdict::Incorrect,
            points: 0,
            answer: Some(Answer::Choice("cat".to_string())),
            correct_answer: "dog".to_string(),
        };
        let card = QuestionCard::new(&question, &input, &theme).feedback(Some(&feedback));
        let lines = text(&card.lines());
        assert!(lines.contains(&"Incorrect.".to_string()));
        assert!(lines.contains(&"Correct answer: dog".to_string()));
    }
}
