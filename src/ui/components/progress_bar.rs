use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// A bordered one-row gauge with a caption centered over the fill.
pub struct ProgressBar<'a> {
    pub label: String,
    pub caption: String,
    pub ratio: f64,
    /// Fill with the warning color instead of the bar color.
    pub urgent: bool,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(label: &str, caption: &str, ratio: f64, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            caption: caption.to_string(),
            ratio: ratio.clamp(0.0, 1.0),
            urgent: false,
            theme,
        }
    }

    pub fn urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio * inner.width as f64).round() as u16;
        let fill = if self.urgent {
            colors.warning()
        } else {
            colors.bar_filled()
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let width = self.caption.chars().count() as u16;
        let caption_x = inner.x + inner.width.saturating_sub(width) / 2;
        buf.set_stringn(
            caption_x,
            inner.y,
            &self.caption,
            inner.width as usize,
            Style::default().fg(colors.fg()),
        );
    }
}
