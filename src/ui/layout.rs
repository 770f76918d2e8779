use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Header bar, main body and a footer of key hints.
pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(footer_lines.max(1)),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            footer: vertical[2],
        }
    }
}

pub fn wrapped_line_count(text: &str, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let chars = text.chars().count().max(1);
    chars.div_ceil(width)
}

/// Greedily pack key hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

/// A box of at most `max_w` x `max_h` centered in `area`.
pub fn centered_box(max_w: u16, max_h: u16, area: Rect) -> Rect {
    let w = max_w.min(area.width);
    let h = max_h.min(area.height);
    let left = area.x.saturating_add(area.width.saturating_sub(w) / 2);
    let top = area.y.saturating_add(area.height.saturating_sub(h) / 2);
    Rect::new(left, top, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_hint_lines_wraps() {
        let hints = ["[Enter] Start", "[Esc] Back", "[q] Quit"];
        assert_eq!(pack_hint_lines(&hints, 80), vec!["  [Enter] Start  [Esc] Back  [q] Quit"]);
        assert_eq!(
            pack_hint_lines(&hints, 28),
            vec!["  [Enter] Start  [Esc] Back", "  [q] Quit"]
        );
        assert!(pack_hint_lines(&hints, 0).is_empty());
    }

    #[test]
    fn test_wrapped_line_count() {
        assert_eq!(wrapped_line_count("", 10), 1);
        assert_eq!(wrapped_line_count("abcdefghijk", 10), 2);
        assert_eq!(wrapped_line_count("abc", 0), 0);
    }

    #[test]
    fn test_centered_box_fits_area() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_box(60, 20, area), Rect::new(20, 10, 60, 20));
        assert_eq!(centered_box(200, 80, area), area);
    }

    #[test]
    fn test_app_layout_splits() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24), 2);
        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.height, 2);
        assert_eq!(layout.main.height, 21);
    }
}
