use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::raw(" s start   "),
        Span::raw("space pause/resume   "),
        Span::raw("e end   "),
        Span::raw("x discard   "),
        Span::raw("k kind   "),
        Span::raw("Tab subject   "),
        Span::raw("c chapter   "),
        Span::raw("m material   "),
        Span::raw("n task   "),
        Span::raw("t title   "),
        Span::raw("↑/↓ select   "),
        Span::raw("Enter edit   "),
        Span::raw("d delete   "),
        Span::raw("v stats   "),
        Span::raw("q quit"),
    ]);

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
