use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct HelpSection {
    pub title: &'static str,
    pub items: &'static [(&'static str, &'static str)],
}

pub const SECTIONS: &[HelpSection] = &[
    HelpSection {
        title: "Tree:",
        items: &[
            ("i", "Insert value"),
            ("d", "Delete value"),
            ("c", "Clear tree"),
            ("t", "Next tree type"),
            ("m", "Set M-Vías degree"),
            ("x", "Toggle mirror view"),
        ],
    },
    HelpSection {
        title: "Queries:",
        items: &[
            ("1-4", "In/pre/post-order, breadth-first"),
            ("n", "Tree info"),
            ("r", "Refresh"),
        ],
    },
    HelpSection {
        title: "View:",
        items: &[
            ("hjkl", "Pan"),
            ("+/-", "Zoom in/out"),
            ("f", "Fit tree"),
            ("0", "Reset view"),
        ],
    },
    HelpSection {
        title: "App:",
        items: &[("?", "Help"), ("q", "Quit")],
    },
];

pub struct HelpRenderer;

impl HelpRenderer {
    pub fn render(frame: &mut Frame, area: Rect) {
        let popup = centered(area, 44, 28);
        let block = Block::default().borders(Borders::ALL).title(" Help ");
        let paragraph = Paragraph::new(Self::build_help_text())
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(Clear, popup);
        frame.render_widget(paragraph, popup);
    }

    pub fn build_help_text() -> Vec<Line<'static>> {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();

        for section in SECTIONS {
            lines.push(Line::from(Span::styled(section.title, bold)));
            for (key, desc) in section.items {
                lines.push(Line::from(format!("  {key:<4} {desc}")));
            }
            lines.push(Line::from(""));
        }

        lines.push(Line::from("Press ESC or q to close help"));
        lines
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
