use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use typehaki::{
    diff::Verdict,
    session::{Phase, RULES},
    util::format_time,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
/// Countdown turns red at or below this many seconds.
const LOW_TIME_SECS: u32 = 10;

fn mode_badge(competition: bool) -> Span<'static> {
    if competition {
        Span::styled(
            " Competition Mode ",
            Style::default().fg(Color::Black).bg(Color::Green),
        )
    } else {
        Span::styled(
            " Practice Mode ",
            Style::default().fg(Color::Black).bg(Color::Gray),
        )
    }
}

fn centered_rows(area: Rect, rows: u16) -> [Rect; 3] {
    let pad = area.height.saturating_sub(rows) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(pad),
            Constraint::Length(rows),
            Constraint::Min(0),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default()
            .patch(bold_style)
            .fg(Color::Red)
            .bg(Color::Rgb(60, 0, 0));
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        match session.phase() {
            Phase::Rules => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        "Before You Start",
                        bold_style.fg(Color::Yellow),
                    )),
                    Line::from(""),
                ];
                lines.extend(RULES.iter().enumerate().map(|(i, rule)| {
                    Line::from(vec![
                        Span::styled(format!("{}. ", i + 1), bold_style),
                        Span::raw(*rule),
                    ])
                }));
                lines.push(Line::from(""));
                lines.push(Line::from(mode_badge(session.is_competition())));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "(enter) I understand, continue / (m) switch mode / (esc)ape",
                    italic_style,
                )));

                let [_, body, _] = centered_rows(area, lines.len() as u16);
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(body, buf);
            }
            Phase::Ready => {
                let lines = vec![
                    Line::from(mode_badge(session.is_competition())),
                    Line::from(""),
                    Line::from(Span::styled("Ready to Type?", bold_style)),
                    Line::from(""),
                    Line::from(Span::styled(
                        format_time(session.remaining_secs()),
                        bold_style.fg(Color::Cyan),
                    )),
                    Line::from(""),
                    Line::from(Span::styled("(enter) start test / (esc)ape", italic_style)),
                ];
                let [_, body, _] = centered_rows(area, lines.len() as u16);
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .render(body, buf);
            }
            Phase::Typing => {
                let reference = session.reference();
                let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
                let prompt_width = reference.as_str().width();
                let prompt_occupied_lines = if prompt_width <= max_chars_per_line as usize {
                    1
                } else {
                    ((prompt_width as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
                };

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints([
                        Constraint::Length(
                            area.height.saturating_sub(prompt_occupied_lines + 2) / 2,
                        ),
                        Constraint::Length(2),
                        Constraint::Length(prompt_occupied_lines),
                        Constraint::Min(0),
                    ])
                    .split(area);

                let remaining = session.remaining_secs();
                let timer_style = if remaining <= LOW_TIME_SECS {
                    bold_style.fg(Color::Red)
                } else {
                    bold_style.fg(Color::Cyan)
                };
                let score = session.score();
                let stats = Paragraph::new(Line::from(vec![
                    Span::styled(format!("{} wpm", score.wpm), bold_style),
                    Span::raw("   "),
                    Span::styled(format!("{}% acc", score.accuracy), bold_style),
                    Span::raw("   "),
                    Span::styled(format_time(remaining), timer_style),
                ]))
                .alignment(Alignment::Center);
                stats.render(chunks[1], buf);

                let cursor = session.cursor();
                let spans = reference
                    .chars()
                    .iter()
                    .zip(session.verdicts())
                    .enumerate()
                    .map(|(idx, (expected, verdict))| match verdict {
                        Verdict::Correct => Span::styled(expected.to_string(), green_bold_style),
                        Verdict::Incorrect => Span::styled(
                            match session.transcript()[idx] {
                                ' ' => "·".to_owned(),
                                c => c.to_string(),
                            },
                            red_bold_style,
                        ),
                        Verdict::Pending if idx == cursor => {
                            Span::styled(expected.to_string(), underlined_dim_bold_style)
                        }
                        Verdict::Pending => Span::styled(expected.to_string(), dim_bold_style),
                    })
                    .collect::<Vec<Span>>();

                Paragraph::new(Line::from(spans))
                    .alignment(if prompt_occupied_lines == 1 {
                        Alignment::Center
                    } else {
                        Alignment::Left
                    })
                    .wrap(Wrap { trim: true })
                    .render(chunks[2], buf);
            }
            Phase::Finished => {
                let score = session.score();
                let mut lines = vec![
                    Line::from(Span::styled("Test Complete!", bold_style.fg(Color::Yellow))),
                    Line::from(""),
                    Line::from(Span::styled(
                        if session.is_competition() {
                            "Your result has been recorded. Check the leaderboard for your ranking."
                        } else {
                            "Great practice session! Try again to improve your score."
                        },
                        italic_style,
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(format!("{} wpm", score.wpm), bold_style.fg(Color::Cyan)),
                        Span::raw("   "),
                        Span::styled(format!("{}% acc", score.accuracy), bold_style),
                    ]),
                ];
                if let Some(status) = &self.status {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        status.clone(),
                        Style::default().fg(Color::Gray),
                    )));
                }
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    if session.is_competition() {
                        "(esc)ape"
                    } else {
                        "(r)etry / (esc)ape"
                    },
                    italic_style,
                )));

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .vertical_margin(VERTICAL_MARGIN)
                    .constraints([Constraint::Min(0)])
                    .split(area);
                let [_, body, _] = centered_rows(chunks[0], lines.len() as u16);
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .render(body, buf);
            }
        }
    }
}
