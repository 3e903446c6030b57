use lopper_core::domain::{ProcessingState, ProgressRecord, Repository};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::model::TuiModel;

/// Rows used by everything except the body: header, body border, footer
pub const CHROME_HEIGHT: u16 = 5;

pub const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const SPINNER_COLOR: Color = Color::Indexed(205);

/// The View component of MVU - responsible for rendering the model
pub struct TuiView;

impl TuiView {
    /// Render the entire TUI based on the current model state
    pub fn render(model: &TuiModel, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Header
                Constraint::Min(0),    // Repository tree
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        Self::render_header(model, frame, chunks[0]);
        Self::render_body(model, frame, chunks[1]);
        Self::render_footer(model, frame, chunks[2]);
    }

    fn render_header(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(Self::header_lines(model));
        frame.render_widget(paragraph, area);
    }

    fn render_body(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let offset = u16::try_from(model.ui_state.scroll_offset).unwrap_or(u16::MAX);
        let paragraph = Paragraph::new(Self::body_lines(model))
            .block(Block::default().borders(Borders::ALL))
            .scroll((offset, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_footer(model: &TuiModel, frame: &mut Frame, area: Rect) {
        let status = if model.is_finished() { "done" } else { "running" };
        let footer = Line::from(vec![
            Span::styled(
                format!("{}%", model.scroll_percent()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" · {status} · ↑/k up · ↓/j down · q quit"),
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        frame.render_widget(Paragraph::new(footer), area);
    }

    /// Progress counter and the number of deleted branches
    pub fn header_lines(model: &TuiModel) -> Vec<Line<'static>> {
        let projection = &model.projection;
        let dry_run = if model.dry_run { "[dry run] " } else { "" };
        vec![
            Line::from(Span::styled(
                format!(
                    "Repositories ({}/{})",
                    projection.processed_count(),
                    projection.total()
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!(
                    "{dry_run}Branches Deleted - {}",
                    projection.total_deleted_branches()
                ),
                Style::default().fg(Color::Gray),
            )),
        ]
    }

    /// One line per repository, followed by its deleted branches and errors as a tree
    pub fn body_lines(model: &TuiModel) -> Vec<Line<'static>> {
        let projection = &model.projection;
        if !projection.loaded {
            return vec![Line::from("Loading...")];
        }
        if projection.total() == 0 {
            return vec![Line::from("There are no repositories in this directory.")];
        }

        let mut lines = Vec::with_capacity(model.content_height());
        for (repo, record) in projection.entries() {
            lines.push(Self::repository_line(model, repo, record));

            let children: Vec<(String, Style)> = record
                .deleted_branches
                .iter()
                .map(|b| (b.clone(), Style::default().fg(Color::Gray)))
                .chain(
                    record
                        .errors
                        .iter()
                        .map(|e| (e.to_string(), Style::default().fg(Color::Red))),
                )
                .collect();

            let last = children.len().saturating_sub(1);
            for (i, (text, style)) in children.into_iter().enumerate() {
                let branch = if i == last { "└" } else { "├" };
                lines.push(Line::from(vec![
                    Span::styled(format!("  {branch} "), Style::default().fg(Color::DarkGray)),
                    Span::styled(text, style),
                ]));
            }
        }
        lines
    }

    fn repository_line(model: &TuiModel, repo: &Repository, record: &ProgressRecord) -> Line<'static> {
        let icon = match record.state {
            ProcessingState::Pending => Span::raw(" "),
            ProcessingState::InProgress => Span::styled(
                SPINNER_FRAMES[model.ui_state.spinner_frame % SPINNER_FRAMES.len()],
                Style::default().fg(SPINNER_COLOR),
            ),
            ProcessingState::Completed => Span::styled("✔", Style::default().fg(Color::Green)),
            ProcessingState::Failed => Span::styled("✘", Style::default().fg(Color::Red)),
        };
        Line::from(vec![icon, Span::raw(" "), Span::raw(repo.name.clone())])
    }

    /// The same content as the TUI, as plain text
    pub fn report(model: &TuiModel) -> String {
        Self::header_lines(model)
            .iter()
            .chain(Self::body_lines(model).iter())
            .map(line_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|span| span.content.as_ref()).collect()
}
