use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use crate::columns::{self, picture_column};
use crate::model::{Model, Status};
use crate::region::{AlertKind, LOADING_TEXT};
use crate::table::{RenderedTable, get_visible_name};
use crate::tooltip::{HoverTarget, OVERLAY_ALT, overlay_area};

pub const SEARCH_BAR_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const MESSAGE_HEIGHT: u16 = 3;
pub const TABLE_HEADER_HEIGHT: u16 = 1;
pub const COLUMN_SPACING: u16 = 1;
pub const RESET_LABEL: &str = "[ Reset ]";

/// Screen geometry of the last draw, used to resolve mouse positions.
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    pub search: Rect,
    pub reset: Rect,
    pub thumbnails: Vec<HoverTarget>,
}

#[derive(Debug, Default)]
pub struct TableUI {
    hits: HitMap,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit_map(&self) -> &HitMap {
        &self.hits
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let [search_area, region_area, status_area] = Layout::vertical([
            Constraint::Length(SEARCH_BAR_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.hits = HitMap::default();
        self.draw_search_bar(model, frame, search_area);
        self.draw_region(model, frame, region_area);
        Self::draw_statusline(model, frame, status_area);

        if let Some(text) = model.popup_message() {
            Self::draw_popup(text, frame);
        }
    }

    fn draw_search_bar(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let [input_area, reset_area] = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(RESET_LABEL.len() as u16 + 2),
        ])
        .areas(area);
        self.hits.search = input_area;
        self.hits.reset = reset_area;

        let active = model.raw_keyevents();
        let border_style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let block = Block::bordered()
            .title(Line::from(" Search ".bold()))
            .border_style(border_style);
        let inner = block.inner(input_area);

        let input = model.search_input();
        let text = match model.status {
            Status::READY if input.input.is_empty() && !active => {
                Line::from("Type / to search by name".dark_gray())
            }
            Status::READY => Line::from(input.input.as_str()),
            _ => Line::from("Waiting for users ...".dark_gray()),
        };
        frame.render_widget(Paragraph::new(text).block(block), input_area);

        if active {
            let x = inner.x + (input.curser_pos as u16).min(inner.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }

        let reset_style = if model.status == Status::READY {
            Style::default().fg(Color::Blue).bold()
        } else {
            Style::default().dark_gray()
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(RESET_LABEL, reset_style)))
                .centered()
                .block(Block::bordered()),
            reset_area,
        );
    }

    fn draw_region(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let region = model.region();

        if let Some(spinner) = region.spinner() {
            let [_, line, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(area);
            let text = format!("{} {}", spinner.frame(Instant::now()), LOADING_TEXT);
            frame.render_widget(Paragraph::new(text.blue()).centered(), line);
            return;
        }

        let mut rest = area;
        if let Some(alert) = region.message() {
            let [message_area, table_area] =
                Layout::vertical([Constraint::Length(MESSAGE_HEIGHT), Constraint::Min(0)])
                    .areas(area);
            let (title, color) = match alert.kind {
                AlertKind::Info => (" Info ", Color::Blue),
                AlertKind::Error => (" Error ", Color::Red),
            };
            let block = Block::bordered()
                .title(title)
                .border_style(Style::default().fg(color));
            frame.render_widget(
                Paragraph::new(alert.text.as_str())
                    .fg(color)
                    .wrap(Wrap { trim: true })
                    .block(block),
                message_area,
            );
            rest = table_area;
        }

        if let Some(table) = region.table() {
            self.draw_table(table, model.config().max_column_width, frame, rest);
        }

        if let Some(overlay) = region.overlay() {
            let popup = overlay_area(overlay, frame.area());
            let block = Block::bordered()
                .title(Line::from(OVERLAY_ALT.bold()))
                .border_set(border::ROUNDED);
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(overlay.url.as_str().yellow()).block(block),
                popup,
            );
        }
    }

    fn draw_table(
        &mut self,
        table: &RenderedTable,
        max_column_width: usize,
        frame: &mut Frame,
        area: Rect,
    ) {
        let widths = table.column_widths(max_column_width);
        let constraints: Vec<Constraint> = widths
            .iter()
            .map(|&w| Constraint::Length(w as u16))
            .collect();

        let header = Row::new(
            table
                .header
                .iter()
                .zip(widths.iter())
                .map(|(name, &w)| Cell::from(get_visible_name(name, w))),
        )
        .style(Style::default().bold().underlined())
        .height(TABLE_HEADER_HEIGHT);

        let rows = table.rows.iter().map(|row| {
            Row::new(row.cells.iter().zip(widths.iter()).map(|(cell, &w)| {
                let text = get_visible_name(&cell.text(), w);
                match cell {
                    columns::Cell::Thumbnail { .. } => Cell::from(text.cyan()),
                    columns::Cell::Text(_) => Cell::from(text),
                }
            }))
        });

        let block = Block::bordered().title(Line::from(
            format!(" Users ({}) ", table.nrows()).bold(),
        ));
        let inner = block.inner(area);

        frame.render_widget(
            Table::new(rows, constraints.clone())
                .header(header)
                .column_spacing(COLUMN_SPACING)
                .flex(Flex::Start)
                .block(block),
            area,
        );

        // Same split the table widget does, to know where the thumbnails landed.
        let column_areas = Layout::horizontal(constraints)
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .split(Rect { height: 1, ..inner });
        if let Some(pic) = column_areas.get(picture_column()) {
            let first_row = inner.y + TABLE_HEADER_HEIGHT;
            self.hits.thumbnails = (first_row..inner.bottom())
                .zip(0..table.nrows())
                .map(|(y, row)| HoverTarget {
                    row,
                    anchor: Rect::new(pic.x, y, pic.width, 1),
                })
                .collect();
        }
    }

    fn draw_statusline(model: &Model, frame: &mut Frame, area: Rect) {
        let mut status = vec![Span::from(format!(" {} ", model.status_message()))];
        if model.filter_pending() {
            status.push("filtering ...".dark_gray());
        }
        let instructions = Line::from(vec![
            " Search ".into(),
            "</>".blue().bold(),
            " Reset ".into(),
            "<R>".blue().bold(),
            " Help ".into(),
            "<?>".blue().bold(),
            " Quit ".into(),
            "<Q> ".blue().bold(),
        ]);
        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(instructions.width() as u16),
        ])
        .areas(area);
        frame.render_widget(Paragraph::new(Line::from(status)), left);
        frame.render_widget(Paragraph::new(instructions), right);
    }

    fn draw_popup(text: &str, frame: &mut Frame) {
        let area = frame.area();
        let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0) as u16 + 4;
        let height = text.lines().count() as u16 + 2;
        let [popup] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(area);
        let [popup] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(popup);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(vec![" Close ".into(), "<Esc> ".blue().bold()]).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(text).block(block), popup);
    }
}
