use binwise_core::{BinColor, CollectionEvent, EnvironmentalImpact};
use chrono::NaiveDate;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, Screen};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let header = Paragraph::new("binwise – which bin does it go in?")
        .block(Block::default().borders(Borders::ALL).title("binwise"));
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::ScenarioSelect => draw_scenario_select(frame, app, *content_area),
        Screen::LocationInput => draw_location_input(frame, app, *content_area),
        Screen::ResultView => draw_result_view(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::ScenarioSelect => "↑/↓ move · Enter/Space select scenario · q/Ctrl-C quit",
        Screen::LocationInput => "Type a postcode · Enter classify · Left/Esc back · Ctrl-C quit",
        Screen::ResultView => "↑/↓ item details · r re-roll · Esc/←/b back · q/Ctrl-C quit",
    };

    let status_text = match &app.error_message {
        Some(msg) => format!("{msg} · {nav_hint}"),
        None => nav_hint.to_owned(),
    };

    let status_style = if app.error_message.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_scenario_select(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = app
        .scenarios
        .iter()
        .enumerate()
        .map(|(idx, scenario)| {
            let prefix = if idx == app.scenario_index { "> " } else { "  " };
            ListItem::new(format!(
                "{prefix}{:<28} {:<7} {}",
                scenario.name, scenario.complexity, scenario.description
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select scenario (↑/↓, Enter)"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.scenarios.is_empty() {
        state.select(Some(app.scenario_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_location_input(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // councils
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, councils_area] = chunks else {
        return;
    };

    let scenario_name = app
        .current_scenario()
        .map_or("<no scenario>", |scenario| scenario.name);

    let input = Paragraph::new(app.location_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Postcode for {scenario_name} (Enter)")),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let councils = app.classifier.councils();
    let default_name = &councils.default_council().name;
    let items = councils
        .iter()
        .map(|council| {
            let marker = if &council.name == default_name {
                " (default)"
            } else {
                ""
            };
            ListItem::new(format!(
                "{}{marker}: {}",
                council.display_name,
                council.postcode_prefixes.join(", ")
            ))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Known councils and their postcode areas"),
    );
    frame.render_widget(list, *councils_area);
}

fn draw_result_view(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(result) = &app.result else {
        let paragraph = Paragraph::new("Nothing classified yet.")
            .block(Block::default().borders(Borders::ALL).title("Result"));
        frame.render_widget(paragraph, area);
        return;
    };

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // detections
            Constraint::Length(4), // selected instruction
            Constraint::Length(7), // impact + collections
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [table_area, detail_area, summary_area] = chunks else {
        return;
    };

    let rows = result.detections.iter().enumerate().map(|(idx, detection)| {
        let mut flags = Vec::new();
        if detection.requires_user_input {
            flags.push("check");
        }
        if detection.packaging_warning {
            flags.push("packaging");
        }
        if !detection.catalogued {
            flags.push("unknown");
        }

        let mut style = Style::default().fg(bin_color(detection.bin_color));
        if idx == app.detail_index {
            style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
        }

        Row::new(vec![
            Cell::from(detection.item.to_string()),
            Cell::from(format!("{:.1}%", detection.confidence)),
            Cell::from(detection.bin_color.to_string()),
            Cell::from(detection.category.clone()),
            Cell::from(flags.join(", ")),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(20),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Min(10),
    ];

    let title = format!(
        "{} items for {} → {} (seed {})",
        result.total_items, result.location, result.council, app.seed
    );
    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Item", "Conf", "Bin", "Category", "Flags"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(1);
    frame.render_widget(table, *table_area);

    let detail = result
        .detections
        .get(app.detail_index)
        .map_or_else(String::new, |detection| detection.display_note().to_owned());
    let detail = Paragraph::new(detail)
        .block(Block::default().borders(Borders::ALL).title("Instruction"))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, *detail_area);

    let summary_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*summary_area);
    let [impact_area, collections_area] = summary_chunks.as_ref() else {
        return;
    };

    let impact = Paragraph::new(impact_lines(&result.environmental_impact))
        .block(Block::default().borders(Borders::ALL).title("Environmental impact"));
    frame.render_widget(impact, *impact_area);

    let collections = Paragraph::new(collection_lines(&app.collections, App::today()))
        .block(Block::default().borders(Borders::ALL).title("Next collections"));
    frame.render_widget(collections, *collections_area);
}

fn impact_lines(impact: &EnvironmentalImpact) -> Vec<Line<'static>> {
    [
        ("Compostable", impact.compostable, BinColor::Brown),
        ("Recyclable", impact.recyclable, BinColor::Blue),
        ("General waste", impact.general_waste, BinColor::Black),
        ("Special disposal", impact.special_disposal, BinColor::Orange),
        ("Other", impact.other, BinColor::Green),
    ]
    .into_iter()
    .filter(|(_, count, _)| *count > 0)
    .map(|(label, count, color)| {
        Line::styled(format!("{label}: {count}"), Style::default().fg(bin_color(color)))
    })
    .collect()
}

fn collection_lines(events: &[CollectionEvent], today: NaiveDate) -> Vec<Line<'static>> {
    if events.is_empty() {
        return vec![Line::raw("No kerbside collections configured.")];
    }

    events
        .iter()
        .map(|event| {
            Line::styled(
                format!(
                    "{:<10} {} {} ({})",
                    event.stream,
                    event.weekday,
                    event.date.format("%d.%m."),
                    relative_day_label(event.date, today)
                ),
                Style::default().fg(bin_color(event.stream.bin_color())),
            )
        })
        .collect()
}

fn bin_color(color: BinColor) -> Color {
    match color {
        BinColor::Brown => Color::Rgb(165, 105, 50),
        BinColor::Blue => Color::Blue,
        BinColor::Black => Color::Gray,
        BinColor::Green => Color::Green,
        BinColor::Orange => Color::LightRed,
    }
}

fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "today".to_owned(),
        1 => "tomorrow".to_owned(),
        days => format!("in {days} days"),
    }
}
