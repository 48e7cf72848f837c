use crate::shared::{DisplayState, EntryKind};
use ratatui::layout::{Layout, Direction, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
   let sections = Layout::default()
       .direction(Direction::Vertical)
       .constraints([
           Constraint::Length(3), // mode + root + channel activity
           Constraint::Min(5), // song/sequence list
           Constraint::Length(3), // status + key help
       ])
       .split(area);

   draw_header(frame, sections[0], state);
   draw_entries(frame, sections[1], state);
   draw_footer(frame, sections[2], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &DisplayState) {
   let device = if state.device_ready {
       Span::styled(format!("audio {:.1}s", state.clock), Style::default().fg(Color::Green))
   } else {
       Span::styled("audio idle (press any key)", Style::default().fg(Color::DarkGray))
   };
   let line = Line::from(vec![
       Span::styled(format!("mode {}  ", state.mode), Style::default().fg(Color::Yellow)),
       Span::raw(format!("root {}  ", state.root_name)),
       Span::styled(format!("music {}  ", state.music_active), activity_style(state.music_active)),
       Span::styled(format!("sfx {}  ", state.sfx_active), activity_style(state.sfx_active)),
       device,
   ]);
   let header = Paragraph::new(line)
       .block(Block::default().borders(Borders::ALL).title(" seqtone "));
   frame.render_widget(header, area);
}

fn activity_style(active: usize) -> Style {
   if active > 0 {
       Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
   } else {
       Style::default().fg(Color::DarkGray)
   }
}

fn draw_entries(frame: &mut Frame, area: Rect, state: &DisplayState) {
   let block = Block::default().borders(Borders::ALL).title(" library ");
   if state.entries.is_empty() {
       let msg = Paragraph::new("No sequences or songs found")
           .style(Style::default().fg(Color::DarkGray))
           .block(block);
       frame.render_widget(msg, area);
       return;
   }

   let items: Vec<ListItem> = state
       .entries
       .iter()
       .map(|entry| {
           let color = match entry.kind {
               EntryKind::Song => Color::Magenta,
               EntryKind::SfxSong => Color::Cyan,
               EntryKind::Sequence => Color::Blue,
           };
           ListItem::new(Line::from(vec![
               Span::styled(format!("{:<5}", entry.kind.label()), Style::default().fg(color)),
               Span::raw(entry.name.clone()),
           ]))
       })
       .collect();

   let list = List::new(items)
       .block(block)
       .highlight_style(Style::default().bg(Color::DarkGray))
       .highlight_symbol("> ");
   let mut list_state = ListState::default();
   list_state.select(Some(state.selected));
   frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &DisplayState) {
   let lines = vec![
       Line::from(Span::raw(state.status.clone())),
       Line::from(Span::styled(
           "[enter] music  [s] sfx  [-/=] root  [m] mode  [x] stop  [esc] quit",
           Style::default().fg(Color::DarkGray),
       )),
   ];
   let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
   frame.render_widget(footer, area);
}
