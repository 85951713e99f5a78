use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Debug, Clone, Copy)]
pub struct UiAreas {
    pub size: Rect,
    pub header: Rect,
    pub controls: Rect,
    pub results: Rect,
    pub status_line: Rect,
    pub hint_line: Rect,
}

pub fn areas(size: Rect) -> UiAreas {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(8),
            Constraint::Length(2),
        ])
        .split(size);

    let footer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(vertical[3]);

    UiAreas {
        size,
        header: vertical[0],
        controls: vertical[1],
        results: vertical[2],
        status_line: footer_chunks[0],
        hint_line: footer_chunks[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_areas_stack_vertically() {
        let areas = areas(Rect::new(0, 0, 100, 40));
        assert_eq!(areas.header.height, 3);
        assert_eq!(areas.controls.y, 3);
        assert_eq!(areas.results.y, 8);
        assert_eq!(areas.status_line.y, 38);
        assert_eq!(areas.hint_line.y, 39);
    }
}
