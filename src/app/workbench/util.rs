use ratatui::layout::Rect;

pub(super) fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let width = area.width.saturating_mul(width_percent).saturating_div(100);
    let min_width = 30.min(area.width);
    let width = width.max(min_width).min(area.width);

    let min_height = 3.min(area.height);
    let height = height.max(min_height).min(area.height);

    let x = area.x + (area.width.saturating_sub(width) / 2);
    let y = area.y + (area.height.saturating_sub(height) / 2);

    Rect::new(x, y, width, height)
}

pub(super) fn rect_contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

pub(super) fn output_panel_height(body_height: u16) -> u16 {
    let max_height = body_height.saturating_sub(3);
    if max_height == 0 {
        return 0;
    }

    let desired = body_height.saturating_div(3);
    desired.max(6).min(max_height)
}

pub(super) fn file_list_width(available: u16) -> u16 {
    if available == 0 {
        return 0;
    }

    let desired = available
        .saturating_mul(super::FILE_LIST_WIDTH_PERCENT)
        .saturating_div(100);
    let min_width = super::FILE_LIST_MIN_WIDTH.min(available);
    let max_width = available.saturating_sub(20).max(min_width);

    desired.max(min_width).min(max_width)
}

/// 十进制位数，行号栏宽度用
pub(super) fn digits(mut n: usize) -> u16 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}
