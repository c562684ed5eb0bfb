use std::io::Write;

use crossterm::{queue, style};

/// Split a menu item into `(bold, text)` runs: text inside `[...]` is bold,
/// everything else is dim.
pub fn menu_segments(item: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut rest = item;
    while !rest.is_empty() {
        let Some(open) = rest.find('[') else {
            segments.push((false, rest));
            break;
        };
        if open > 0 {
            segments.push((false, &rest[..open]));
        }
        rest = &rest[open..];
        match rest.find(']') {
            Some(close) => {
                segments.push((true, &rest[..=close]));
                rest = &rest[close + 1..];
            }
            None => {
                segments.push((false, rest));
                break;
            }
        }
    }
    segments
}

pub fn print_menu_item(out: &mut impl Write, item: &str) -> anyhow::Result<()> {
    for (bold, text) in menu_segments(item) {
        let attr = if bold {
            style::Attribute::Bold
        } else {
            style::Attribute::Dim
        };
        queue!(
            out,
            style::SetAttribute(attr),
            style::Print(text),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}
