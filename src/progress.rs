//! Text progress bar for the checking phase
//!
//! Rendered on a fixed interval while connections are active:
//! `[=========>          ] 42 % (420 / 1000) missing: 3`

use std::io::Write;

/// Character width of the bar itself
pub const BAR_WIDTH: usize = 50;

/// Render the bar into a string
#[must_use]
pub fn render(checked: u64, total: u64, missing: u64) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        checked as f64 / total as f64
    };
    let pos = (ratio * BAR_WIDTH as f64).floor() as usize;

    let mut bar = String::with_capacity(BAR_WIDTH + 48);
    bar.push('[');
    for i in 0..BAR_WIDTH {
        if i < pos {
            bar.push('=');
        } else if i == pos {
            bar.push('>');
        } else {
            bar.push(' ');
        }
    }
    bar.push_str(&format!(
        "] {} % ({} / {}) missing: {}",
        (ratio * 100.0) as u64,
        checked,
        total,
        missing
    ));
    bar
}

/// Redraw the bar in place on stdout
pub fn draw(checked: u64, total: u64, missing: u64) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "\r{}", render(checked, total, missing));
    let _ = stdout.flush();
}
