//! Terminal display of the countdown

use std::io::{self, Write};
use tokio::sync::watch;
use tracing::debug;

use crate::state::TimerSnapshot;

/// Render one snapshot as a single display line
pub fn render_line(snapshot: &TimerSnapshot) -> String {
    let status = snapshot.run_state.as_str();
    let sound = if snapshot.sound_enabled { "sound on" } else { "sound off" };

    if snapshot.alert {
        format!("{} [{}, {}]  *** Time's up! ***", snapshot.display, status, sound)
    } else {
        format!("{} [{}, {}]", snapshot.display, status, sound)
    }
}

/// Overwrite the current terminal line, padded to `width`
fn redraw<W: Write>(out: &mut W, line: &str, width: usize) -> io::Result<()> {
    write!(out, "\r{:<width$}", line, width = width)?;
    out.flush()
}

/// Background task that redraws the countdown whenever the state changes
pub async fn display_task(mut updates: watch::Receiver<TimerSnapshot>) {
    debug!("Starting terminal display task");

    let mut last_line = String::new();
    let mut write_failed = false;
    loop {
        let line = render_line(&updates.borrow_and_update());
        if line != last_line {
            let mut stdout = std::io::stdout().lock();
            // Pad so a shorter line fully overwrites the previous one
            let width = last_line.len().max(line.len());
            if let Err(e) = redraw(&mut stdout, &line, width) {
                if !write_failed {
                    debug!("Terminal write failed: {}", e);
                    write_failed = true;
                }
            }
            last_line = line;
        }

        if updates.changed().await.is_err() {
            debug!("Timer state gone, display task exiting");
            if let Err(e) = writeln!(io::stdout()) {
                if !write_failed {
                    debug!("Terminal write failed: {}", e);
                }
            }
            break;
        }
    }
}
