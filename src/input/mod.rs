use crate::app::controller::TOGGLE_CLASS;
use crate::app::events::{Event, InputEvent, SystemEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Reads command lines from stdin. EOF or a read error quits the app, since
/// other tasks keep their own senders open.
pub fn spawn_input_task(tx: mpsc::Sender<Event>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(ev) = parse_line(&line) else {
                        continue;
                    };
                    if tx.send(ev).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    let _ = tx.send(Event::Input(InputEvent::Quit)).await;
                    break;
                }
                Err(e) => {
                    tracing::warn!("read stdin: {e}");
                    let _ = tx.send(Event::Input(InputEvent::Quit)).await;
                    break;
                }
            }
        }
    });
}

/// Maps one input line to an event.
///
/// ```text
/// click [class]    click the first element with `class` (default: the toggle)
/// toggle           same as `click theme-toggle`
/// os dark|light    the OS color scheme changed
/// status           print the current state
/// quit
/// ```
pub fn parse_line(line: &str) -> Option<Event> {
    let mut words = line.split_whitespace();
    let cmd = words.next()?;
    let arg = words.next();

    let ev = match (cmd, arg) {
        ("click", class) => Event::Input(InputEvent::Click {
            class: class.unwrap_or(TOGGLE_CLASS).to_string(),
        }),
        ("toggle", None) => Event::Input(InputEvent::Click {
            class: TOGGLE_CLASS.to_string(),
        }),
        ("os", Some("dark")) => Event::System(SystemEvent::ColorSchemeChanged { dark: true }),
        ("os", Some("light")) => Event::System(SystemEvent::ColorSchemeChanged { dark: false }),
        ("status", None) => Event::Input(InputEvent::Status),
        ("quit" | "exit", None) => Event::Input(InputEvent::Quit),
        _ => {
            tracing::warn!(line, "unrecognized input");
            return None;
        }
    };
    Some(ev)
}
