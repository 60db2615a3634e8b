use std::{error::Error, time::Duration};

use clap::Subcommand;
use packed_struct::prelude::*;
use tokio::io::AsyncWrite;

use crate::{
    config::RelayConfig,
    drivers::hidg::{
        driver,
        hid_report::{KeyboardReport, MouseReport, KEYBOARD_REPORT_SIZE, MOUSE_REPORT_SIZE},
    },
    input::converter::keycodes::usage_for_char,
};

/// Delay between simulated steps
pub const STEP_DELAY: Duration = Duration::from_millis(300);
/// Text typed when none was given
pub const DEFAULT_TEXT: &str = "this is a test";
/// Left shift modifier bit
const LEFT_SHIFT: u8 = 0x02;

/// Relative moves that trace a square: right, down, left, up
const SQUARE: [(i8, i8); 4] = [(40, 0), (0, 40), (-40, 0), (0, -40)];

#[derive(Subcommand, Debug, Clone)]
pub enum SimulateCommand {
    /// Move the mouse in a square
    Mouse,
    /// Type a message on the keyboard
    Keyboard {
        /// Text to type
        #[arg(long, default_value = DEFAULT_TEXT)]
        text: String,
    },
}

pub async fn handle_simulate(config: &RelayConfig, cmd: SimulateCommand) -> Result<(), Box<dyn Error>> {
    match cmd {
        SimulateCommand::Mouse => {
            let path = &config.mouse.output;
            let mut device = driver::open(path)
                .map_err(|e| format!("Unable to open mouse device {path}: {e}"))?;
            println!("Moving mouse in a square...");
            move_square(&mut device, STEP_DELAY).await?;
            driver::write_release_frames(&mut device, MOUSE_REPORT_SIZE).await?;
        }
        SimulateCommand::Keyboard { text } => {
            let path = &config.keyboard.output;
            let mut device = driver::open(path)
                .map_err(|e| format!("Unable to open keyboard device {path}: {e}"))?;
            println!("Typing: {text}");
            let skipped = type_text(&mut device, &text, STEP_DELAY).await?;
            driver::write_release_frames(&mut device, KEYBOARD_REPORT_SIZE).await?;
            if skipped > 0 {
                println!("Skipped {skipped} character(s) that cannot be typed");
            }
        }
    }

    Ok(())
}

/// Move the mouse in a square, waiting the given delay after each side
pub async fn move_square<W>(sink: &mut W, delay: Duration) -> Result<(), Box<dyn Error>>
where
    W: AsyncWrite + Unpin,
{
    for (x, y) in SQUARE {
        let report = MouseReport {
            x,
            y,
            ..Default::default()
        };
        driver::write_report(sink, &report.pack()?).await?;
        tokio::time::sleep(delay).await;
    }

    Ok(())
}

/// Type the given text by pressing and releasing one key per character.
/// Returns the number of characters that have no key and were skipped.
pub async fn type_text<W>(sink: &mut W, text: &str, delay: Duration) -> Result<usize, Box<dyn Error>>
where
    W: AsyncWrite + Unpin,
{
    let release = KeyboardReport::default().pack()?;
    let mut skipped = 0;
    for c in text.chars() {
        let Some(report) = report_for_char(c) else {
            log::debug!("No key for character {c:?}");
            skipped += 1;
            continue;
        };
        driver::write_report(sink, &report.pack()?).await?;
        driver::write_report(sink, &release).await?;
        tokio::time::sleep(delay).await;
    }

    Ok(skipped)
}

/// Returns the report that types the given character. Upper case letters are
/// typed with shift held.
pub fn report_for_char(c: char) -> Option<KeyboardReport> {
    if c.is_ascii_uppercase() {
        let usage = usage_for_char(c.to_ascii_lowercase())?;
        return Some(KeyboardReport::new(LEFT_SHIFT, usage));
    }
    let usage = usage_for_char(c)?;
    Some(KeyboardReport::new(0, usage))
}
