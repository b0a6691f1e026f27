//! Presentation of decoded frames
//!
//! Text lines are `[timestamp] LEVEL location message` with the location column
//! padded to the widest `file:line` in the dictionary. JSON output is one object
//! per line.

use crate::config::OutputFormat;
use anyhow::Result;
use dlog_decoder::DecodedFrame;
use std::io::Write;

/// Writes decoded frames in the configured format
pub struct FrameWriter<W: Write> {
    out: W,
    format: OutputFormat,
    /// Location column width; None hides the column
    location_width: Option<usize>,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(out: W, format: OutputFormat, location_width: Option<usize>) -> Self {
        Self {
            out,
            format,
            location_width,
        }
    }

    pub fn write(&mut self, frame: &DecodedFrame<'_>) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                let line = render_text(frame, self.location_width);
                writeln!(self.out, "{}", line)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, frame)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Render one frame as a text line
pub fn render_text(frame: &DecodedFrame<'_>, location_width: Option<usize>) -> String {
    let level = frame.level.as_str().to_uppercase();
    let mut line = format!("[{:>10}] {:<7}", frame.timestamp, level);

    if let Some(width) = location_width {
        let location = frame.location().unwrap_or_default();
        line.push(' ');
        line.push_str(&format!("{:<width$}", location, width = width));
    }

    line.push(' ');
    if frame.is_unknown() {
        line.push_str(&format!("unknown message id 0x{:06X} ({})", frame.raw_id, frame.raw_id));
    } else {
        line.push_str(&frame.message);
    }
    line
}
