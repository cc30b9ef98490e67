use crate::caption::{Caption, StyledFragment};

use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

pub fn serialise<P: AsRef<Path>>(captions: &[Caption], output: P) -> Result<()> {
    let file = std::fs::File::create(output).context("Failed to create file!")?;
    let mut writer = BufWriter::new(file);
    write_captions(&mut writer, captions).context("Failed to write to output file.")?;
    writer.flush().context("Failed to write to output file.")?;
    Ok(())
}

pub fn write_captions<W: Write>(buf: &mut W, captions: &[Caption]) -> Result<()> {
    for (index, caption) in captions.iter().enumerate() {
        write_caption(buf, index + 1, caption)?;
    }
    Ok(())
}

fn write_caption<W: Write>(buf: &mut W, seqnum: usize, caption: &Caption) -> Result<()> {
    writeln!(buf, "{}", seqnum)?;
    write_ts(buf, caption.begin)?;
    write!(buf, " --> ")?;
    write_ts(buf, caption.end)?;
    writeln!(buf)?;
    for fragment in &caption.fragments {
        write_fragment(buf, fragment)?;
    }
    writeln!(buf)?;
    Ok(())
}

fn write_fragment<W: Write>(buf: &mut W, fragment: &StyledFragment) -> Result<()> {
    match fragment.color.as_deref() {
        Some(color) if !color.is_empty() => {
            writeln!(buf, "<font color=\"{}\">{}</font>", color, fragment.text)?
        }
        _ => writeln!(buf, "{}", fragment.text)?,
    }
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> Result<()> {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.as_millis() % 1000;
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}
