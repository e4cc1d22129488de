//! Raw video container
//!
//! A minimal sequential container for uncompressed BGR24 frames, in the
//! spirit of YUV4MPEG2: one ASCII header line
//! `vfraw W<width> H<height> F<fps>`, then for each frame the marker line
//! `FRAME` followed by `width * height * 3` bytes of pixel data.

use crate::error::{Error, Result};
use crate::frame::{VideoFrame, CHANNELS};
use crate::io::{FrameSink, FrameSource};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

const MAGIC: &str = "vfraw";

/// Reader for raw video files
pub struct RawVideoSource {
    reader: Option<BufReader<File>>,
    width: u32,
    height: u32,
    fps: f64,
}

impl RawVideoSource {
    /// Open a raw video file and parse its header
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut header = String::new();
        reader.read_line(&mut header)?;
        let (width, height, fps) = parse_header(header.trim_end())?;

        Ok(RawVideoSource {
            reader: Some(reader),
            width,
            height,
            fps,
        })
    }
}

fn parse_header(line: &str) -> Result<(u32, u32, f64)> {
    let mut parts = line.split_ascii_whitespace();
    if parts.next() != Some(MAGIC) {
        return Err(Error::format("Not a raw video file: bad magic"));
    }

    let mut width = None;
    let mut height = None;
    let mut fps = None;
    for part in parts {
        if let Some(v) = part.strip_prefix('W') {
            width = v.parse::<u32>().ok();
        } else if let Some(v) = part.strip_prefix('H') {
            height = v.parse::<u32>().ok();
        } else if let Some(v) = part.strip_prefix('F') {
            fps = v.parse::<f64>().ok();
        }
        // Unknown header fields are ignored
    }

    match (width, height, fps) {
        (Some(w), Some(h), Some(f)) if w > 0 && h > 0 && f > 0.0 => Ok((w, h, f)),
        _ => Err(Error::format(format!("Malformed raw video header: {}", line))),
    }
}

impl FrameSource for RawVideoSource {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_frame(&mut self) -> Result<VideoFrame> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| Error::invalid_state("Source not open"))?;

        let mut marker = String::new();
        let n = reader.read_line(&mut marker)?;
        if n == 0 {
            return Err(Error::EndOfStream);
        }
        if marker.trim_end() != "FRAME" {
            return Err(Error::format("Missing FRAME marker"));
        }

        let size = self.width as usize * self.height as usize * CHANNELS;
        let mut data = vec![0u8; size];
        reader.read_exact(&mut data).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::format("Truncated frame data")
            } else {
                Error::Io(e)
            }
        })?;

        VideoFrame::from_data(self.width, self.height, data)
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }
}

/// Writer for raw video files
pub struct RawVideoSink {
    writer: Option<BufWriter<File>>,
    width: u32,
    height: u32,
}

impl RawVideoSink {
    /// Create a raw video file and write its header
    pub fn create(path: &Path, fps: f64, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || fps <= 0.0 {
            return Err(Error::invalid_input(format!(
                "Invalid raw video geometry: {}x{} @ {} fps",
                width, height, fps
            )));
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{} W{} H{} F{}", MAGIC, width, height, fps)?;

        Ok(RawVideoSink {
            writer: Some(writer),
            width,
            height,
        })
    }
}

impl FrameSink for RawVideoSink {
    fn write_frame(&mut self, frame: &VideoFrame) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::invalid_state("Sink not open"))?;

        if frame.width != self.width || frame.height != self.height {
            return Err(Error::invalid_input(format!(
                "Frame size {}x{} does not match stream {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }

        writeln!(writer, "FRAME")?;
        writer.write_all(&frame.data)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
