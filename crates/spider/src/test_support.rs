//! In-memory stand-ins for the network, the clock and the raster.

use std::{io::Cursor, sync::Mutex, time::Duration};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::{
    canvas::TimestampFont,
    error::{Result, SpiderError},
    traits::{Canvas, Fetcher, Sleeper},
    types::PixelPoint,
};

/// Records requested waits instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

/// Answers every request from a routing closure and keeps the request log
pub struct ScriptedFetcher {
    requests: Mutex<Vec<String>>,
    respond: Box<dyn Fn(&str, usize) -> Result<Vec<u8>>>,
}

impl ScriptedFetcher {
    pub fn new(respond: impl Fn(&str, usize) -> Result<Vec<u8>> + 'static) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Always answer with a solid PNG of the given size
    pub fn png(width: u32, height: u32) -> Self {
        let body = solid_png(width, height, Rgba([255, 255, 255, 255]));
        Self::new(move |_, _| Ok(body.clone()))
    }

    /// Always fail like an unreachable host
    pub fn unreachable() -> Self {
        Self::new(|request, _| Err(SpiderError::Fetch(format!("connection refused: {}", request))))
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, request: &str) -> Result<Vec<u8>> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.to_string());
            requests.len() - 1
        };
        (self.respond)(request, call)
    }
}

pub fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, color);
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

pub const TEST_FONT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/DejaVuSansMono.ttf");

pub fn test_font(size: f32) -> TimestampFont {
    TimestampFont::load(TEST_FONT, size).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Outline(Vec<PixelPoint>),
    Stroke(Vec<PixelPoint>, u32),
    Circle(PixelPoint, f64),
    Text(PixelPoint, String),
}

/// Canvas that remembers every primitive instead of drawing it
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn circles(&self) -> Vec<(PixelPoint, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle(center, radius) => Some((*center, *radius)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&DrawOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }
}

impl Canvas for RecordingCanvas {
    fn outline_ring(&mut self, ring: &[PixelPoint], _color: Rgba<u8>) {
        self.ops.push(DrawOp::Outline(ring.to_vec()));
    }

    fn stroke_path(&mut self, path: &[PixelPoint], _color: Rgba<u8>, width: u32) {
        self.ops.push(DrawOp::Stroke(path.to_vec(), width));
    }

    fn fill_circle(&mut self, center: PixelPoint, radius: f64, _color: Rgba<u8>) {
        self.ops.push(DrawOp::Circle(center, radius));
    }

    fn draw_text(&mut self, origin: PixelPoint, text: &str, _color: Rgba<u8>) -> Result<()> {
        self.ops.push(DrawOp::Text(origin, text.to_string()));
        Ok(())
    }
}
