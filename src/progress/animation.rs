use crate::callback::sidebend::SideBend;
use crate::config::upload::ProgressConfig;
use crate::error::GitInnerError;
use crate::progress::{PayloadProducer, PayloadSource};
use crate::transaction::upload::encode_pack::empty_pack;
use async_trait::async_trait;
use bytes::Bytes;
use colored::*;

const HIDE_CURSOR: &str = "\x1b[?25l";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";
const TITLE_COLOR: (u8, u8, u8) = (0xea, 0xc2, 0x0e);
const GRADIENT_FROM: (u8, u8, u8) = (0x5a, 0x56, 0xe0);
const GRADIENT_TO: (u8, u8, u8) = (0xee, 0x6f, 0xf8);
const EMPTY_COLOR: (u8, u8, u8) = (0x60, 0x60, 0x60);

pub fn ease_out_bounce(x: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;
    let x = x.clamp(0.0, 1.0);
    if x < 1.0 / d1 {
        n1 * x * x
    } else if x < 2.0 / d1 {
        let x = x - 1.5 / d1;
        n1 * x * x + 0.75
    } else if x < 2.5 / d1 {
        let x = x - 2.25 / d1;
        n1 * x * x + 0.9375
    } else {
        let x = x - 2.625 / d1;
        n1 * x * x + 0.984375
    }
}

fn move_cursor(row: u16, col: u16) -> String {
    format!("\x1b[{};{}H", row, col)
}

fn lerp((r1, g1, b1): (u8, u8, u8), (r2, g2, b2): (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (mix(r1, r2), mix(g1, g2), mix(b1, b2))
}

fn title(config: &ProgressConfig) -> ColoredString {
    let (r, g, b) = TITLE_COLOR;
    config.title.as_str().bold().truecolor(r, g, b)
}

fn cell(index: usize, filled: usize, width: usize) -> ColoredString {
    if index >= filled {
        let (r, g, b) = EMPTY_COLOR;
        return "░".truecolor(r, g, b);
    }
    let t = if width > 1 {
        index as f64 / (width - 1) as f64
    } else {
        0.0
    };
    let (r, g, b) = lerp(GRADIENT_FROM, GRADIENT_TO, t);
    "█".truecolor(r, g, b)
}

/// Renders one full-screen frame of the progress bar at `percent` (0..=1).
///
/// Frames are painted on the client's terminal, so colouring never depends
/// on whether the server's own stdout is a tty.
pub fn render_frame(config: &ProgressConfig, percent: f64) -> Bytes {
    colored::control::set_override(true);
    let percent = percent.clamp(0.0, 1.0);
    let width = config.width;
    let filled = ((width as f64) * percent).round() as usize;
    let mut out = String::with_capacity(width * 24 + 64);
    out.push_str(CLEAR_SCREEN);
    out.push_str(&move_cursor(3, 30));
    out.push_str(&title(config).to_string());
    out.push_str(&move_cursor(5, 15));
    for index in 0..width {
        out.push_str(&cell(index, filled, width).to_string());
    }
    out.push_str(&format!(" {:>3}%", (percent * 100.0).round() as u32));
    out.push_str(HIDE_CURSOR);
    out.push('\n');
    Bytes::from(out)
}

/// Animated progress bar on the progress channel, followed by an empty pack
/// on the primary channel.
pub struct ProgressAnimation {
    config: ProgressConfig,
    frame: u32,
    pack_sent: bool,
}

impl ProgressAnimation {
    pub fn new(config: ProgressConfig) -> Self {
        Self {
            config,
            frame: 0,
            pack_sent: false,
        }
    }
}

#[async_trait]
impl PayloadProducer for ProgressAnimation {
    async fn next(&mut self) -> Result<Option<(SideBend, Bytes)>, GitInnerError> {
        if self.frame < self.config.frames {
            if self.frame > 0 && self.config.frame_delay_ms > 0 {
                tokio::time::sleep(self.config.frame_delay()).await;
            }
            let linear = self.frame as f64 / self.config.frames as f64;
            self.frame += 1;
            let frame = render_frame(&self.config, ease_out_bounce(linear));
            return Ok(Some((SideBend::SidebandProgress, frame)));
        }
        if !self.pack_sent {
            self.pack_sent = true;
            return Ok(Some((SideBend::SidebandPrimary, empty_pack())));
        }
        Ok(None)
    }
}

#[derive(Clone, Debug)]
pub struct AnimationSource {
    config: ProgressConfig,
}

impl AnimationSource {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }
}

impl PayloadSource for AnimationSource {
    fn producer(&self) -> Box<dyn PayloadProducer> {
        Box::new(ProgressAnimation::new(self.config.clone()))
    }
}
