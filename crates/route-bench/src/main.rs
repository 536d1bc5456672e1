use std::collections::BTreeMap;
use std::io;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use glam::Vec2;
use viewport_manager::input::{InputDevice, InputEvent, InputKey, KeyAction, RouteOutcome};
use viewport_manager::layout::{LayoutPreset, PlayerSlot};
use viewport_manager::{HeadlessHost, ViewportCompositor};

/// Received-event history is dropped this often so memory stays flat.
const CLEAR_EVERY: u64 = 4096;

#[derive(Parser, Debug)]
#[command(
    name = "route-bench",
    version = env!("CARGO_PKG_VERSION"),
    about = "Routes a synthetic pointer stream through a layout and reports throughput"
)]
struct BenchCli {
    /// Events to route after warmup.
    #[arg(short = 'n', long = "events", default_value_t = 1_000_000)]
    events: u64,

    /// Layout to route against.
    #[arg(short, long, value_name = "NAME", default_value = "four-player-grid")]
    preset: LayoutPreset,

    /// Fixed seed for a repeatable stream. Defaults to the clock.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Events routed before timing starts.
    #[arg(short, long, default_value_t = 10_000)]
    warmup: u64,

    /// Viewport size in pixels, as WIDTHxHEIGHT.
    #[arg(long, value_name = "WxH", default_value = "1920x1080")]
    viewport: String,
}

struct BenchConfig {
    events: u64,
    warmup: u64,
    preset: LayoutPreset,
    seed: u64,
    width: u32,
    height: u32,
}

impl TryFrom<&BenchCli> for BenchConfig {
    type Error = String;

    fn try_from(cli: &BenchCli) -> Result<Self, Self::Error> {
        if !(1..=100_000_000).contains(&cli.events) {
            return Err("events must be between 1 and 100000000".to_string());
        }
        let (width, height) = cli
            .viewport
            .split_once('x')
            .and_then(|(w, h)| Some((w.trim().parse().ok()?, h.trim().parse().ok()?)))
            .ok_or_else(|| format!("viewport must look like 1920x1080, got {}", cli.viewport))?;
        if width == 0 || height == 0 {
            return Err("viewport must have a non-zero size".to_string());
        }
        Ok(Self {
            events: cli.events,
            warmup: cli.warmup,
            preset: cli.preset,
            seed: cli.seed.unwrap_or_else(clock_seed),
            width,
            height,
        })
    }
}

fn main() -> io::Result<()> {
    let args = BenchCli::parse();
    let config = BenchConfig::try_from(&args)
        .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

    let mut compositor = ViewportCompositor::new(HeadlessHost::new(config.width, config.height));
    let report = compositor.apply_layout(Some(config.preset.build()));
    if !report.is_clean() {
        return Err(io::Error::other(format!(
            "layout {} applied with {} warning(s)",
            config.preset,
            report.warnings.len()
        )));
    }

    let mut stream = PointerStream::new(config.seed, config.width, config.height);
    let mut warmup_stats = BenchStats::default();
    route_batch(&mut compositor, &mut stream, config.warmup, &mut warmup_stats);

    let mut stats = BenchStats::default();
    let start = Instant::now();
    route_batch(&mut compositor, &mut stream, config.events, &mut stats);
    stats.elapsed = start.elapsed();

    println!("{}", stats.final_report(&config));
    Ok(())
}

fn route_batch(
    compositor: &mut ViewportCompositor<HeadlessHost>,
    stream: &mut PointerStream,
    count: u64,
    stats: &mut BenchStats,
) {
    for index in 0..count {
        let (pointer, event) = stream.next_event();
        compositor.host_mut().set_pointer(Some(pointer));
        let outcome = compositor.input_router().route(&event);
        stats.record(outcome);
        if index % CLEAR_EVERY == 0 {
            compositor.host_mut().clear_received();
        }
    }
}

#[derive(Default)]
struct BenchStats {
    routed: u64,
    per_slot: BTreeMap<PlayerSlot, u64>,
    bypassed: u64,
    swallowed: u64,
    elapsed: Duration,
}

impl BenchStats {
    fn record(&mut self, outcome: RouteOutcome) {
        self.routed += 1;
        match outcome {
            RouteOutcome::Forwarded { slot, .. } => *self.per_slot.entry(slot).or_default() += 1,
            RouteOutcome::Bypassed { .. } => self.bypassed += 1,
            RouteOutcome::Swallowed(_) => self.swallowed += 1,
        }
    }

    fn events_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.routed as f64 / secs
        } else {
            0.0
        }
    }

    fn final_report(&self, config: &BenchConfig) -> String {
        let per_slot = self
            .per_slot
            .iter()
            .map(|(slot, count)| format!("P{slot}={count}"))
            .collect::<Vec<_>>()
            .join(" ");
        indoc::formatdoc!(
            r#"
            Route bench on {preset} ({width}x{height}, seed {seed}).
            Events: {routed} in {elapsed:.3}s (~{eps:.0}/s, {ns:.1} ns/event)
            Forwarded: {per_slot}
            Bypassed: {bypassed} | Swallowed: {swallowed}
            "#,
            preset = config.preset,
            width = config.width,
            height = config.height,
            seed = config.seed,
            routed = self.routed,
            elapsed = self.elapsed.as_secs_f64(),
            eps = self.events_per_second(),
            ns = if self.routed > 0 {
                self.elapsed.as_nanos() as f64 / self.routed as f64
            } else {
                0.0
            },
            per_slot = if per_slot.is_empty() { "none".to_string() } else { per_slot },
            bypassed = self.bypassed,
            swallowed = self.swallowed,
        )
    }
}

/// Deterministic mix of pointer motion, clicks, key presses and the
/// occasional gamepad event.
struct PointerStream {
    state: u64,
    width: f32,
    height: f32,
}

impl PointerStream {
    fn new(seed: u64, width: u32, height: u32) -> Self {
        Self {
            state: seed,
            width: width as f32,
            height: height as f32,
        }
    }

    fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn unit(&mut self) -> f32 {
        self.next() as f32 / u32::MAX as f32
    }

    fn next_event(&mut self) -> (Vec2, InputEvent) {
        let pointer = Vec2::new(self.unit() * self.width, self.unit() * self.height);
        let event = match self.next() % 100 {
            0..=59 => InputEvent::axis(InputKey::MouseX, self.unit() * 8.0 - 4.0),
            60..=79 => InputEvent::key(InputKey::Char('w'), KeyAction::Pressed),
            80..=94 => InputEvent::key(InputKey::MouseLeft, KeyAction::Pressed),
            _ => InputEvent::key(
                InputKey::Named("Gamepad_FaceButton_Bottom".to_string()),
                KeyAction::Pressed,
            )
            .with_device(InputDevice::Gamepad { controller_id: 1 }),
        };
        (pointer, event)
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ 0xA5A5_A5A5_1234_5678
}
