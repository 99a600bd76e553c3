//! fxchain - play a test tone through an effect chain
//!
//! Run with: cargo run --bin fxchain -- --effect tremolo:rate_hz=5,depth=0.5 --effect reverb

use std::{
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vocal_fx::{
    dsp::oscillator::{OscillatorWaveform, ToneOscillator},
    processor::EffectsRenderer,
    AudioBlock, AudioEffectsProcessor, EffectKind, EngineConfig, ParamValue, ParameterSet,
    ValidationMode, MAX_CHANNELS,
};

#[derive(Debug, Parser)]
#[command(name = "fxchain", about = "Play a test tone through a chain of vocal effects")]
struct Args {
    /// Effect to append, as `kind` or `kind:name=value,name=value`. Repeatable, applied in order.
    #[arg(short, long = "effect", value_name = "SPEC")]
    effects: Vec<String>,

    /// Test tone frequency in Hz.
    #[arg(short, long, default_value_t = 220.0)]
    frequency: f32,

    /// Test tone waveform: sine, saw or square.
    #[arg(short, long, default_value = "saw")]
    waveform: String,

    /// Test tone level, 0..1.
    #[arg(short, long, default_value_t = 0.3)]
    amplitude: f32,

    /// Gate the tone on and off every this many milliseconds, so tails are audible.
    #[arg(short, long, value_name = "MS")]
    gate_ms: Option<f32>,

    /// Stop after this many seconds.
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f32,

    /// Frames per processing block.
    #[arg(short, long, default_value_t = 512)]
    block_size: usize,

    /// Reject out-of-range parameters instead of clamping them.
    #[arg(long)]
    strict: bool,

    /// Print every effect type with its parameters and exit.
    #[arg(short, long)]
    list: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.list {
        print_effects();
        return Ok(());
    }

    let waveform = OscillatorWaveform::from_name(&args.waveform)
        .ok_or_else(|| eyre!("unknown waveform `{}`, expected one of {:?}", args.waveform, OscillatorWaveform::NAMES))?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let device_channels = stream_config.channels() as usize;
    let validation = if args.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Clamp
    };
    let config = EngineConfig::new(sample_rate, device_channels.min(MAX_CHANNELS), args.block_size)
        .with_validation(validation);

    let mut processor = AudioEffectsProcessor::new(config.clone()).wrap_err("invalid engine settings")?;
    for spec in &args.effects {
        let (kind, params) = parse_effect(spec)?;
        let handle = processor
            .add_effect(kind, &params)
            .wrap_err_with(|| format!("failed to add `{spec}`"))?;
        info!(effect = %kind, %handle, "chain");
    }
    info!(
        sample_rate,
        channels = config.channels,
        block_size = config.block_size,
        latency_frames = processor.latency_frames(),
        "starting playback"
    );

    let (mut controller, renderer) = processor.split();
    let gate_frames = args
        .gate_ms
        .map(|ms| (config.ms_to_samples(ms) as usize).max(1));
    let mut player = Player::new(
        renderer,
        ToneOscillator::new(args.frequency, args.amplitude.clamp(0.0, 1.0), sample_rate, waveform),
        gate_frames,
    );

    let stream = device.build_output_stream(
        &stream_config.into(),
        move |data: &mut [f32], _| player.fill(data, device_channels),
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;
    stream.play()?;

    let started = Instant::now();
    while started.elapsed() < Duration::from_secs_f32(args.seconds.max(0.0)) {
        thread::sleep(Duration::from_millis(100));
        // logs what the audio thread reported and frees retired nodes
        controller.drain_events();
    }

    Ok(())
}

/// Audio-thread state: renders fixed-size blocks and hands them out in
/// whatever sizes the device asks for.
struct Player {
    renderer: EffectsRenderer,
    tone: ToneOscillator,
    gate_frames: Option<usize>,
    elapsed: usize,
    input: AudioBlock,
    output: AudioBlock,
    cursor: usize,
}

impl Player {
    fn new(renderer: EffectsRenderer, tone: ToneOscillator, gate_frames: Option<usize>) -> Self {
        let channels = renderer.config().channels;
        let block_size = renderer.config().block_size;
        Self {
            renderer,
            tone,
            gate_frames,
            elapsed: 0,
            input: AudioBlock::new(channels, block_size),
            output: AudioBlock::new(channels, block_size),
            // forces a render on the first callback
            cursor: block_size,
        }
    }

    fn fill(&mut self, data: &mut [f32], device_channels: usize) {
        let channels = self.output.channels();

        for frame in data.chunks_mut(device_channels) {
            if self.cursor == self.output.frames() {
                self.render_block();
                self.cursor = 0;
            }
            for (ch, sample) in frame.iter_mut().enumerate() {
                *sample = self.output.channel(ch % channels)[self.cursor];
            }
            self.cursor += 1;
        }
    }

    fn render_block(&mut self) {
        let frames = self.input.frames();
        for i in 0..frames {
            let gate_open = match self.gate_frames {
                Some(gate) => (self.elapsed + i) / gate % 2 == 0,
                None => true,
            };
            let sample = self.tone.next_sample() * if gate_open { 1.0 } else { 0.0 };
            for ch in 0..self.input.channels() {
                self.input.channel_mut(ch)[i] = sample;
            }
        }
        self.elapsed += frames;

        // a mismatch leaves silence in `output` and is reported through the event queue
        let _ = self.renderer.process(&self.input, &mut self.output);
    }
}

/// `kind` or `kind:name=value,name=value`.
fn parse_effect(spec: &str) -> EyreResult<(EffectKind, ParameterSet)> {
    let (name, rest) = spec.split_once(':').unwrap_or((spec, ""));
    let kind = EffectKind::from_id(name)?;

    let mut params = ParameterSet::new();
    for pair in rest.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| eyre!("expected `name=value` in `{spec}`, got `{pair}`"))?;
        let value = value.parse::<ParamValue>().unwrap_or_else(|never| match never {});
        params.set(key.trim(), value);
    }

    Ok((kind, params))
}

fn print_effects() {
    for kind in EffectKind::ALL {
        println!("{kind}");
        for spec in kind.schema() {
            println!("    {spec}");
        }
    }
}
