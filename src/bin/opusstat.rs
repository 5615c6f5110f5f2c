use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use opus_ogg::{Channel, OggOpusStream, OpusPacket};

/// Print the headers of an Ogg Opus file and the configuration of its packets.
#[derive(Parser, Debug)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Ogg Opus file to inspect.
    input: PathBuf,

    /// Log level, repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What is printed for a packet; consecutive packets with the same line are
/// only counted.
#[derive(Debug, PartialEq)]
struct Summary {
    stream: usize,
    line: String,
}

impl Summary {
    fn of(stream: usize, packet: &OpusPacket) -> Self {
        let config = packet.config();
        let line = format!(
            "mode={:?} bwidth={:?} dur={:?}ms nframes={} code={} vbr?={} stereo?={} pad={}",
            config.mode,
            config.bandwidth,
            config.framesize,
            packet.frames().len(),
            packet.code() as u8,
            packet.is_vbr(),
            packet.channel() == Channel::Stereo,
            packet.pad_data_len(),
        );
        Self { stream, line }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level)?;

    let mut stream = OggOpusStream::open(&args.input)?;
    log::info!("reading logical stream {:#010x}", stream.serial());

    let id = stream.id_header();
    println!(
        "version={}.{} channels={} pre-skip={} rate={}Hz gain={}dB family={} streams={} coupled={}",
        id.major_version,
        id.minor_version,
        id.channel_count,
        id.pre_skip,
        id.input_sample_rate,
        id.output_gain_db(),
        id.channel_mapping_family,
        id.stream_count,
        id.coupled_count,
    );

    let comments = stream.comment_header();
    println!("vendor={}", comments.vendor());
    for (key, value) in comments.tags() {
        println!("  {}={}", key, value);
    }

    let mut last = Vec::<Summary>::new();
    let mut num_same_conf = 0;
    let mut num_packets = 0usize;

    for packet in stream.packets() {
        let packet = packet?;
        num_packets += 1;

        let summary: Vec<_> = packet
            .opus_packets()
            .iter()
            .enumerate()
            .map(|(s, p)| Summary::of(s, p))
            .collect();

        if summary != last {
            if num_same_conf > 0 {
                println!();
            }
            for s in &summary {
                println!("s={} {}", s.stream, s.line);
            }
            num_same_conf = 0;
        } else {
            num_same_conf += 1;
            print!("  \r... {}", num_same_conf);
        }
        last = summary;
    }

    if num_same_conf > 0 {
        println!();
    }
    println!("{} audio data packets", num_packets);
    Ok(())
}
