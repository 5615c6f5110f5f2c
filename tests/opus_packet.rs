//! Opus packets written by the coder and read back by the parser.

use opus_ogg::packet::parser;
use opus_ogg::{AudioDataPacket, Channel, Code, Code3Header, Config, Framing, OpusPacket};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn frame(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen()).collect()
}

fn build(config: u8, framing: Framing, frames: Vec<Vec<u8>>) -> OpusPacket {
    let mut packet = OpusPacket::new(Config::of(config).unwrap(), Channel::Stereo, framing).unwrap();
    for f in frames {
        packet.add_frame(f).unwrap();
    }
    packet
}

fn check(packet: &OpusPacket) {
    let standard = packet.dump_standard();
    assert_eq!(&OpusPacket::parse(&standard).unwrap(), packet);

    let delimited = packet.dump_self_delimiting();
    let (parsed, used) = parser::parse_self_delimiting(&delimited).unwrap();
    assert_eq!(&parsed, packet);
    assert_eq!(used, delimited.len());
}

#[test]
fn every_code() {
    let mut rng = StdRng::seed_from_u64(42);

    let code0 = build(31, Framing::Code0, vec![frame(&mut rng, 160)]);
    assert_eq!(code0.code(), Code::Code0);
    check(&code0);

    let len = rng.gen_range(1..400);
    let code1 = build(23, Framing::Code1, vec![frame(&mut rng, len), frame(&mut rng, len)]);
    check(&code1);

    let code2 = build(15, Framing::Code2, vec![frame(&mut rng, 300), frame(&mut rng, 7)]);
    check(&code2);

    let cbr = Code3Header::cbr(3);
    let code3 = build(
        28,
        Framing::Code3(cbr),
        vec![frame(&mut rng, 50), frame(&mut rng, 50), frame(&mut rng, 50)],
    );
    check(&code3);

    let vbr = Code3Header::vbr(4).with_padding(600);
    let frames = (0..4).map(|i| frame(&mut rng, 10 + i * 90)).collect();
    let padded = build(19, Framing::Code3(vbr), frames);
    assert_eq!(padded.pad_data_len(), 598);
    check(&padded);
}

#[test]
fn empty_frames() {
    check(&build(1, Framing::Code2, vec![Vec::new(), Vec::new()]));
    check(&build(9, Framing::Code3(Code3Header::vbr(2)), vec![Vec::new(), vec![1]]));
}

#[test]
fn padding_bytes_are_zero() {
    let header = Code3Header::cbr(1).with_padding(255 + 3);
    let packet = build(0, Framing::Code3(header), vec![vec![0xEE; 4]]);
    let data = packet.dump_standard();

    // TOC, frame count byte, padding chain 255 3, one frame, 257 padding bytes
    assert_eq!(&data[..4], &[packet.toc().to_byte(), 0x41, 255, 3]);
    assert_eq!(data.len(), 4 + 4 + 257);
    assert!(data[8..].iter().all(|&b| b == 0));
}

#[test]
fn audio_packet_of_many_streams() {
    let mut rng = StdRng::seed_from_u64(7);
    let packets: Vec<_> = (0..5)
        .map(|i| {
            let len = rng.gen_range(0..500);
            build(i * 6, Framing::Code2, vec![frame(&mut rng, len), frame(&mut rng, 20)])
        })
        .collect();

    let audio = AudioDataPacket::new(packets.clone());
    let parsed = AudioDataPacket::from(&audio.dump(), packets.len()).unwrap();
    assert_eq!(parsed.into_inner(), packets);
}

#[test]
fn truncated_packets_fail() {
    let mut rng = StdRng::seed_from_u64(3);
    let packet = build(10, Framing::Code3(Code3Header::vbr(3)), (0..3).map(|_| frame(&mut rng, 300)).collect());
    let data = packet.dump_self_delimiting();
    for cut in [0, 1, 2, 3, 100, data.len() - 1] {
        assert!(parser::parse_self_delimiting(&data[..cut]).is_err(), "cut at {}", cut);
    }
}
