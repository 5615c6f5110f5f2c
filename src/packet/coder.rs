//! Serialization of Opus packets.
//!
//! A packet is expected to hold all of its frames when dumped, see
//! [`OpusPacket::is_complete`]. Missing frames are written with a length of
//! zero, and such output does not parse back to the same packet.

use super::utils::{frame_length_to_bytes, pad_len_bytes};
use super::{Framing, OpusPacket};

fn frame_len(packet: &OpusPacket, i: usize) -> usize {
    packet.frames().get(i).map_or(0, Vec::len)
}

fn write_lengths(out: &mut Vec<u8>, packet: &OpusPacket, count: usize) {
    for i in 0..count {
        out.extend(frame_length_to_bytes(frame_len(packet, i)));
    }
}

fn write_header(out: &mut Vec<u8>, packet: &OpusPacket) {
    out.push(packet.toc().to_byte());
    if let Framing::Code3(header) = packet.framing() {
        out.push(header.to_byte());
        if let Some(sum) = header.padding {
            out.extend(pad_len_bytes(sum));
        }
    }
}

fn write_body(out: &mut Vec<u8>, packet: &OpusPacket) {
    for frame in packet.frames() {
        out.extend_from_slice(frame);
    }
    out.resize(out.len() + packet.pad_data_len(), 0);
}

/// Standard format: every VBR frame length but the last, and no length at all
/// for CBR packets.
pub fn dump_standard(packet: &OpusPacket) -> Vec<u8> {
    let mut out = Vec::new();
    write_header(&mut out, packet);
    if packet.is_vbr() {
        write_lengths(&mut out, packet, packet.frame_count() - 1);
    }
    write_body(&mut out, packet);
    out
}

/// Self-delimiting format: every VBR frame length, or the one shared CBR length.
pub fn dump_self_delimiting(packet: &OpusPacket) -> Vec<u8> {
    let mut out = Vec::new();
    write_header(&mut out, packet);
    if packet.is_vbr() {
        write_lengths(&mut out, packet, packet.frame_count());
    } else {
        write_lengths(&mut out, packet, 1);
    }
    write_body(&mut out, packet);
    out
}
