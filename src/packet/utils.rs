// https://datatracker.ietf.org/doc/html/rfc6716#section-3.2.1

/// Largest length that fits the one byte form.
pub const MAX_SHORT_FRAME_LEN: usize = 251;

/// Largest length of an Opus frame, `255 * 4 + 255`.
pub const MAX_FRAME_LEN: usize = 1275;

/// Decode a frame length field, returning the length and the number of bytes
/// the field occupied.
pub fn parse_frame_length(bytes: &[u8]) -> Option<(usize, usize)> {
    let first = *bytes.first()? as usize;

    if first > MAX_SHORT_FRAME_LEN {
        let second = *bytes.get(1)? as usize;
        Some((second * 4 + first, 2))
    } else {
        Some((first, 1))
    }
}

/// Encode a frame length, one byte up to 251 and two bytes above. `n` must
/// not exceed [`MAX_FRAME_LEN`].
pub fn frame_length_to_bytes(n: usize) -> Vec<u8> {
    if n <= MAX_SHORT_FRAME_LEN {
        return vec![n as u8];
    }
    let x = 252 + n % 4;
    let y = (n - x) / 4;
    vec![x as u8, y as u8]
}

/// Number of padding bytes signalled by a code 3 padding length chain whose
/// bytes add up to `pad_len_bytes_sum`. Every 255 in the chain stands for 254
/// bytes of padding.
pub fn pad_data_len(pad_len_bytes_sum: usize) -> usize {
    (pad_len_bytes_sum / 255) * 254 + pad_len_bytes_sum % 255
}

/// Split a chain sum back into the chain bytes written after the frame count byte.
pub fn pad_len_bytes(pad_len_bytes_sum: usize) -> Vec<u8> {
    let mut chain = vec![255u8; pad_len_bytes_sum / 255];
    chain.push((pad_len_bytes_sum % 255) as u8);
    chain
}
