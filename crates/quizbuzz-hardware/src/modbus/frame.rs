//! Modbus RTU framing for the read-discrete-inputs exchange.
//!
//! Only function `0x02` is needed by the buzzer panel. A request is
//!
//! ```text
//! unit | 0x02 | addr hi | addr lo | count hi | count lo | crc lo | crc hi
//! ```
//!
//! and a normal response is
//!
//! ```text
//! unit | 0x02 | byte count | data ... | crc lo | crc hi
//! ```
//!
//! with input `base + i` in bit `i % 8` of data byte `i / 8`. An exception
//! response sets the high bit of the function code and carries a single
//! exception code byte.

use quizbuzz_core::InputBits;

use crate::error::{HardwareError, Result};

/// Function code for "read discrete inputs".
pub const FN_READ_DISCRETE_INPUTS: u8 = 0x02;

/// Bit set in the function code of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Length of an exception response, CRC included.
pub const EXCEPTION_FRAME_LEN: usize = 5;

/// Length of the fixed part preceding the data bytes (unit, function, byte count).
pub const RESPONSE_HEADER_LEN: usize = 3;

/// Largest input count a single request may ask for.
pub const MAX_INPUTS_PER_REQUEST: u16 = 2000;

/// CRC-16/MODBUS (reflected polynomial 0xA001, initial value 0xFFFF).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= u16::from(byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Append the CRC to a frame body, low byte first.
pub fn with_crc(body: &[u8]) -> Vec<u8> {
    let crc = crc16(body);
    let mut frame = Vec::with_capacity(body.len() + 2);
    frame.extend_from_slice(body);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}

/// Number of data bytes needed for `count` inputs.
pub fn data_len(count: u16) -> usize {
    usize::from(count).div_ceil(8)
}

/// Total length of a normal response for `count` inputs.
pub fn response_len(count: u16) -> usize {
    RESPONSE_HEADER_LEN + data_len(count) + 2
}

/// Encode a read-discrete-inputs request.
///
/// # Errors
///
/// Returns `HardwareError::ConfigurationError` if `count` is zero or above
/// [`MAX_INPUTS_PER_REQUEST`].
///
/// # Examples
///
/// ```
/// use quizbuzz_hardware::modbus::frame::encode_read_discrete_inputs;
///
/// let request = encode_read_discrete_inputs(1, 10, 4).unwrap();
/// assert_eq!(&request[..6], &[0x01, 0x02, 0x00, 0x0A, 0x00, 0x04]);
/// ```
pub fn encode_read_discrete_inputs(unit: u8, address: u16, count: u16) -> Result<[u8; 8]> {
    if count == 0 || count > MAX_INPUTS_PER_REQUEST {
        return Err(HardwareError::configuration(format!(
            "input count must be 1-{MAX_INPUTS_PER_REQUEST}, got {count}"
        )));
    }

    let [addr_hi, addr_lo] = address.to_be_bytes();
    let [count_hi, count_lo] = count.to_be_bytes();
    let body = [unit, FN_READ_DISCRETE_INPUTS, addr_hi, addr_lo, count_hi, count_lo];
    let [crc_lo, crc_hi] = crc16(&body).to_le_bytes();

    Ok([
        body[0], body[1], body[2], body[3], body[4], body[5], crc_lo, crc_hi,
    ])
}

/// True if the header bytes announce an exception response.
pub fn is_exception_header(header: &[u8]) -> bool {
    header.len() >= 2 && header[1] & EXCEPTION_FLAG != 0
}

/// Decode a complete response frame into `count` input bits.
///
/// # Errors
///
/// - `InvalidData` for a short frame, CRC mismatch, wrong unit, wrong
///   function, or a byte count that does not match `count`.
/// - `ExceptionResponse` if the device reported a Modbus exception.
pub fn decode_read_discrete_inputs(frame: &[u8], unit: u8, count: u16) -> Result<InputBits> {
    if frame.len() < EXCEPTION_FRAME_LEN {
        return Err(HardwareError::invalid_data(format!(
            "frame too short: {} bytes",
            frame.len()
        )));
    }

    let (body, crc_bytes) = frame.split_at(frame.len() - 2);
    let received = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    let computed = crc16(body);
    if received != computed {
        return Err(HardwareError::invalid_data(format!(
            "CRC mismatch: expected {computed:04X}, got {received:04X}"
        )));
    }

    if body[0] != unit {
        return Err(HardwareError::invalid_data(format!(
            "response from unit {}, expected {unit}",
            body[0]
        )));
    }

    let function = body[1];
    if function == FN_READ_DISCRETE_INPUTS | EXCEPTION_FLAG {
        return Err(HardwareError::exception(function, body[2]));
    }
    if function != FN_READ_DISCRETE_INPUTS {
        return Err(HardwareError::invalid_data(format!(
            "unexpected function code 0x{function:02X}"
        )));
    }

    let expected = data_len(count);
    let byte_count = usize::from(body[2]);
    let data = &body[RESPONSE_HEADER_LEN..];
    if byte_count != expected || data.len() != expected {
        return Err(HardwareError::invalid_data(format!(
            "byte count {byte_count} with {} data bytes, expected {expected}",
            data.len()
        )));
    }

    let width = usize::from(count);
    let mut bits = InputBits::empty(width);
    for i in 0..width {
        if data[i / 8] & (1 << (i % 8)) != 0 {
            bits.set(i);
        }
    }
    Ok(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_crc16_reference_vector() {
        // Read one holding register at 0 from unit 1: "01 03 00 00 00 01 84 0A".
        let body = [0x01, 0x03, 0x00, 0x00, 0x00, 0x01];
        assert_eq!(crc16(&body).to_le_bytes(), [0x84, 0x0A]);
    }

    #[test]
    fn test_encode_request_layout() {
        let request = encode_read_discrete_inputs(1, 10, 4).unwrap();
        assert_eq!(&request[..6], &[0x01, 0x02, 0x00, 0x0A, 0x00, 0x04]);
        assert_eq!(crc16(&request[..6]).to_le_bytes(), [request[6], request[7]]);
    }

    #[rstest]
    #[case(0)]
    #[case(2001)]
    fn test_encode_rejects_count(#[case] count: u16) {
        assert!(encode_read_discrete_inputs(1, 0, count).is_err());
    }

    #[rstest]
    #[case(1, 1)]
    #[case(4, 1)]
    #[case(8, 1)]
    #[case(9, 2)]
    #[case(16, 2)]
    fn test_data_len(#[case] count: u16, #[case] bytes: usize) {
        assert_eq!(data_len(count), bytes);
        assert_eq!(response_len(count), 5 + bytes);
    }

    #[rstest]
    #[case(0b0000_0000, "0000")]
    #[case(0b0000_0001, "1000")]
    #[case(0b0000_0110, "0110")]
    #[case(0b1111_1000, "0000")]
    #[case(0b0000_1111, "1111")]
    fn test_decode_bits_lsb_first(#[case] data: u8, #[case] expected: &str) {
        let frame = with_crc(&[0x01, 0x02, 0x01, data]);
        let bits = decode_read_discrete_inputs(&frame, 1, 4).unwrap();
        assert_eq!(bits.to_string(), expected);
    }

    #[test]
    fn test_decode_multi_byte() {
        let frame = with_crc(&[0x01, 0x02, 0x02, 0x00, 0x01]);
        let bits = decode_read_discrete_inputs(&frame, 1, 9).unwrap();
        assert_eq!(bits.width(), 9);
        assert!(bits.is_set(8));
        assert_eq!(bits.count(), 1);
    }

    #[test]
    fn test_decode_crc_mismatch() {
        let mut frame = with_crc(&[0x01, 0x02, 0x01, 0x01]);
        frame[3] ^= 0xFF;
        let err = decode_read_discrete_inputs(&frame, 1, 4).unwrap_err();
        assert!(matches!(err, HardwareError::InvalidData { .. }));
        assert!(err.is_transient());
    }

    #[test]
    fn test_decode_wrong_unit() {
        let frame = with_crc(&[0x07, 0x02, 0x01, 0x01]);
        assert!(matches!(
            decode_read_discrete_inputs(&frame, 1, 4),
            Err(HardwareError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_decode_exception() {
        let frame = with_crc(&[0x01, 0x82, 0x02]);
        assert!(is_exception_header(&frame[..3]));
        assert!(matches!(
            decode_read_discrete_inputs(&frame, 1, 4),
            Err(HardwareError::ExceptionResponse {
                function: 0x82,
                code: 0x02
            })
        ));
    }

    #[test]
    fn test_decode_short_frame() {
        assert!(matches!(
            decode_read_discrete_inputs(&[0x01, 0x02], 1, 4),
            Err(HardwareError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_decode_byte_count_mismatch() {
        let frame = with_crc(&[0x01, 0x02, 0x02, 0x01, 0x00]);
        assert!(decode_read_discrete_inputs(&frame, 1, 4).is_err());
    }
}
