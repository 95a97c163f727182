//! Message types for the host serial protocol
//!
//! Messages are identified by payload length alone:
//! - 1 byte `0xAA`: query the current configuration
//! - 9 bytes: configuration (host → device to apply, device → host to report)
//!
//! Every other payload is ignored.

/// Payload byte requesting the current configuration
pub const QUERY_CONFIG: u8 = 0xAA;

/// Length of a configuration payload
pub const CONFIG_PAYLOAD_LEN: usize = 9;

/// Offset added to the signed bias value on the wire
pub const BIAS_WIRE_OFFSET: i32 = 5000;

/// Errors that can occur when parsing a message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Payload length does not match the message layout
    InvalidLength,
}

/// Configuration carried in a 9-byte payload
///
/// Wire layout:
/// ```text
/// [freq0, freq1, freq2, freq3, short, high_v, bias_lo, bias_hi, running]
/// ```
/// - frequency: little-endian u32, raw fixed-point setting value
/// - flags: `0x00` means true, anything else means false
/// - bias: little-endian u16 holding `bias_raw + 5000`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigPayload {
    /// Raw frequency setting value
    pub frequency_raw: u32,
    /// Short (fixed 2µs) pulses instead of standard pulses
    pub short_pulse: bool,
    /// 5.0V output range instead of 0.45V
    pub high_voltage: bool,
    /// Raw signed bias setting value (centivolts)
    pub bias_raw: i32,
    /// Outputs enabled
    pub running: bool,
}

/// Flags are sent inverted: 0x00 is true
fn flag_to_wire(value: bool) -> u8 {
    if value {
        0x00
    } else {
        0x01
    }
}

fn flag_from_wire(byte: u8) -> bool {
    byte == 0x00
}

impl ConfigPayload {
    /// Parse a configuration payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MessageError> {
        let bytes: &[u8; CONFIG_PAYLOAD_LEN] =
            bytes.try_into().map_err(|_| MessageError::InvalidLength)?;

        let frequency_raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let bias_wire = u16::from_le_bytes([bytes[6], bytes[7]]);

        Ok(Self {
            frequency_raw,
            short_pulse: flag_from_wire(bytes[4]),
            high_voltage: flag_from_wire(bytes[5]),
            bias_raw: bias_wire as i32 - BIAS_WIRE_OFFSET,
            running: flag_from_wire(bytes[8]),
        })
    }

    /// Serialize to the 9-byte wire layout
    pub fn to_bytes(&self) -> [u8; CONFIG_PAYLOAD_LEN] {
        let freq = self.frequency_raw.to_le_bytes();
        // Bias is bounded to a few thousand either side of zero, so the
        // offset value always fits in 16 bits
        let bias = ((self.bias_raw + BIAS_WIRE_OFFSET) as u16).to_le_bytes();

        [
            freq[0],
            freq[1],
            freq[2],
            freq[3],
            flag_to_wire(self.short_pulse),
            flag_to_wire(self.high_voltage),
            bias[0],
            bias[1],
            flag_to_wire(self.running),
        ]
    }
}

/// Messages received from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage {
    /// Report the current configuration without changing anything
    QueryConfig,
    /// Replace the whole configuration
    ApplyConfig(ConfigPayload),
}

impl HostMessage {
    /// Interpret a decoded frame payload
    ///
    /// Returns `None` for payloads that are not a known message; those are
    /// dropped without reply.
    pub fn from_payload(payload: &[u8]) -> Option<Self> {
        match payload {
            [QUERY_CONFIG] => Some(HostMessage::QueryConfig),
            _ if payload.len() == CONFIG_PAYLOAD_LEN => {
                ConfigPayload::from_bytes(payload).ok().map(HostMessage::ApplyConfig)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_payload() {
        let payload = [0xE8, 0x03, 0x00, 0x00, 0x00, 0x01, 0x88, 0x13, 0x00];
        let config = ConfigPayload::from_bytes(&payload).unwrap();

        assert_eq!(config.frequency_raw, 1000);
        assert!(config.short_pulse);
        assert!(!config.high_voltage);
        assert_eq!(config.bias_raw, 0);
        assert!(config.running);
    }

    #[test]
    fn test_negative_bias() {
        let config = ConfigPayload {
            frequency_raw: 1,
            short_pulse: false,
            high_voltage: true,
            bias_raw: -500,
            running: false,
        };
        let bytes = config.to_bytes();

        // 4500 = 0x1194
        assert_eq!(&bytes[6..8], &[0x94, 0x11]);
        assert_eq!(ConfigPayload::from_bytes(&bytes).unwrap(), config);
    }

    #[test]
    fn test_flags_are_inverted_on_wire() {
        let config = ConfigPayload {
            frequency_raw: 0x0102_0304,
            short_pulse: false,
            high_voltage: true,
            bias_raw: 0,
            running: false,
        };
        let bytes = config.to_bytes();

        assert_eq!(&bytes[..4], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(bytes[4], 0x01);
        assert_eq!(bytes[5], 0x00);
        assert_eq!(bytes[8], 0x01);
    }

    #[test]
    fn test_any_nonzero_flag_is_false() {
        let mut payload = [0xE8, 0x03, 0x00, 0x00, 0xFF, 0x7E, 0x88, 0x13, 0x02];
        let config = ConfigPayload::from_bytes(&payload).unwrap();
        assert!(!config.short_pulse);
        assert!(!config.high_voltage);
        assert!(!config.running);

        payload[8] = 0x00;
        assert!(ConfigPayload::from_bytes(&payload).unwrap().running);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert_eq!(
            ConfigPayload::from_bytes(&[0u8; 8]),
            Err(MessageError::InvalidLength)
        );
        assert_eq!(
            ConfigPayload::from_bytes(&[0u8; 10]),
            Err(MessageError::InvalidLength)
        );
    }

    #[test]
    fn test_host_message_query() {
        assert_eq!(
            HostMessage::from_payload(&[QUERY_CONFIG]),
            Some(HostMessage::QueryConfig)
        );
        assert_eq!(HostMessage::from_payload(&[0x55]), None);
    }

    #[test]
    fn test_host_message_apply() {
        let payload = [0xE8, 0x03, 0x00, 0x00, 0x00, 0x01, 0x88, 0x13, 0x00];
        match HostMessage::from_payload(&payload) {
            Some(HostMessage::ApplyConfig(config)) => assert_eq!(config.frequency_raw, 1000),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_host_message_other_lengths_ignored() {
        assert_eq!(HostMessage::from_payload(&[]), None);
        assert_eq!(HostMessage::from_payload(&[0xAA, 0xAA]), None);
        assert_eq!(HostMessage::from_payload(&[0u8; 12]), None);
    }
}
