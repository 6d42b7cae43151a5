//! Frame encoding and decoding
//!
//! Frame format:
//! - TYPE (1 byte): [`MessageType`]
//! - SUBTYPE (1 byte): [`SensorType`] or [`ActuatorType`], per TYPE; zero for TIME
//! - ID (1 byte): sensor or actuator instance
//! - SEQUENCE (1 byte): caller-assigned
//! - PAYLOAD (0-17 bytes): layout selected by TYPE and SUBTYPE, little-endian
//! - CHECKSUM (1 byte): CRC-8 of all preceding bytes
//!
//! There is no length field or delimiter. The payload length follows from the
//! header tags, so both ends must share the same layout table.
//!
//! [`SensorType`]: crate::types::SensorType
//! [`ActuatorType`]: crate::types::ActuatorType

use heapless::Vec;

use crate::crc::crc8;
use crate::error::{DecodeError, EncodeError};
use crate::message::{
    payload_shape, ActuatorData, Body, MouseData, SBusData, SensorData, Shape, Subtype, Vector3,
    SBUS_CHANNELS,
};
use crate::types::{ActuatorType, ErrorCode, MessageType, SensorType};
use crate::wire::{Reader, Writer};

/// Header size in bytes (TYPE, SUBTYPE, ID, SEQUENCE)
pub const HEADER_SIZE: usize = 4;

/// Trailer size in bytes
pub const CHECKSUM_SIZE: usize = 1;

/// Largest payload (SBus sensor data)
pub const MAX_PAYLOAD_SIZE: usize = Shape::SBus.len();

/// Largest complete frame
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD_SIZE + CHECKSUM_SIZE;

/// Smallest frame (header and checksum only, e.g. SENSOR_ENABLE)
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + CHECKSUM_SIZE;

/// Total frame length for a header with the given tags
pub fn frame_len(message_type: MessageType, subtype: Subtype) -> usize {
    HEADER_SIZE + payload_shape(message_type, subtype).len() + CHECKSUM_SIZE
}

/// Frame length announced by the first two bytes of `bytes`
///
/// Useful for receivers that need to know how many bytes to wait for.
pub fn peek_frame_len(bytes: &[u8]) -> Result<usize, DecodeError> {
    let mut reader = Reader::new(bytes);
    let message_type =
        MessageType::from_byte(reader.u8()?).ok_or(DecodeError::InvalidMessageType)?;
    let subtype = Subtype::parse(message_type, reader.u8()?)?;
    Ok(frame_len(message_type, subtype))
}

impl crate::message::Message {
    /// Size of this message once encoded
    pub fn frame_len(&self) -> usize {
        frame_len(self.message_type(), self.subtype())
    }

    /// Encode this message into a frame buffer
    ///
    /// Returns the number of bytes written. Any message fits in
    /// [`MAX_FRAME_SIZE`] bytes, so this cannot fail.
    pub fn encode(&self, buffer: &mut [u8; MAX_FRAME_SIZE]) -> usize {
        self.write_frame(buffer)
    }

    /// Encode this message into an arbitrary byte buffer
    ///
    /// Nothing is written if the buffer cannot hold the complete frame.
    pub fn encode_slice(&self, buffer: &mut [u8]) -> Result<usize, EncodeError> {
        let len = self.frame_len();
        if buffer.len() < len {
            return Err(EncodeError::BufferTooSmall);
        }
        Ok(self.write_frame(&mut buffer[..len]))
    }

    /// Encode this message into a heapless Vec
    pub fn encode_to_vec(&self) -> Vec<u8, MAX_FRAME_SIZE> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer);
        // len <= MAX_FRAME_SIZE, so the collect never overflows
        buffer[..len].iter().copied().collect()
    }

    fn write_frame(&self, buffer: &mut [u8]) -> usize {
        let mut writer = Writer::new(buffer);
        writer.u8(self.message_type().to_byte());
        writer.u8(self.subtype().to_byte());
        writer.u8(self.id);
        writer.u8(self.sequence);
        write_body(&self.body, &mut writer);
        debug_assert_eq!(writer.position(), self.frame_len() - CHECKSUM_SIZE);

        let checksum = crc8(writer.written());
        writer.u8(checksum);
        writer.position()
    }

    /// Decode one frame from the start of `bytes`
    ///
    /// Returns the message and the number of bytes it occupied. Bytes after
    /// the frame are not inspected.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let mut reader = Reader::new(bytes);
        let message_type =
            MessageType::from_byte(reader.u8()?).ok_or(DecodeError::InvalidMessageType)?;
        let subtype = Subtype::parse(message_type, reader.u8()?)?;
        let id = reader.u8()?;
        let sequence = reader.u8()?;

        let len = frame_len(message_type, subtype);
        if bytes.len() < len {
            return Err(DecodeError::BufferTooShort);
        }
        let checked = len - CHECKSUM_SIZE;
        if crc8(&bytes[..checked]) != bytes[checked] {
            return Err(DecodeError::ChecksumMismatch);
        }

        let body = read_body(message_type, subtype, &mut reader)?;
        debug_assert_eq!(reader.position(), checked);

        Ok((Self::new(id, sequence, body), len))
    }
}

fn write_body(body: &Body, writer: &mut Writer<'_>) {
    match body {
        Body::Error { code, .. } => writer.u8(code.to_byte()),
        Body::Time { micros } => writer.u64(*micros),
        Body::Actuator(data) => match data {
            ActuatorData::Servo { angle } => writer.i16(*angle),
            ActuatorData::Motor { speed } => writer.i16(*speed),
            ActuatorData::Led { value } => writer.u8(*value),
        },
        Body::SensorData(data) => write_sensor_data(data, writer),
        Body::SensorEnable(_)
        | Body::SensorDisable(_)
        | Body::SensorGet(_)
        | Body::ActuatorAck(_) => {}
    }
}

fn write_sensor_data(data: &SensorData, writer: &mut Writer<'_>) {
    match data {
        SensorData::Unknown => {}
        SensorData::Proximity { distance } => writer.i16(*distance),
        SensorData::Gyroscope(v)
        | SensorData::Accelerometer(v)
        | SensorData::Magnetometer(v)
        | SensorData::Orientation(v) => {
            writer.i32(v.x);
            writer.i32(v.y);
            writer.i32(v.z);
        }
        SensorData::Servo { angle } => writer.i16(*angle),
        SensorData::Motor { speed } => writer.i16(*speed),
        SensorData::Led { value } => writer.u8(*value),
        SensorData::Mouse(mouse) => {
            writer.i32(mouse.x);
            writer.i32(mouse.y);
            writer.u32(mouse.duration);
            writer.u8(mouse.surface_quality);
        }
        SensorData::SBus(sbus) => {
            for &channel in &sbus.channels {
                writer.u16(channel);
            }
            writer.u8(sbus.flags);
        }
    }
}

fn read_body(
    message_type: MessageType,
    subtype: Subtype,
    reader: &mut Reader<'_>,
) -> Result<Body, DecodeError> {
    let body = match message_type {
        MessageType::Error => {
            let sensor = subtype.sensor()?;
            let code = ErrorCode::from_byte(reader.u8()?).ok_or(DecodeError::InvalidErrorCode)?;
            Body::Error { sensor, code }
        }
        MessageType::SensorEnable => Body::SensorEnable(subtype.sensor()?),
        MessageType::SensorDisable => Body::SensorDisable(subtype.sensor()?),
        MessageType::SensorData => Body::SensorData(read_sensor_data(subtype.sensor()?, reader)?),
        MessageType::SensorGet => Body::SensorGet(subtype.sensor()?),
        MessageType::Time => Body::Time {
            micros: reader.u64()?,
        },
        MessageType::Actuator => Body::Actuator(read_actuator_data(subtype.actuator()?, reader)?),
        MessageType::ActuatorAck => Body::ActuatorAck(subtype.sensor()?),
    };
    Ok(body)
}

fn read_vector(reader: &mut Reader<'_>) -> Result<Vector3, DecodeError> {
    Ok(Vector3 {
        x: reader.i32()?,
        y: reader.i32()?,
        z: reader.i32()?,
    })
}

fn read_sensor_data(sensor: SensorType, reader: &mut Reader<'_>) -> Result<SensorData, DecodeError> {
    let data = match sensor {
        SensorType::Unknown => SensorData::Unknown,
        SensorType::Proximity => SensorData::Proximity {
            distance: reader.i16()?,
        },
        SensorType::Gyroscope => SensorData::Gyroscope(read_vector(reader)?),
        SensorType::Accelerometer => SensorData::Accelerometer(read_vector(reader)?),
        SensorType::Magnetometer => SensorData::Magnetometer(read_vector(reader)?),
        SensorType::Orientation => SensorData::Orientation(read_vector(reader)?),
        SensorType::Servo => SensorData::Servo {
            angle: reader.i16()?,
        },
        SensorType::Motor => SensorData::Motor {
            speed: reader.i16()?,
        },
        SensorType::Led => SensorData::Led {
            value: reader.u8()?,
        },
        SensorType::Mouse => SensorData::Mouse(MouseData {
            x: reader.i32()?,
            y: reader.i32()?,
            duration: reader.u32()?,
            surface_quality: reader.u8()?,
        }),
        SensorType::SBus => {
            let mut channels = [0u16; SBUS_CHANNELS];
            for channel in channels.iter_mut() {
                *channel = reader.u16()?;
            }
            SensorData::SBus(SBusData {
                channels,
                flags: reader.u8()?,
            })
        }
    };
    Ok(data)
}

fn read_actuator_data(
    actuator: ActuatorType,
    reader: &mut Reader<'_>,
) -> Result<ActuatorData, DecodeError> {
    let data = match actuator {
        ActuatorType::Servo => ActuatorData::Servo {
            angle: reader.i16()?,
        },
        ActuatorType::Motor => ActuatorData::Motor {
            speed: reader.i16()?,
        },
        ActuatorType::Led => ActuatorData::Led {
            value: reader.u8()?,
        },
    };
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use proptest::prelude::*;

    fn roundtrip(msg: Message) -> Message {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = msg.encode(&mut buffer);
        assert_eq!(len, msg.frame_len());
        let (decoded, consumed) = Message::decode(&buffer[..len]).unwrap();
        assert_eq!(consumed, len);
        decoded
    }

    #[test]
    fn test_frame_size_limits() {
        assert_eq!(MAX_PAYLOAD_SIZE, 17);
        assert_eq!(MAX_FRAME_SIZE, 22);
        assert_eq!(MIN_FRAME_SIZE, 5);
    }

    #[test]
    fn test_encode_time() {
        let msg = Message::time(3, 7, 1_000_000);
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = msg.encode(&mut buffer);

        assert_eq!(len, 13);
        assert_eq!(&buffer[..4], &[0x05, 0x00, 0x03, 0x07]);
        assert_eq!(&buffer[4..12], &[0x40, 0x42, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(buffer[12], 0x5C);
        assert_eq!(buffer[12], crc8(&buffer[..12]));

        let (decoded, consumed) = Message::decode(&buffer[..len]).unwrap();
        assert_eq!(consumed, 13);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_encode_actuator_servo() {
        let msg = Message::actuator(1, 0, ActuatorData::servo(90));
        let encoded = msg.encode_to_vec();

        assert_eq!(encoded.len(), 7);
        assert_eq!(&encoded[..], &[0x06, 0x00, 0x01, 0x00, 0x5A, 0x00, 0x7A]);

        let (decoded, _) = Message::decode(&encoded).unwrap();
        assert_eq!(decoded.body, Body::Actuator(ActuatorData::Servo { angle: 90 }));
    }

    #[test]
    fn test_error_frame_is_six_bytes() {
        let msg = Message::error(0, 0, SensorType::Unknown, ErrorCode::SensorTimeout);
        let encoded = msg.encode_to_vec();
        assert_eq!(encoded.len(), 6);
        assert_eq!(encoded[4], ErrorCode::SensorTimeout.to_byte());
        assert_eq!(encoded[5], crc8(&encoded[..5]));
        assert_eq!(roundtrip(msg), msg);
    }

    #[test]
    fn test_sbus_frame_is_twenty_two_bytes() {
        let msg = Message::sensor_data(
            4,
            200,
            SensorData::SBus(SBusData {
                channels: [172, 992, 1811, 0, 2047, 1, 1000, 65535],
                flags: 0b1100,
            }),
        );
        let encoded = msg.encode_to_vec();
        assert_eq!(encoded.len(), MAX_FRAME_SIZE);
        // First channel, little-endian
        assert_eq!(&encoded[4..6], &[172, 0]);
        assert_eq!(encoded[20], 0b1100);
        assert_eq!(roundtrip(msg), msg);
    }

    #[test]
    fn test_header_only_messages() {
        let bodies = [
            Body::SensorEnable(SensorType::Gyroscope),
            Body::SensorDisable(SensorType::Mouse),
            Body::SensorGet(SensorType::Proximity),
            Body::ActuatorAck(SensorType::Servo),
            Body::SensorData(SensorData::Unknown),
        ];
        for body in bodies {
            let msg = Message::new(9, 1, body);
            let encoded = msg.encode_to_vec();
            assert_eq!(encoded.len(), MIN_FRAME_SIZE);
            assert_eq!(encoded[1], msg.subtype().to_byte());
            assert_eq!(roundtrip(msg), msg);
        }
    }

    #[test]
    fn test_decode_corrupted_checksum() {
        let msg = Message::time(3, 7, 1_000_000);
        let mut encoded = msg.encode_to_vec();
        let last = encoded.len() - 1;
        encoded[last] ^= 0xFF;
        assert_eq!(Message::decode(&encoded), Err(DecodeError::ChecksumMismatch));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let first = Message::actuator(1, 0, ActuatorData::led_on());
        let second = Message::time(0, 1, 42);

        let mut stream = Vec::<u8, 64>::new();
        stream.extend_from_slice(&first.encode_to_vec()).unwrap();
        stream.extend_from_slice(&second.encode_to_vec()).unwrap();

        let (decoded, used) = Message::decode(&stream).unwrap();
        assert_eq!(decoded, first);
        let (decoded, rest) = Message::decode(&stream[used..]).unwrap();
        assert_eq!(decoded, second);
        assert_eq!(used + rest, stream.len());
    }

    #[test]
    fn test_decode_invalid_tags() {
        assert_eq!(
            Message::decode(&[0x08, 0, 0, 0, 0]),
            Err(DecodeError::InvalidMessageType)
        );
        assert_eq!(
            Message::decode(&[0x03, SensorType::COUNT, 0, 0, 0]),
            Err(DecodeError::InvalidSensorType)
        );
        assert_eq!(
            Message::decode(&[0x06, 0x03, 0, 0, 0, 0, 0]),
            Err(DecodeError::InvalidActuatorType)
        );
    }

    #[test]
    fn test_decode_invalid_error_code() {
        let mut frame = [0x00, 0x00, 0x01, 0x02, 0x07, 0x00];
        frame[5] = crc8(&frame[..5]);
        assert_eq!(Message::decode(&frame), Err(DecodeError::InvalidErrorCode));
    }

    #[test]
    fn test_decode_time_ignores_subtype_byte() {
        let mut frame = Message::time(1, 2, 99).encode_to_vec();
        frame[1] = 0xAB;
        let last = frame.len() - 1;
        frame[last] = crc8(&frame[..last]);
        let (decoded, _) = Message::decode(&frame).unwrap();
        assert_eq!(decoded, Message::time(1, 2, 99));
    }

    #[test]
    fn test_decode_empty_and_partial_header() {
        assert_eq!(Message::decode(&[]), Err(DecodeError::BufferTooShort));
        assert_eq!(Message::decode(&[0x05]), Err(DecodeError::BufferTooShort));
        assert_eq!(Message::decode(&[0x05, 0x00, 0x01]), Err(DecodeError::BufferTooShort));
        // Tags are checked as soon as their byte is present
        assert_eq!(Message::decode(&[0x09]), Err(DecodeError::InvalidMessageType));
        assert_eq!(Message::decode(&[0x03, 0x0B]), Err(DecodeError::InvalidSensorType));
        assert_eq!(Message::decode(&[0x06, 0x03]), Err(DecodeError::InvalidActuatorType));
    }

    #[test]
    fn test_encode_slice_too_small() {
        let msg = Message::time(0, 0, 0);
        let mut buffer = [0xEEu8; 12];
        assert_eq!(msg.encode_slice(&mut buffer), Err(EncodeError::BufferTooSmall));
        assert!(buffer.iter().all(|&b| b == 0xEE));

        let mut buffer = [0u8; 13];
        assert_eq!(msg.encode_slice(&mut buffer), Ok(13));
    }

    #[test]
    fn test_peek_frame_len() {
        assert_eq!(peek_frame_len(&[0x03, 0x0A]), Ok(22));
        assert_eq!(peek_frame_len(&[0x00, 0x00]), Ok(6));
        assert_eq!(peek_frame_len(&[0x06, 0x02]), Ok(6));
        assert_eq!(peek_frame_len(&[0x01, 0x04, 0xFF]), Ok(5));
        assert_eq!(peek_frame_len(&[0x03]), Err(DecodeError::BufferTooShort));
        assert_eq!(peek_frame_len(&[0x09, 0x00]), Err(DecodeError::InvalidMessageType));
    }

    fn vector() -> impl Strategy<Value = Vector3> {
        (any::<i32>(), any::<i32>(), any::<i32>()).prop_map(|(x, y, z)| Vector3::new(x, y, z))
    }

    fn scalar_sensor_data() -> impl Strategy<Value = SensorData> {
        prop_oneof![
            Just(SensorData::Unknown),
            any::<i16>().prop_map(|distance| SensorData::Proximity { distance }),
            any::<i16>().prop_map(|angle| SensorData::Servo { angle }),
            any::<i16>().prop_map(|speed| SensorData::Motor { speed }),
            any::<u8>().prop_map(|value| SensorData::Led { value }),
        ]
    }

    fn compound_sensor_data() -> impl Strategy<Value = SensorData> {
        prop_oneof![
            vector().prop_map(SensorData::Gyroscope),
            vector().prop_map(SensorData::Accelerometer),
            vector().prop_map(SensorData::Magnetometer),
            vector().prop_map(SensorData::Orientation),
            (any::<i32>(), any::<i32>(), any::<u32>(), any::<u8>()).prop_map(
                |(x, y, duration, surface_quality)| SensorData::Mouse(MouseData {
                    x,
                    y,
                    duration,
                    surface_quality,
                })
            ),
            (any::<[u16; SBUS_CHANNELS]>(), any::<u8>())
                .prop_map(|(channels, flags)| SensorData::SBus(SBusData { channels, flags })),
        ]
    }

    fn sensor_data() -> impl Strategy<Value = SensorData> {
        prop_oneof![scalar_sensor_data(), compound_sensor_data()]
    }

    fn actuator_data() -> impl Strategy<Value = ActuatorData> {
        prop_oneof![
            any::<i16>().prop_map(|angle| ActuatorData::Servo { angle }),
            any::<i16>().prop_map(|speed| ActuatorData::Motor { speed }),
            any::<u8>().prop_map(|value| ActuatorData::Led { value }),
        ]
    }

    fn sensor_type() -> impl Strategy<Value = SensorType> {
        proptest::sample::select(SensorType::ALL.to_vec())
    }

    fn error_code() -> impl Strategy<Value = ErrorCode> {
        (0u8..7).prop_map(|byte| ErrorCode::from_byte(byte).unwrap())
    }

    fn body() -> impl Strategy<Value = Body> {
        prop_oneof![
            (sensor_type(), error_code()).prop_map(|(sensor, code)| Body::Error { sensor, code }),
            sensor_type().prop_map(Body::SensorEnable),
            sensor_type().prop_map(Body::SensorDisable),
            sensor_data().prop_map(Body::SensorData),
            sensor_type().prop_map(Body::SensorGet),
            any::<u64>().prop_map(|micros| Body::Time { micros }),
            actuator_data().prop_map(Body::Actuator),
            sensor_type().prop_map(Body::ActuatorAck),
        ]
    }

    fn message() -> impl Strategy<Value = Message> {
        (any::<u8>(), any::<u8>(), body()).prop_map(|(id, sequence, body)| Message::new(id, sequence, body))
    }

    proptest! {
        #[test]
        fn prop_roundtrip(msg in message()) {
            let encoded = msg.encode_to_vec();
            prop_assert_eq!(encoded.len(), msg.frame_len());
            prop_assert_eq!(peek_frame_len(&encoded), Ok(encoded.len()));
            prop_assert_eq!(Message::decode(&encoded), Ok((msg, encoded.len())));
        }

        #[test]
        fn prop_truncated_frame_rejected(msg in message(), cut in 0usize..MAX_FRAME_SIZE) {
            let encoded = msg.encode_to_vec();
            let cut = cut % encoded.len();
            prop_assert_eq!(Message::decode(&encoded[..cut]), Err(DecodeError::BufferTooShort));
        }

        /// A flipped bit outside the tag bytes leaves the frame length alone,
        /// and CRC-8 catches every single-bit error over a fixed length.
        #[test]
        fn prop_bit_flip_in_body_detected(msg in message(), position in any::<prop::sample::Index>(), bit in 0u8..8) {
            let mut encoded = msg.encode_to_vec();
            let byte = 2 + position.index(encoded.len() - 2);
            encoded[byte] ^= 1 << bit;
            prop_assert_eq!(Message::decode(&encoded), Err(DecodeError::ChecksumMismatch));
        }

        /// A flipped tag bit changes the type or the frame length. It is
        /// normally rejected; a CRC-8 collision (about 1 in 256 when the
        /// length changes) can yield a different message, never the original.
        #[test]
        fn prop_bit_flip_in_tags_never_yields_original(msg in message(), byte in 0usize..2, bit in 0u8..8) {
            let mut padded = [0u8; MAX_FRAME_SIZE + 1];
            msg.encode_slice(&mut padded).unwrap();
            padded[byte] ^= 1 << bit;
            if let Ok((decoded, _)) = Message::decode(&padded) {
                prop_assert_ne!(decoded, msg);
            }
        }
    }
}
