//! Sensor board link protocol
//!
//! This crate defines the binary message format exchanged between the sensor
//! board (a microcontroller driving servos, motors and LEDs and sampling
//! sensors) and the host control process, over a UART. Encoding and decoding
//! are allocation-free and behave identically on the board and on the host.
//!
//! # Protocol Overview
//!
//! Every message is one self-describing frame:
//! ```text
//! ┌──────┬─────────┬────┬──────────┬─────────────┬──────────┐
//! │ TYPE │ SUBTYPE │ ID │ SEQUENCE │ PAYLOAD     │ CHECKSUM │
//! │ 1B   │ 1B      │ 1B │ 1B       │ 0–17B       │ 1B       │
//! └──────┴─────────┴────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! The payload layout is selected by TYPE and SUBTYPE; there is no length
//! field. Multi-byte fields are little-endian. The checksum is a CRC-8 over
//! everything before it.
//!
//! ```
//! use sense_link::{ActuatorData, Message, MAX_FRAME_SIZE};
//!
//! let msg = Message::actuator(1, 0, ActuatorData::servo(90));
//! let mut buffer = [0u8; MAX_FRAME_SIZE];
//! let len = msg.encode(&mut buffer);
//! assert_eq!(len, 7);
//!
//! let (decoded, used) = Message::decode(&buffer[..len]).unwrap();
//! assert_eq!(decoded, msg);
//! assert_eq!(used, len);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod actuators;
pub mod codec;
pub mod crc;
pub mod error;
pub mod link;
pub mod message;
pub mod reader;
pub mod types;
pub mod wire;

pub use actuators::{Actuators, ActuatorsFull};
pub use codec::{
    frame_len, peek_frame_len, CHECKSUM_SIZE, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
    MIN_FRAME_SIZE,
};
pub use crc::crc8;
pub use error::{DecodeError, EncodeError};
#[cfg(feature = "async")]
pub use link::AsyncLink;
pub use link::{Link, LinkError};
pub use message::{
    payload_shape, ActuatorData, Body, Message, MouseData, SBusData, SensorData, Shape, Subtype,
    Vector3, SBUS_CHANNELS,
};
pub use reader::{FeedResult, MessageReader};
pub use types::{
    ActuatorType, ErrorCode, MessageType, SensorType, SubtypeKind, LED_OFF, LED_ON,
    MAXIMUM_MOTOR_VALUE, MINIMUM_MOTOR_VALUE,
};
