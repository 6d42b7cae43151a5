//! Message model
//!
//! A [`Message`] is a header (`id`, `sequence`) plus a [`Body`]. The body
//! variant fixes the message type, the subtype tag and the payload layout, so
//! a message whose tags disagree with its payload cannot be built.
//!
//! Payload layouts are described once, by [`Shape`] and [`payload_shape`],
//! and used by both the encoder and the decoder.

use crate::error::DecodeError;
use crate::types::{
    ActuatorType, ErrorCode, MessageType, SensorType, SubtypeKind, LED_OFF, LED_ON,
    MAXIMUM_MOTOR_VALUE, MINIMUM_MOTOR_VALUE,
};

/// Number of SBus channels carried in a frame
pub const SBUS_CHANNELS: usize = 8;

/// Three-axis reading
///
/// Units depend on the sensor:
/// - accelerometer: micro-g, including gravity
/// - gyroscope: micro-degrees per second
/// - magnetometer: nanotesla
/// - orientation: millidegrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Vector3 {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// Optical mouse displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseData {
    /// Movement in x direction [micro-inch]
    pub x: i32,
    /// Movement in y direction [micro-inch]
    pub y: i32,
    /// Time over which the movement occurred [us]
    pub duration: u32,
    /// Surface measurement quality, higher is better
    pub surface_quality: u8,
}

/// Raw SBus receiver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SBusData {
    /// First eight channel values
    pub channels: [u16; SBUS_CHANNELS],
    /// SBus flags bitmask
    pub flags: u8,
}

/// A sensor reading, one variant per [`SensorType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorData {
    /// No payload
    Unknown,
    /// Distance to object [mm]
    Proximity { distance: i16 },
    Gyroscope(Vector3),
    Accelerometer(Vector3),
    Magnetometer(Vector3),
    Orientation(Vector3),
    /// Servo deflection [deg]
    Servo { angle: i16 },
    /// Motor speed [rpm]
    Motor { speed: i16 },
    /// Digital brightness
    Led { value: u8 },
    Mouse(MouseData),
    SBus(SBusData),
}

impl SensorData {
    /// The sensor tag this reading is sent under
    pub fn sensor_type(&self) -> SensorType {
        match self {
            SensorData::Unknown => SensorType::Unknown,
            SensorData::Proximity { .. } => SensorType::Proximity,
            SensorData::Gyroscope(_) => SensorType::Gyroscope,
            SensorData::Accelerometer(_) => SensorType::Accelerometer,
            SensorData::Magnetometer(_) => SensorType::Magnetometer,
            SensorData::Orientation(_) => SensorType::Orientation,
            SensorData::Servo { .. } => SensorType::Servo,
            SensorData::Motor { .. } => SensorType::Motor,
            SensorData::Led { .. } => SensorType::Led,
            SensorData::Mouse(_) => SensorType::Mouse,
            SensorData::SBus(_) => SensorType::SBus,
        }
    }
}

/// An actuator command, one variant per [`ActuatorType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorData {
    /// Servo deflection [deg]
    Servo { angle: i16 },
    /// Motor speed [rpm]
    Motor { speed: i16 },
    /// Digital brightness
    Led { value: u8 },
}

impl ActuatorData {
    /// Motor command, clamped to the supported speed range
    pub fn motor(speed: i16) -> Self {
        ActuatorData::Motor {
            speed: speed.clamp(MINIMUM_MOTOR_VALUE, MAXIMUM_MOTOR_VALUE),
        }
    }

    pub fn servo(angle: i16) -> Self {
        ActuatorData::Servo { angle }
    }

    pub fn led(value: u8) -> Self {
        ActuatorData::Led { value }
    }

    pub fn led_on() -> Self {
        Self::led(LED_ON)
    }

    pub fn led_off() -> Self {
        Self::led(LED_OFF)
    }

    /// The actuator tag this command is sent under
    pub fn actuator_type(&self) -> ActuatorType {
        match self {
            ActuatorData::Servo { .. } => ActuatorType::Servo,
            ActuatorData::Motor { .. } => ActuatorType::Motor,
            ActuatorData::Led { .. } => ActuatorType::Led,
        }
    }
}

/// Message body, one variant per [`MessageType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Body {
    /// Board-reported failure concerning `sensor`
    Error { sensor: SensorType, code: ErrorCode },
    SensorEnable(SensorType),
    SensorDisable(SensorType),
    SensorData(SensorData),
    SensorGet(SensorType),
    /// Clock synchronisation, microseconds
    Time { micros: u64 },
    Actuator(ActuatorData),
    ActuatorAck(SensorType),
}

impl Body {
    pub fn message_type(&self) -> MessageType {
        match self {
            Body::Error { .. } => MessageType::Error,
            Body::SensorEnable(_) => MessageType::SensorEnable,
            Body::SensorDisable(_) => MessageType::SensorDisable,
            Body::SensorData(_) => MessageType::SensorData,
            Body::SensorGet(_) => MessageType::SensorGet,
            Body::Time { .. } => MessageType::Time,
            Body::Actuator(_) => MessageType::Actuator,
            Body::ActuatorAck(_) => MessageType::ActuatorAck,
        }
    }

    pub fn subtype(&self) -> Subtype {
        match self {
            Body::Error { sensor, .. }
            | Body::SensorEnable(sensor)
            | Body::SensorDisable(sensor)
            | Body::SensorGet(sensor)
            | Body::ActuatorAck(sensor) => Subtype::Sensor(*sensor),
            Body::SensorData(data) => Subtype::Sensor(data.sensor_type()),
            Body::Time { .. } => Subtype::None,
            Body::Actuator(data) => Subtype::Actuator(data.actuator_type()),
        }
    }
}

/// Decoded second header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Subtype {
    Sensor(SensorType),
    Actuator(ActuatorType),
    None,
}

impl Subtype {
    /// Parse the second header byte in the tag space selected by `message_type`
    pub fn parse(message_type: MessageType, byte: u8) -> Result<Self, DecodeError> {
        match message_type.subtype_kind() {
            SubtypeKind::Sensor => SensorType::from_byte(byte)
                .map(Subtype::Sensor)
                .ok_or(DecodeError::InvalidSensorType),
            SubtypeKind::Actuator => ActuatorType::from_byte(byte)
                .map(Subtype::Actuator)
                .ok_or(DecodeError::InvalidActuatorType),
            SubtypeKind::None => Ok(Subtype::None),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Subtype::Sensor(sensor) => sensor.to_byte(),
            Subtype::Actuator(actuator) => actuator.to_byte(),
            Subtype::None => 0,
        }
    }

    pub(crate) fn sensor(self) -> Result<SensorType, DecodeError> {
        match self {
            Subtype::Sensor(sensor) => Ok(sensor),
            _ => Err(DecodeError::InvalidSensorType),
        }
    }

    pub(crate) fn actuator(self) -> Result<ActuatorType, DecodeError> {
        match self {
            Subtype::Actuator(actuator) => Ok(actuator),
            _ => Err(DecodeError::InvalidActuatorType),
        }
    }
}

/// Payload layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// No payload, header and checksum only
    Empty,
    /// One byte
    Byte,
    /// One 16-bit integer
    Short,
    /// Three 32-bit integers
    Vector3,
    /// Three 32-bit integers and one byte
    Mouse,
    /// Eight 16-bit integers and one byte
    SBus,
    /// One 64-bit integer
    Timestamp,
}

impl Shape {
    /// Payload size in bytes
    pub const fn len(self) -> usize {
        match self {
            Shape::Empty => 0,
            Shape::Byte => 1,
            Shape::Short => 2,
            Shape::Vector3 => 12,
            Shape::Mouse => 13,
            Shape::SBus => 2 * SBUS_CHANNELS + 1,
            Shape::Timestamp => 8,
        }
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl SensorType {
    /// Payload layout of a `SENSOR_DATA` message for this sensor
    pub fn shape(self) -> Shape {
        match self {
            SensorType::Unknown => Shape::Empty,
            SensorType::Proximity | SensorType::Servo | SensorType::Motor => Shape::Short,
            SensorType::Gyroscope
            | SensorType::Accelerometer
            | SensorType::Magnetometer
            | SensorType::Orientation => Shape::Vector3,
            SensorType::Led => Shape::Byte,
            SensorType::Mouse => Shape::Mouse,
            SensorType::SBus => Shape::SBus,
        }
    }
}

impl ActuatorType {
    /// Payload layout of an `ACTUATOR` message for this actuator
    pub fn shape(self) -> Shape {
        match self {
            ActuatorType::Servo | ActuatorType::Motor => Shape::Short,
            ActuatorType::Led => Shape::Byte,
        }
    }
}

/// Payload layout selected by the header tags
pub fn payload_shape(message_type: MessageType, subtype: Subtype) -> Shape {
    match (message_type, subtype) {
        (MessageType::Error, _) => Shape::Byte,
        (MessageType::Time, _) => Shape::Timestamp,
        (MessageType::Actuator, Subtype::Actuator(actuator)) => actuator.shape(),
        (MessageType::SensorData, Subtype::Sensor(sensor)) => sensor.shape(),
        _ => Shape::Empty,
    }
}

/// A message exchanged between board and host
///
/// `id` and `sequence` are opaque to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Message {
    /// Sensor or actuator instance
    pub id: u8,
    /// Caller-assigned sequence number
    pub sequence: u8,
    pub body: Body,
}

impl Message {
    pub fn new(id: u8, sequence: u8, body: Body) -> Self {
        Self { id, sequence, body }
    }

    pub fn error(id: u8, sequence: u8, sensor: SensorType, code: ErrorCode) -> Self {
        Self::new(id, sequence, Body::Error { sensor, code })
    }

    pub fn time(id: u8, sequence: u8, micros: u64) -> Self {
        Self::new(id, sequence, Body::Time { micros })
    }

    pub fn sensor_data(id: u8, sequence: u8, data: SensorData) -> Self {
        Self::new(id, sequence, Body::SensorData(data))
    }

    pub fn actuator(id: u8, sequence: u8, data: ActuatorData) -> Self {
        Self::new(id, sequence, Body::Actuator(data))
    }

    pub fn message_type(&self) -> MessageType {
        self.body.message_type()
    }

    pub fn subtype(&self) -> Subtype {
        self.body.subtype()
    }

    pub fn shape(&self) -> Shape {
        payload_shape(self.message_type(), self.subtype())
    }
}
