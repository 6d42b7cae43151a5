//! Tag enums carried in the frame header
//!
//! Every tag is a single byte on the wire. Conversions are explicit in both
//! directions so that an unrecognised byte is rejected instead of being
//! reinterpreted.

/// Largest speed a motor command may request [rpm]
pub const MAXIMUM_MOTOR_VALUE: i16 = 10_000;

/// Smallest speed a motor command may request [rpm]
pub const MINIMUM_MOTOR_VALUE: i16 = -10_000;

/// LED brightness for fully on
pub const LED_ON: u8 = 255;

/// LED brightness for off
pub const LED_OFF: u8 = 0;

/// First header byte: what kind of message follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageType {
    Error,
    SensorEnable,
    SensorDisable,
    SensorData,
    SensorGet,
    Time,
    Actuator,
    ActuatorAck,
}

// Wire format values
const MSG_ERROR: u8 = 0x00;
const MSG_SENSOR_ENABLE: u8 = 0x01;
const MSG_SENSOR_DISABLE: u8 = 0x02;
const MSG_SENSOR_DATA: u8 = 0x03;
const MSG_SENSOR_GET: u8 = 0x04;
const MSG_TIME: u8 = 0x05;
const MSG_ACTUATOR: u8 = 0x06;
const MSG_ACTUATOR_ACK: u8 = 0x07;

impl MessageType {
    /// Parse a message type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MSG_ERROR => Some(MessageType::Error),
            MSG_SENSOR_ENABLE => Some(MessageType::SensorEnable),
            MSG_SENSOR_DISABLE => Some(MessageType::SensorDisable),
            MSG_SENSOR_DATA => Some(MessageType::SensorData),
            MSG_SENSOR_GET => Some(MessageType::SensorGet),
            MSG_TIME => Some(MessageType::Time),
            MSG_ACTUATOR => Some(MessageType::Actuator),
            MSG_ACTUATOR_ACK => Some(MessageType::ActuatorAck),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            MessageType::Error => MSG_ERROR,
            MessageType::SensorEnable => MSG_SENSOR_ENABLE,
            MessageType::SensorDisable => MSG_SENSOR_DISABLE,
            MessageType::SensorData => MSG_SENSOR_DATA,
            MessageType::SensorGet => MSG_SENSOR_GET,
            MessageType::Time => MSG_TIME,
            MessageType::Actuator => MSG_ACTUATOR,
            MessageType::ActuatorAck => MSG_ACTUATOR_ACK,
        }
    }

    /// Which tag space the second header byte belongs to
    pub fn subtype_kind(self) -> SubtypeKind {
        match self {
            MessageType::Actuator => SubtypeKind::Actuator,
            MessageType::Time => SubtypeKind::None,
            _ => SubtypeKind::Sensor,
        }
    }
}

/// Tag space of the second header byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubtypeKind {
    /// Byte holds a [`SensorType`]
    Sensor,
    /// Byte holds an [`ActuatorType`]
    Actuator,
    /// Byte is unused and written as zero
    None,
}

/// Sensor kinds known to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorType {
    Unknown,
    Proximity,
    Gyroscope,
    Accelerometer,
    Magnetometer,
    Orientation,
    Servo,
    Motor,
    Led,
    Mouse,
    SBus,
}

impl SensorType {
    /// Number of sensor kinds. The byte with this value terminates the tag
    /// space and is never a valid sensor.
    pub const COUNT: u8 = 11;

    /// All sensor kinds in wire order
    pub const ALL: [SensorType; Self::COUNT as usize] = [
        SensorType::Unknown,
        SensorType::Proximity,
        SensorType::Gyroscope,
        SensorType::Accelerometer,
        SensorType::Magnetometer,
        SensorType::Orientation,
        SensorType::Servo,
        SensorType::Motor,
        SensorType::Led,
        SensorType::Mouse,
        SensorType::SBus,
    ];

    /// Parse a sensor type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Actuator kinds the board can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorType {
    Servo,
    Motor,
    Led,
}

const ACTUATOR_SERVO: u8 = 0x00;
const ACTUATOR_MOTOR: u8 = 0x01;
const ACTUATOR_LED: u8 = 0x02;

impl ActuatorType {
    /// Parse an actuator type from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ACTUATOR_SERVO => Some(ActuatorType::Servo),
            ACTUATOR_MOTOR => Some(ActuatorType::Motor),
            ACTUATOR_LED => Some(ActuatorType::Led),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            ActuatorType::Servo => ACTUATOR_SERVO,
            ActuatorType::Motor => ACTUATOR_MOTOR,
            ActuatorType::Led => ACTUATOR_LED,
        }
    }
}

/// Error codes reported by the board in an `ERROR` message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    // Invalid header
    InvalidMessageType,
    InvalidSensorType,
    InvalidSensorId,

    // Message type dependent
    SensorEnableFailed,
    SensorDisableFailed,
    SensorDataFailed,

    // Specific
    SensorTimeout,
}

impl ErrorCode {
    const ALL: [ErrorCode; 7] = [
        ErrorCode::InvalidMessageType,
        ErrorCode::InvalidSensorType,
        ErrorCode::InvalidSensorId,
        ErrorCode::SensorEnableFailed,
        ErrorCode::SensorDisableFailed,
        ErrorCode::SensorDataFailed,
        ErrorCode::SensorTimeout,
    ];

    /// Parse an error code from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Returns true if the board rejected the header of a request
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            ErrorCode::InvalidMessageType
                | ErrorCode::InvalidSensorType
                | ErrorCode::InvalidSensorId
        )
    }
}
