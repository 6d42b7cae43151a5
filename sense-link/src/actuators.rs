//! Actuator command set
//!
//! Control loops write the latest command for each actuator into an
//! [`Actuators`] set once per cycle; the link then turns the set into one
//! `ACTUATOR` message per entry.

use heapless::Vec;

use crate::message::{ActuatorData, Body, Message};
use crate::types::ActuatorType;

/// The set already holds `N` distinct actuators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorsFull;

impl core::fmt::Display for ActuatorsFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("actuator set is full")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ActuatorsFull {}

/// Latest command per actuator, keyed by type and id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Actuators<const N: usize> {
    entries: Vec<(u8, ActuatorData), N>,
}

impl<const N: usize> Actuators<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, actuator: ActuatorType, id: u8) -> Option<usize> {
        self.entries
            .iter()
            .position(|(entry_id, data)| *entry_id == id && data.actuator_type() == actuator)
    }

    /// Set the command for actuator `id`, replacing any previous command
    /// for the same actuator
    pub fn set(&mut self, id: u8, data: ActuatorData) -> Result<(), ActuatorsFull> {
        match self.position(data.actuator_type(), id) {
            Some(index) => {
                self.entries[index].1 = data;
                Ok(())
            }
            None => self.entries.push((id, data)).map_err(|_| ActuatorsFull),
        }
    }

    pub fn get(&self, actuator: ActuatorType, id: u8) -> Option<&ActuatorData> {
        self.position(actuator, id).map(|index| &self.entries[index].1)
    }

    pub fn remove(&mut self, actuator: ActuatorType, id: u8) -> Option<ActuatorData> {
        self.position(actuator, id)
            .map(|index| self.entries.remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Commands in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &ActuatorData)> + '_ {
        self.entries.iter().map(|(id, data)| (*id, data))
    }

    /// One `ACTUATOR` message per command, numbered from `first_sequence`
    ///
    /// Sequence numbers wrap at 255.
    pub fn messages(&self, first_sequence: u8) -> impl Iterator<Item = Message> + '_ {
        self.entries
            .iter()
            .zip(0u8..=u8::MAX)
            .map(move |((id, data), offset)| {
                Message::new(*id, first_sequence.wrapping_add(offset), Body::Actuator(*data))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageType;

    #[test]
    fn test_set_and_get() {
        let mut actuators = Actuators::<4>::new();
        actuators.set(1, ActuatorData::servo(10)).unwrap();
        actuators.set(2, ActuatorData::servo(-10)).unwrap();
        actuators.set(1, ActuatorData::led_on()).unwrap();

        assert_eq!(actuators.len(), 3);
        assert_eq!(
            actuators.get(ActuatorType::Servo, 1),
            Some(&ActuatorData::Servo { angle: 10 })
        );
        assert_eq!(actuators.get(ActuatorType::Led, 1), Some(&ActuatorData::Led { value: 255 }));
        assert_eq!(actuators.get(ActuatorType::Motor, 1), None);
    }

    #[test]
    fn test_set_replaces_same_actuator() {
        let mut actuators = Actuators::<2>::new();
        actuators.set(1, ActuatorData::servo(10)).unwrap();
        actuators.set(1, ActuatorData::servo(20)).unwrap();

        assert_eq!(actuators.len(), 1);
        assert_eq!(
            actuators.get(ActuatorType::Servo, 1),
            Some(&ActuatorData::Servo { angle: 20 })
        );
    }

    #[test]
    fn test_full_set() {
        let mut actuators = Actuators::<1>::new();
        actuators.set(1, ActuatorData::motor(100)).unwrap();
        assert_eq!(actuators.set(2, ActuatorData::motor(100)), Err(ActuatorsFull));
        // Replacing an existing entry still works
        assert_eq!(actuators.set(1, ActuatorData::motor(200)), Ok(()));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut actuators = Actuators::<4>::new();
        actuators.set(1, ActuatorData::servo(10)).unwrap();
        actuators.set(2, ActuatorData::led_off()).unwrap();

        assert_eq!(actuators.remove(ActuatorType::Servo, 1), Some(ActuatorData::servo(10)));
        assert_eq!(actuators.remove(ActuatorType::Servo, 1), None);
        assert_eq!(actuators.len(), 1);

        actuators.clear();
        assert!(actuators.is_empty());
    }

    #[test]
    fn test_messages() {
        let mut actuators = Actuators::<4>::new();
        actuators.set(1, ActuatorData::servo(30)).unwrap();
        actuators.set(2, ActuatorData::servo(-30)).unwrap();
        actuators.set(1, ActuatorData::led_on()).unwrap();

        let messages: Vec<Message, 4> = actuators.messages(254).collect();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.message_type() == MessageType::Actuator));
        assert_eq!(messages[0].sequence, 254);
        assert_eq!(messages[1].sequence, 255);
        assert_eq!(messages[2].sequence, 0);
        assert_eq!(messages[1].id, 2);
        assert_eq!(messages[2].body, Body::Actuator(ActuatorData::led_on()));
    }

    #[test]
    fn test_iter_order() {
        let mut actuators = Actuators::<4>::new();
        actuators.set(5, ActuatorData::motor(1)).unwrap();
        actuators.set(3, ActuatorData::motor(2)).unwrap();
        let ids: Vec<u8, 4> = actuators.iter().map(|(id, _)| id).collect();
        assert_eq!(&ids[..], &[5, 3]);
    }
}
