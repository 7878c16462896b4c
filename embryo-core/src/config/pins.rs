//! Pin assignment types
//!
//! The default [`PinMap`] is the wiring of the V2 controller board:
//! TB6600 drivers on the three motors, two end-stops per axis and two
//! floor indicators on the center mechanism.

use embryo_hal::PinId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::axis::AxisId;

/// First ESP32 GPIO without output drivers (34..=39 are input-only)
pub const FIRST_INPUT_ONLY_PIN: PinId = 34;

/// Last ESP32 GPIO without output drivers
pub const LAST_INPUT_ONLY_PIN: PinId = 39;

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinConfig {
    /// GPIO number
    pub pin: PinId,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    ///
    /// The board applies this when it configures the input, before the
    /// pin reaches [`embryo_hal::PinBank`]; the firmware never switches
    /// pulls at runtime. GPIO 34..=39 have no pull-up and reject it.
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: PinId) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: PinId) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create an inverted pin with the internal pull-up enabled
    ///
    /// Normally-open switch to ground.
    pub const fn inverted_with_pullup(pin: PinId) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }

    /// Electrical level that asserts this pin
    pub const fn active_level(&self) -> bool {
        !self.inverted
    }

    /// Whether an electrical level means "asserted"
    pub const fn is_active(&self, level: bool) -> bool {
        level != self.inverted
    }
}

/// Whether a GPIO is input-only on the ESP32
pub const fn is_input_only(pin: PinId) -> bool {
    pin >= FIRST_INPUT_ONLY_PIN && pin <= LAST_INPUT_ONLY_PIN
}

/// Pins of one stepper axis
///
/// `min_switch` closes at the end reached by stepping in reverse
/// (direction pin inactive), `max_switch` at the end reached stepping
/// forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisPins {
    /// Step pulse pin (TB6600 PUL)
    pub step: PinConfig,
    /// Direction pin (TB6600 DIR)
    pub dir: PinConfig,
    /// Enable pin (TB6600 ENA, active-low)
    pub enable: PinConfig,
    /// End-stop at the reverse end of travel
    pub min_switch: PinConfig,
    /// End-stop at the forward end of travel
    pub max_switch: PinConfig,
}

/// Serial link to the display panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayLinkConfig {
    /// UART RX pin
    pub uart_rx_pin: PinId,
    /// UART TX pin
    pub uart_tx_pin: PinId,
    /// Baud rate
    pub baud_rate: u32,
}

impl Default for DisplayLinkConfig {
    fn default() -> Self {
        Self {
            uart_rx_pin: 16,
            uart_tx_pin: 17,
            baud_rate: 115_200,
        }
    }
}

/// Complete board pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PinMap {
    /// Center mechanism motor and its left/right end-stops
    pub center: AxisPins,
    /// Left tower motor and its lower/upper end-stops
    pub left_tower: AxisPins,
    /// Right tower motor and its lower/upper end-stops
    pub right_tower: AxisPins,
    /// Center mechanism floor indicator, right side
    pub floor_right: PinConfig,
    /// Center mechanism floor indicator, left side
    pub floor_left: PinConfig,
    /// Optical egg presence sensor
    pub egg_sensor: PinConfig,
    /// Light-dependent resistor (ADC)
    pub ldr_pin: PinId,
    /// Display serial link
    pub display: DisplayLinkConfig,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            center: AxisPins {
                step: PinConfig::new(12),
                dir: PinConfig::new(13),
                enable: PinConfig::inverted(15),
                // FIM_CURSO_CENTRO_1 marks the left position
                min_switch: PinConfig::inverted_with_pullup(18),
                max_switch: PinConfig::inverted_with_pullup(19),
            },
            left_tower: AxisPins {
                step: PinConfig::new(32),
                dir: PinConfig::new(33),
                enable: PinConfig::inverted(14),
                // 36/39 have no internal pull-ups; the board carries them
                min_switch: PinConfig::inverted(39),
                max_switch: PinConfig::inverted(36),
            },
            right_tower: AxisPins {
                step: PinConfig::new(25),
                dir: PinConfig::new(26),
                enable: PinConfig::inverted(27),
                min_switch: PinConfig::inverted(35),
                max_switch: PinConfig::inverted(34),
            },
            floor_right: PinConfig::inverted_with_pullup(4),
            floor_left: PinConfig::inverted_with_pullup(5),
            egg_sensor: PinConfig::new(23),
            ldr_pin: 2,
            display: DisplayLinkConfig::default(),
        }
    }
}

impl PinMap {
    /// Pins of a stepper axis
    pub fn axis(&self, axis: AxisId) -> &AxisPins {
        match axis {
            AxisId::Center => &self.center,
            AxisId::LeftTower => &self.left_tower,
            AxisId::RightTower => &self.right_tower,
        }
    }

    /// Pins the firmware drives
    pub fn outputs(&self) -> [PinId; 10] {
        let [c, l, r] = [&self.center, &self.left_tower, &self.right_tower];
        [
            c.step.pin,
            c.dir.pin,
            c.enable.pin,
            l.step.pin,
            l.dir.pin,
            l.enable.pin,
            r.step.pin,
            r.dir.pin,
            r.enable.pin,
            self.display.uart_tx_pin,
        ]
    }

    /// Pins the firmware only reads
    pub fn inputs(&self) -> [PinId; 11] {
        let [c, l, r] = [&self.center, &self.left_tower, &self.right_tower];
        [
            c.min_switch.pin,
            c.max_switch.pin,
            l.min_switch.pin,
            l.max_switch.pin,
            r.min_switch.pin,
            r.max_switch.pin,
            self.floor_right.pin,
            self.floor_left.pin,
            self.egg_sensor.pin,
            self.ldr_pin,
            self.display.uart_rx_pin,
        ]
    }

    /// First pin assigned to more than one role, if any
    pub fn find_duplicate(&self) -> Option<PinId> {
        let outputs = self.outputs();
        let inputs = self.inputs();
        let mut all = outputs.iter().chain(inputs.iter()).enumerate();
        all.find_map(|(i, pin)| {
            outputs
                .iter()
                .chain(inputs.iter())
                .skip(i + 1)
                .any(|other| other == pin)
                .then_some(*pin)
        })
    }

    /// Inputs the board must configure with the internal pull-up
    pub fn pull_up_inputs(&self) -> impl Iterator<Item = PinId> + '_ {
        let [c, l, r] = [&self.center, &self.left_tower, &self.right_tower];
        [
            c.min_switch,
            c.max_switch,
            l.min_switch,
            l.max_switch,
            r.min_switch,
            r.max_switch,
            self.floor_right,
            self.floor_left,
            self.egg_sensor,
        ]
        .into_iter()
        .filter(|pin| pin.pull_up)
        .map(|pin| pin.pin)
    }

    /// First pull-up requested on a GPIO without one, if any
    pub fn find_unsupported_pull_up(&self) -> Option<PinId> {
        self.pull_up_inputs().find(|pin| is_input_only(*pin))
    }

    /// First output assigned to an input-only GPIO, if any
    pub fn find_input_only_output(&self) -> Option<PinId> {
        self.outputs().into_iter().find(|pin| is_input_only(*pin))
    }
}
