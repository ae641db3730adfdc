//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                      |
//! |------------|--------------------|----------------------------------|
//! | `hardware` | SensorPort         | DHT11, MQ-2, HC-SR04, MPU6050    |
//! |            | ActuatorPort       | H-bridge, RGB LED, buzzer, LCD   |
//! |            | RemotePort         | NEC IR receiver                  |
//! | `log_sink` | EventSink          | `log` facade                     |
//! | `serial`   | SerialPort         | Board UART / simulated collector |
//! | `time`     | (clock)            | ESP32 system timer / `Instant`   |

pub mod hardware;
pub mod log_sink;
pub mod serial;
pub mod time;
