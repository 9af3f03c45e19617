//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                    |
//! |-------------|---------------|--------------------------------|
//! | `hardware`  | SensorPort    | ESP32 ADC1 (oneshot)           |
//! |             | ActuatorPort  | Heater MOSFET GPIO             |
//! |             | PowerPort     | esp_timer tick + light sleep   |
//! | `radio`     | RadioLink     | RN2483 over a `SerialLine`     |
//! | `serial`    | SerialLine    | ESP-IDF UART driver            |
//! | `log_sink`  | EventSink     | Serial log output              |

pub mod hardware;
pub mod log_sink;
pub mod radio;
#[cfg(target_os = "espidf")]
pub mod serial;
