//! GPIO / peripheral pin assignments for the recon vehicle carrier board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Drive motor (L298N-style H-bridge)
// ---------------------------------------------------------------------------

/// Digital output: bridge input 1 (HIGH with IN2 LOW = forward).
pub const MOTOR_IN1_GPIO: i32 = 13;
/// Digital output: bridge input 2.
pub const MOTOR_IN2_GPIO: i32 = 14;
/// LEDC PWM output driving the bridge enable line.
pub const MOTOR_EN_GPIO: i32 = 15;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT11 single-wire data line (open-drain, external 10 kΩ pull-up).
pub const DHT_DATA_GPIO: i32 = 4;

/// HC-SR04 trigger output.
pub const SONAR_TRIG_GPIO: i32 = 5;
/// HC-SR04 echo input (through a 5 V to 3.3 V divider).
pub const SONAR_ECHO_GPIO: i32 = 6;

/// MQ-2 analog output.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const GAS_ADC_GPIO: i32 = 1;
/// ADC1 channel number for the gas sensor.
pub const GAS_ADC_CHANNEL: u32 = 0;
/// ADC attenuation for the gas sensor (11 dB, 0 - 3.1 V).
pub const GAS_ADC_ATTEN: u32 = 3;

// ---------------------------------------------------------------------------
// I2C bus (MPU6050 + PCF8574 LCD backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 16;
pub const I2C_SCL_GPIO: i32 = 17;
/// I2C controller index.
pub const I2C_PORT: i32 = 0;
/// Bus clock.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// MPU6050 address with AD0 tied low.
pub const MPU6050_ADDR: u8 = 0x68;
/// PCF8574 backpack address on the 16x2 module.
pub const LCD_ADDR: u8 = 0x27;

// ---------------------------------------------------------------------------
// Status indicator (discrete common-cathode RGB)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 10;
pub const LED_G_GPIO: i32 = 11;
pub const LED_B_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// Buzzer / remote
// ---------------------------------------------------------------------------

/// Passive piezo buzzer, driven by a dedicated LEDC timer.
pub const BUZZER_GPIO: i32 = 9;

/// 38 kHz IR demodulator output (active low).
pub const IR_RECV_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// LEDC channel / timer allocation
// ---------------------------------------------------------------------------

pub const LEDC_CH_MOTOR: u32 = 0;
pub const LEDC_CH_LED_R: u32 = 1;
pub const LEDC_CH_LED_G: u32 = 2;
pub const LEDC_CH_LED_B: u32 = 3;
pub const LEDC_CH_BUZZER: u32 = 4;

/// Shared by the motor and the RGB indicator.
pub const LEDC_TIMER_PWM: u32 = 0;
/// Buzzer timer; its frequency is retuned per tone.
pub const LEDC_TIMER_TONE: u32 = 1;

/// PWM frequency for motor and LED channels.
pub const PWM_FREQ_HZ: u32 = 1_000;
/// 8-bit duty resolution for motor/LED channels.
pub const PWM_DUTY_MAX: u16 = 255;

// ---------------------------------------------------------------------------
// Collector link
// ---------------------------------------------------------------------------

/// UART carrying telemetry out and handshake / echo lines in.
pub const COLLECTOR_UART: i32 = 0;
pub const COLLECTOR_BAUD: u32 = 115_200;
/// Driver receive ring size in bytes.
pub const COLLECTOR_RX_BUF: i32 = 512;
