//! One-shot hardware peripheral initialization.
//!
//! Configures ADC, GPIO directions, LEDC timers/channels, the I2C master
//! and the collector UART using raw ESP-IDF sys calls.  Called once from `main()` before
//! the control loop starts.  On host builds every accessor is a no-op so
//! the driver layer above still links and runs against the simulator.
//!
//! The small newtypes at the bottom ([`GpioOutput`], [`LedcChannel`],
//! [`BusyDelay`], [`LedcTone`], [`I2cLcdBus`]) adapt these accessors to the
//! embedded-hal traits the drivers are generic over.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::drivers::buzzer::ToneOutput;
use crate::drivers::display::LcdBus;
use crate::error::ActuatorError;
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    I2cInitFailed(i32),
    IsrInstallFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc) => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::I2cInitFailed(rc) => write!(f, "I2C master install failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::UartInitFailed(rc) => write!(f, "collector UART install failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_inputs()?;
        init_gpio_outputs()?;
        init_dht_line()?;
        init_ledc()?;
        init_i2c()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
fn check(ret: i32, err: fn(i32) -> HwInitError) -> Result<(), HwInitError> {
    if ret == ESP_OK as i32 { Ok(()) } else { Err(err(ret)) }
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the init path or the main-loop ADC
/// read path.  `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    check(ret, HwInitError::AdcInitFailed)?;

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: pins::GAS_ADC_ATTEN,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::GAS_ADC_CHANNEL, &chan_cfg) };
    check(ret, HwInitError::AdcInitFailed)?;

    info!("hw_init: ADC1 configured (CH{}=gas)", pins::GAS_ADC_CHANNEL);
    Ok(())
}

/// One 12-bit conversion, `None` if the driver reports an error.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Option<u16> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return None;
    }
    Some(raw.clamp(0, 4095) as u16)
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> Option<u16> {
    Some(0)
}

// ── GPIO ─────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    let sonar_echo = gpio_config_t {
        pin_bit_mask: 1u64 << pins::SONAR_ECHO_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    check(unsafe { gpio_config(&sonar_echo) }, HwInitError::GpioConfigFailed)?;

    let ir = gpio_config_t {
        pin_bit_mask: 1u64 << pins::IR_RECV_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
    };
    check(unsafe { gpio_config(&ir) }, HwInitError::GpioConfigFailed)?;

    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [pins::SONAR_TRIG_GPIO, pins::MOTOR_IN1_GPIO, pins::MOTOR_IN2_GPIO];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        check(unsafe { gpio_config(&cfg) }, HwInitError::GpioConfigFailed)?;
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

/// The DHT11 line is driven low by the host to start a frame and then
/// released; open-drain input/output lets both happen without
/// reconfiguring the pin.
#[cfg(target_os = "espidf")]
unsafe fn init_dht_line() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::DHT_DATA_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    check(unsafe { gpio_config(&cfg) }, HwInitError::GpioConfigFailed)?;
    unsafe { gpio_set_level(pins::DHT_DATA_GPIO, 1) };
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: register read on an already-configured pin.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init; main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), HwInitError> {
    // Timer 0: motor enable + RGB indicator (1 kHz, 8-bit)
    let pwm_timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: pins::LEDC_TIMER_PWM,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&pwm_timer) }, HwInitError::LedcInitFailed)?;

    // Timer 1: buzzer, retuned per tone step (10-bit for audio range)
    let tone_timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: pins::LEDC_TIMER_TONE,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
        freq_hz: 1_000,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    check(unsafe { ledc_timer_config(&tone_timer) }, HwInitError::LedcInitFailed)?;

    let channels = [
        (pins::LEDC_CH_MOTOR, pins::MOTOR_EN_GPIO, pins::LEDC_TIMER_PWM),
        (pins::LEDC_CH_LED_R, pins::LED_R_GPIO, pins::LEDC_TIMER_PWM),
        (pins::LEDC_CH_LED_G, pins::LED_G_GPIO, pins::LEDC_TIMER_PWM),
        (pins::LEDC_CH_LED_B, pins::LED_B_GPIO, pins::LEDC_TIMER_PWM),
        (pins::LEDC_CH_BUZZER, pins::BUZZER_GPIO, pins::LEDC_TIMER_TONE),
    ];
    for (channel, gpio, timer) in channels {
        let cfg = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: timer,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        check(unsafe { ledc_channel_config(&cfg) }, HwInitError::LedcInitFailed)?;
    }

    info!("hw_init: LEDC configured (motor=CH0, led=CH1-3, buzzer=CH4)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u16) {
    // SAFETY: channel configured in init_ledc(); main-loop only.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u16) {}

/// Retune the buzzer timer and drive a 50 % square wave.  `0` silences.
#[cfg(target_os = "espidf")]
pub fn ledc_tone(freq_hz: u32) {
    // SAFETY: buzzer timer/channel configured in init_ledc(); main-loop only.
    unsafe {
        if freq_hz == 0 {
            ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::LEDC_CH_BUZZER, 0);
        } else {
            ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::LEDC_TIMER_TONE, freq_hz);
            ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::LEDC_CH_BUZZER, 512);
        }
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, pins::LEDC_CH_BUZZER);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_tone(_freq_hz: u32) {}

// ── I2C master ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const I2C_TIMEOUT_TICKS: u32 = 10;

#[cfg(target_os = "espidf")]
unsafe fn init_i2c() -> Result<(), HwInitError> {
    let cfg = i2c_config_t {
        mode: i2c_mode_t_I2C_MODE_MASTER,
        sda_io_num: pins::I2C_SDA_GPIO,
        scl_io_num: pins::I2C_SCL_GPIO,
        sda_pullup_en: true,
        scl_pullup_en: true,
        __bindgen_anon_1: i2c_config_t__bindgen_ty_1 {
            master: i2c_config_t__bindgen_ty_1__bindgen_ty_1 {
                clk_speed: pins::I2C_FREQ_HZ,
            },
        },
        clk_flags: 0,
    };
    check(unsafe { i2c_param_config(pins::I2C_PORT, &cfg) }, HwInitError::I2cInitFailed)?;
    check(
        unsafe { i2c_driver_install(pins::I2C_PORT, i2c_mode_t_I2C_MODE_MASTER, 0, 0, 0) },
        HwInitError::I2cInitFailed,
    )?;
    info!("hw_init: I2C{} master at {} Hz", pins::I2C_PORT, pins::I2C_FREQ_HZ);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn i2c_write(addr: u8, bytes: &[u8]) -> Result<(), i32> {
    // SAFETY: driver installed in init_i2c(); buffer outlives the call.
    let ret = unsafe {
        i2c_master_write_to_device(pins::I2C_PORT, addr, bytes.as_ptr(), bytes.len(), I2C_TIMEOUT_TICKS)
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write(_addr: u8, _bytes: &[u8]) -> Result<(), i32> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn i2c_write_read(addr: u8, wr: &[u8], rd: &mut [u8]) -> Result<(), i32> {
    // SAFETY: driver installed in init_i2c(); both buffers outlive the call.
    let ret = unsafe {
        i2c_master_write_read_device(
            pins::I2C_PORT,
            addr,
            wr.as_ptr(),
            wr.len(),
            rd.as_mut_ptr(),
            rd.len(),
            I2C_TIMEOUT_TICKS,
        )
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn i2c_write_read(_addr: u8, _wr: &[u8], rd: &mut [u8]) -> Result<(), i32> {
    rd.fill(0);
    Ok(())
}

// ── Collector UART ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let cfg = uart_config_t {
        baud_rate: pins::COLLECTOR_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    check(unsafe { uart_param_config(pins::COLLECTOR_UART, &cfg) }, HwInitError::UartInitFailed)?;
    check(
        unsafe {
            uart_driver_install(
                pins::COLLECTOR_UART,
                pins::COLLECTOR_RX_BUF,
                0,
                0,
                core::ptr::null_mut(),
                0,
            )
        },
        HwInitError::UartInitFailed,
    )?;
    info!("hw_init: UART{} at {} baud", pins::COLLECTOR_UART, pins::COLLECTOR_BAUD);
    Ok(())
}

/// Blocking write into the UART TX FIFO.  Returns the driver error code.
#[cfg(target_os = "espidf")]
pub fn uart_write(bytes: &[u8]) -> Result<(), i32> {
    // SAFETY: driver installed in init_uart(); buffer outlives the call.
    let n = unsafe { uart_write_bytes(pins::COLLECTOR_UART, bytes.as_ptr().cast(), bytes.len()) };
    if n < 0 { Err(n) } else { Ok(()) }
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_write(_bytes: &[u8]) -> Result<(), i32> {
    Ok(())
}

/// One byte from the RX ring without waiting.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: driver installed in init_uart(); zero ticks never blocks.
    let n = unsafe { uart_read_bytes(pins::COLLECTOR_UART, (&raw mut byte).cast(), 1, 0) };
    (n == 1).then_some(byte)
}

#[cfg(not(target_os = "espidf"))]
pub fn uart_read_byte() -> Option<u8> {
    None
}

// ── Time ─────────────────────────────────────────────────────

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    // SAFETY: esp_timer_get_time is a counter read, callable from any context.
    (unsafe { esp_timer_get_time() }).max(0) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    0
}

#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM busy-wait, no shared state.
    unsafe { esp_rom_delay_us(us) };
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ir_gpio_isr(_arg: *mut core::ffi::c_void) {
    crate::drivers::remote::remote_edge_isr(uptime_us() as u32);
}

/// Install the per-pin GPIO ISR service and hook the IR receiver.
/// Call after init_peripherals() and before the control loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<(), HwInitError> {
    // SAFETY: ESP_ERR_INVALID_STATE means the service is already installed.
    // The handler only writes the lock-free edge ring.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        gpio_isr_handler_add(pins::IR_RECV_GPIO, Some(ir_gpio_isr), core::ptr::null_mut());
        gpio_intr_enable(pins::IR_RECV_GPIO);
    }
    info!("hw_init: ISR service installed (ir)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

// ── embedded-hal adapters ─────────────────────────────────────

/// Push-pull output configured in [`init_peripherals`].
#[derive(Debug, Clone, Copy)]
pub struct GpioOutput(pub i32);

impl digital::ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.0, true);
        Ok(())
    }
}

/// One 8-bit LEDC channel on the shared PWM timer.
#[derive(Debug, Clone, Copy)]
pub struct LedcChannel(pub u32);

impl pwm::ErrorType for LedcChannel {
    type Error = Infallible;
}

impl SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        pins::PWM_DUTY_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        ledc_set(self.0, duty.min(pins::PWM_DUTY_MAX));
        Ok(())
    }
}

/// ROM busy-wait delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct BusyDelay;

impl DelayNs for BusyDelay {
    fn delay_ns(&mut self, ns: u32) {
        delay_us(ns.div_ceil(1_000));
    }
}

/// Buzzer output on the dedicated tone timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedcTone;

impl ToneOutput for LedcTone {
    fn start_tone(&mut self, freq_hz: u32) {
        ledc_tone(freq_hz);
    }

    fn stop_tone(&mut self) {
        ledc_tone(0);
    }
}

/// PCF8574 expander behind the LCD, addressed over the shared I2C master.
#[derive(Debug, Clone, Copy)]
pub struct I2cLcdBus {
    pub addr: u8,
}

impl LcdBus for I2cLcdBus {
    fn write(&mut self, byte: u8) -> Result<(), ActuatorError> {
        i2c_write(self.addr, &[byte]).map_err(|_| ActuatorError::DisplayWriteFailed)
    }
}
