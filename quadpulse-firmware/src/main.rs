//! QuadPulse - Four Channel Pulse Stimulator Firmware
//!
//! Main firmware binary for STM32F407-based stimulator boards. Generates
//! four synchronized pulse outputs and a bipolar bias level, driven from a
//! front panel (encoder, four buttons, OLED, status LEDs) or from a host
//! over a framed serial link.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::exti::{self, ExtiInput};
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pull, Speed};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::interrupt;
use embassy_stm32::peripherals::USART3;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::usart::{self, BufferedUart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use quadpulse_core::config::DeviceConfig;
use quadpulse_core::waveform::SEQUENCE_LEN;
use quadpulse_drivers::controller::Controller;
use quadpulse_drivers::indicator::NeopixelSequencer;
use quadpulse_drivers::input::{Buttons, InputScanner};
use quadpulse_drivers::waveform::WaveformEngine;
use quadpulse_hal_stm32f4::{OutputTimers, SequenceBuffers, UartConfig};

use crate::oled::OledStatus;
use crate::tasks::control::LedFrameStream;

mod channels;
mod oled;
mod tasks;

bind_interrupts!(struct Irqs {
    USART3 => usart::BufferedInterruptHandler<USART3>;
    EXTI0 => exti::InterruptHandler<interrupt::typelevel::EXTI0>;
    EXTI1 => exti::InterruptHandler<interrupt::typelevel::EXTI1>;
});

/// APB1 timer clock feeding TIM2 and TIM5
const TIMER_CLOCK_HZ: u32 = 80_000_000;

/// LED chain bit rate (one PWM period per bit)
const LED_BIT_HZ: u32 = 666_667;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Compare sequences read by DMA while the outputs run
static SEQUENCE_BUFFERS: StaticCell<SequenceBuffers> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("QuadPulse firmware starting...");

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    let config = DeviceConfig::default();
    if let Err(e) = config.validate() {
        error!("Invalid device config: {:?}", e);
    }

    // TIM2, TIM5, TIM8, DAC1, DMA1 streams 0/1/4/7 and their pins are
    // programmed by OutputTimers through the PAC
    let _ = (
        p.TIM2, p.TIM5, p.TIM8, p.DAC1, p.DMA1_CH0, p.DMA1_CH1, p.DMA1_CH4, p.DMA1_CH7, p.PA0,
        p.PA1, p.PA2, p.PA4, p.PB10, p.PB11,
    );

    // Output relays (PD12, PD13)
    let relay_out1 = Output::new(p.PD12, Level::Low, Speed::Low);
    let relay_out2 = Output::new(p.PD13, Level::Low, Speed::Low);

    let buffers = SEQUENCE_BUFFERS.init([[0; SEQUENCE_LEN]; 4]);
    let timers = unwrap!(OutputTimers::new(
        relay_out1,
        relay_out2,
        buffers,
        TIMER_CLOCK_HZ
    ));
    let engine = WaveformEngine::new(timers, config.bias_full_scale_centivolts);

    info!("Output timers initialized");

    let controller = Controller::new(
        engine,
        NeopixelSequencer::new(&channels::LED_TX),
        LedFrameStream,
        &config,
    );

    // Host link on USART3 (PD8=TX, PD9=RX)
    let uart_config = UartConfig {
        baudrate: config.serial_baud,
    };
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = unwrap!(BufferedUart::new(
        p.USART3,
        p.PD9,
        p.PD8,
        tx_buf,
        rx_buf,
        Irqs,
        uart_config.to_embassy(),
    ));
    let (tx, rx) = uart.split();

    info!("UART initialized for host communication");

    // Front panel: encoder on PE0/PE1, buttons on PE2-PE5 (active low)
    let enc_a = ExtiInput::new(p.PE0, p.EXTI0, Pull::Up, Irqs);
    let enc_b = ExtiInput::new(p.PE1, p.EXTI1, Pull::Up, Irqs);

    let buttons = Buttons::new(
        Input::new(p.PE2, Pull::Up),
        Input::new(p.PE3, Pull::Up),
        Input::new(p.PE4, Pull::Up),
        Input::new(p.PE5, Pull::Up),
    );
    let scanner = InputScanner::new(buttons, &channels::ROTATION);

    // Status LED chain on TIM1 CH1 (PA8), fed by the TIM1_UP DMA
    let led_pin = PwmPin::new(p.PA8, OutputType::PushPull);
    let pwm = SimplePwm::new(
        p.TIM1,
        Some(led_pin),
        None,
        None,
        None,
        Hertz(LED_BIT_HZ),
        CountingMode::EdgeAlignedUp,
    );

    // OLED on I2C1 (PB6=SCL, PB7=SDA)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = Hertz(400_000);
    let i2c = I2c::new_blocking(p.I2C1, p.PB6, p.PB7, i2c_config);

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner.spawn(tasks::encoder_task(enc_a, enc_b)).unwrap();
    spawner.spawn(tasks::led_task(pwm, p.DMA2_CH5)).unwrap();

    match OledStatus::new(i2c) {
        Ok(display) => {
            info!("OLED initialized");
            spawner
                .spawn(tasks::display_task(display, config.display_period_ms))
                .unwrap();
        }
        Err(e) => {
            // The stimulator stays usable from the host without a panel
            error!("Failed to initialize display: {:?}", e);
        }
    }

    spawner
        .spawn(tasks::control_task(controller, scanner, config))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// 8 MHz HSE, 160 MHz SYSCLK, APB1 40 MHz (80 MHz timers), APB2 80 MHz
fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV8,
        mul: PllMul::MUL320,
        divp: Some(PllPDiv::DIV2),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.sys = Sysclk::PLL1_P;
    config
}
