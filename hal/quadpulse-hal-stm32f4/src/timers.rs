//! Output timer block for the STM32F4
//!
//! TIM8 is the master. Its TRGO fires when it is enabled and starts TIM5
//! (outputs 1-3) and TIM2 (output 4) in trigger mode, so all channels share
//! tick 0. Output 1 is PWM on TIM5 CH1; outputs 2 and 3 (TIM5 CH2/CH3) and
//! both halves of output 4 (TIM2 CH3/CH4) toggle on compare match, with
//! DMA reloading the compare register from a circular `[rise, fall]`
//! buffer after every match. DAC1 channel 1 sets the output 4 level.
//!
//! Both 32-bit timers tick at 10 MHz.
//!
//! | Signal | Timer | Pin | DMA1 |
//! |--------|-------|-----|------|
//! | Out 1 | TIM5 CH1 | PA0 | - |
//! | Out 2 | TIM5 CH2 | PA1 | S4 C6 |
//! | Out 3 | TIM5 CH3 | PA2 | S0 C6 |
//! | Out 4 negative | TIM2 CH3 | PB10 | S1 C3 |
//! | Out 4 positive | TIM2 CH4 | PB11 | S7 C3 |
//! | Bias level | DAC1 CH1 | PA4 | - |

use embassy_stm32::gpio::Output;
use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals::{Moder, Ospeedr};
use embassy_stm32::pac::timer::vals::{Mms, Ocm, Sms, Ts};

use quadpulse_core::traits::{HardwareError, SequenceChannel, WaveformHardware};
use quadpulse_core::waveform::{VoltageRange, DAC_MAX_CODE, SEQUENCE_LEN};

use crate::dma::CircularStream;

/// Output timer tick rate
pub const TIMER_TICK_HZ: u32 = 10_000_000;

/// Sequence buffers handed to the DMA streams
pub type SequenceBuffers = [[u32; SEQUENCE_LEN]; 4];

/// Compare channel index on its timer (0-based)
fn compare_index(channel: SequenceChannel) -> usize {
    match channel {
        SequenceChannel::Out2 => 1,
        SequenceChannel::Out3 => 2,
        SequenceChannel::Out4Negative => 2,
        SequenceChannel::Out4Positive => 3,
    }
}

fn timer(channel: SequenceChannel) -> pac::timer::TimGp32 {
    match channel {
        SequenceChannel::Out2 | SequenceChannel::Out3 => pac::TIM5,
        SequenceChannel::Out4Negative | SequenceChannel::Out4Positive => pac::TIM2,
    }
}

fn stream(channel: SequenceChannel) -> CircularStream {
    match channel {
        SequenceChannel::Out2 => CircularStream::new(4, 6),
        SequenceChannel::Out3 => CircularStream::new(0, 6),
        SequenceChannel::Out4Negative => CircularStream::new(1, 3),
        SequenceChannel::Out4Positive => CircularStream::new(7, 3),
    }
}

fn buffer_index(channel: SequenceChannel) -> usize {
    match channel {
        SequenceChannel::Out2 => 0,
        SequenceChannel::Out3 => 1,
        SequenceChannel::Out4Negative => 2,
        SequenceChannel::Out4Positive => 3,
    }
}

/// Register-level implementation of `WaveformHardware`
///
/// Owns TIM2, TIM5, TIM8, DAC1 and DMA1 streams 0, 1, 4 and 7. The
/// firmware must not hand these to any other driver.
pub struct OutputTimers {
    relay_out1: Output<'static>,
    relay_out2: Output<'static>,
    buffers: &'static mut SequenceBuffers,
    timer_clock_hz: u32,
}

impl OutputTimers {
    /// Claim the timers and park every output low
    ///
    /// `timer_clock_hz` is the APB1 timer clock feeding TIM2 and TIM5.
    pub fn new(
        relay_out1: Output<'static>,
        relay_out2: Output<'static>,
        buffers: &'static mut SequenceBuffers,
        timer_clock_hz: u32,
    ) -> Result<Self, HardwareError> {
        if timer_clock_hz < TIMER_TICK_HZ || timer_clock_hz % TIMER_TICK_HZ != 0 {
            return Err(HardwareError::InvalidValue);
        }

        let mut timers = Self {
            relay_out1,
            relay_out2,
            buffers,
            timer_clock_hz,
        };
        timers.init();
        Ok(timers)
    }

    fn init(&mut self) {
        pac::RCC.apb1enr().modify(|w| {
            w.set_tim2en(true);
            w.set_tim5en(true);
            w.set_dacen(true);
        });
        pac::RCC.apb2enr().modify(|w| w.set_tim8en(true));
        pac::RCC.ahb1enr().modify(|w| {
            w.set_gpioaen(true);
            w.set_gpioben(true);
            w.set_dma1en(true);
        });

        // TIM5 CH1-3 on PA0-PA2 (AF2), TIM2 CH3/CH4 on PB10/PB11 (AF1)
        for pin in 0..3 {
            set_alternate(pac::GPIOA, pin, 2);
        }
        set_alternate(pac::GPIOB, 10, 1);
        set_alternate(pac::GPIOB, 11, 1);
        pac::GPIOA.moder().modify(|w| w.set_moder(4, Moder::ANALOG));

        // Master: TRGO on enable
        pac::TIM8.cr2().modify(|w| w.set_mms(Mms::ENABLE));

        let prescaler = (self.timer_clock_hz / TIMER_TICK_HZ - 1) as u16;
        for (tim, trigger) in [(pac::TIM5, Ts::ITR3), (pac::TIM2, Ts::ITR1)] {
            tim.psc().write_value(prescaler);
            tim.smcr().modify(|w| {
                w.set_ts(trigger);
                w.set_sms(Sms::TRIGGER_MODE);
            });
            // Latch the prescaler
            tim.egr().write(|w| w.set_ug(true));
        }

        self.stop_master();
        self.stop_pulse();
        for channel in SequenceChannel::ALL {
            self.stop_sequence(channel);
        }
        self.stop_bias_level();
        self.reset_counters();
    }
}

fn set_alternate(port: pac::gpio::Gpio, pin: usize, af: u8) {
    port.afr(pin / 8).modify(|w| w.set_afr(pin % 8, af));
    port.ospeedr().modify(|w| w.set_ospeedr(pin, Ospeedr::VERY_HIGH_SPEED));
    port.moder().modify(|w| w.set_moder(pin, Moder::ALTERNATE));
}

impl WaveformHardware for OutputTimers {
    fn stop_master(&mut self) {
        pac::TIM8.cr1().modify(|w| w.set_cen(false));
        // Trigger mode only starts the slaves; stop them explicitly
        pac::TIM5.cr1().modify(|w| w.set_cen(false));
        pac::TIM2.cr1().modify(|w| w.set_cen(false));
    }

    fn stop_pulse(&mut self) {
        pac::TIM5.ccer().modify(|w| w.set_cce(0, false));
        pac::TIM5
            .ccmr_output(0)
            .modify(|w| w.set_ocm(0, Ocm::FORCE_INACTIVE));
    }

    fn stop_sequence(&mut self, channel: SequenceChannel) {
        let tim = timer(channel);
        let index = compare_index(channel);
        tim.dier().modify(|w| w.set_ccde(index, false));
        stream(channel).stop();
        tim.ccer().modify(|w| w.set_cce(index, false));
        tim.ccmr_output(index / 2)
            .modify(|w| w.set_ocm(index % 2, Ocm::FORCE_INACTIVE));
    }

    fn stop_bias_level(&mut self) {
        pac::DAC1.cr().modify(|w| w.set_en(0, false));
    }

    fn reset_counters(&mut self) {
        pac::TIM8.cnt().write(|w| w.set_cnt(0));
        pac::TIM5.cnt().write_value(0);
        pac::TIM2.cnt().write_value(0);
    }

    fn set_output_relays(&mut self, range: VoltageRange) {
        // Relays energized select the 0.45 V range
        match range {
            VoltageRange::Low => {
                self.relay_out1.set_high();
                self.relay_out2.set_high();
            }
            VoltageRange::High => {
                self.relay_out1.set_low();
                self.relay_out2.set_low();
            }
        }
    }

    fn set_bias_level(&mut self, dac_code: u16) -> Result<(), HardwareError> {
        if dac_code > DAC_MAX_CODE {
            return Err(HardwareError::InvalidValue);
        }
        pac::DAC1.dhr12r(0).write(|w| w.set_dhr(dac_code));
        pac::DAC1.cr().modify(|w| w.set_en(0, true));
        Ok(())
    }

    fn set_period(&mut self, period_ticks: u32) -> Result<(), HardwareError> {
        if period_ticks < 2 {
            return Err(HardwareError::InvalidValue);
        }
        for tim in [pac::TIM5, pac::TIM2] {
            tim.arr().write_value(period_ticks - 1);
        }
        Ok(())
    }

    fn start_pulse(&mut self, pulse_ticks: u32) -> Result<(), HardwareError> {
        if pulse_ticks > pac::TIM5.arr().read() {
            return Err(HardwareError::InvalidValue);
        }
        pac::TIM5.ccr(0).write_value(pulse_ticks);
        pac::TIM5.ccmr_output(0).modify(|w| {
            w.set_ocm(0, Ocm::PWM_MODE1);
            w.set_ocpe(0, true);
        });
        pac::TIM5.ccer().modify(|w| w.set_cce(0, true));
        Ok(())
    }

    fn start_sequence(
        &mut self,
        channel: SequenceChannel,
        sequence: &[u32; SEQUENCE_LEN],
    ) -> Result<(), HardwareError> {
        let tim = timer(channel);
        let index = compare_index(channel);
        let dma = stream(channel);
        if dma.is_enabled() {
            return Err(HardwareError::Busy);
        }

        // The first edge is preloaded; DMA feeds every edge after it, so
        // its buffer starts one step into the sequence
        let buffer = &mut self.buffers[buffer_index(channel)];
        buffer[..SEQUENCE_LEN - 1].copy_from_slice(&sequence[1..]);
        buffer[SEQUENCE_LEN - 1] = sequence[0];

        tim.ccr(index).write_value(sequence[0]);
        tim.ccmr_output(index / 2).modify(|w| {
            w.set_ocm(index % 2, Ocm::TOGGLE);
            w.set_ocpe(index % 2, false);
        });

        dma.start(tim.ccr(index).as_ptr() as u32, buffer);
        tim.dier().modify(|w| w.set_ccde(index, true));
        tim.ccer().modify(|w| w.set_cce(index, true));
        Ok(())
    }

    fn start_master(&mut self) {
        pac::TIM8.cr1().modify(|w| w.set_cen(true));
    }
}
