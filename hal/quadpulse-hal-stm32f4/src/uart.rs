//! UART settings for the host link

use embassy_stm32::usart::Error as UsartError;

/// Host link baud rate
pub const HOST_BAUD: u32 = 115_200;

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate
    pub baudrate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: HOST_BAUD,
        }
    }
}

impl UartConfig {
    /// Convert into an embassy USART configuration (8N1)
    pub fn to_embassy(self) -> embassy_stm32::usart::Config {
        let mut config = embassy_stm32::usart::Config::default();
        config.baudrate = self.baudrate;
        config
    }
}

/// Error from UART operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// Overrun error
    Overrun,
    /// Parity error
    Parity,
    /// Other error
    Other,
}

impl From<UsartError> for UartBusError {
    fn from(e: UsartError) -> Self {
        match e {
            UsartError::Framing => UartBusError::Framing,
            UsartError::Noise => UartBusError::Noise,
            UsartError::Overrun => UartBusError::Overrun,
            UsartError::Parity => UartBusError::Parity,
            _ => UartBusError::Other,
        }
    }
}

impl UartBusError {
    /// Line errors lose bytes but the stream can continue
    pub fn is_recoverable(self) -> bool {
        !matches!(self, UartBusError::Other)
    }
}
