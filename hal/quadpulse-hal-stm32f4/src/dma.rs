//! Circular DMA1 streams feeding timer compare registers

use embassy_stm32::pac;
use embassy_stm32::pac::dma::vals::{Dir, Size};

/// One DMA1 stream/channel pair in circular memory-to-peripheral mode
#[derive(Debug, Clone, Copy)]
pub struct CircularStream {
    stream: usize,
    request: u8,
}

impl CircularStream {
    /// DMA1 stream number and its channel selection
    pub const fn new(stream: usize, request: u8) -> Self {
        Self { stream, request }
    }

    /// True while the stream is running
    pub fn is_enabled(&self) -> bool {
        pac::DMA1.st(self.stream).cr().read().en()
    }

    /// Disable the stream and wait for it to release the bus
    pub fn stop(&self) {
        let st = pac::DMA1.st(self.stream);
        st.cr().modify(|w| w.set_en(false));
        while st.cr().read().en() {}
        self.clear_flags();
    }

    /// Start copying `buffer` word by word into `peripheral`, wrapping forever
    ///
    /// `buffer` must stay valid until `stop`.
    pub fn start(&self, peripheral: u32, buffer: &[u32]) {
        let st = pac::DMA1.st(self.stream);
        self.clear_flags();

        st.par().write_value(peripheral);
        st.m0ar().write_value(buffer.as_ptr() as u32);
        st.ndtr().write(|w| w.set_ndt(buffer.len() as u16));
        st.cr().write(|w| {
            w.set_chsel(self.request);
            w.set_dir(Dir::MEMORY_TO_PERIPHERAL);
            w.set_msize(Size::BITS32);
            w.set_psize(Size::BITS32);
            w.set_minc(true);
            w.set_pinc(false);
            w.set_circ(true);
        });
        st.cr().modify(|w| w.set_en(true));
    }

    fn clear_flags(&self) {
        let flag = self.stream % 4;
        pac::DMA1.ifcr(self.stream / 4).write(|w| {
            w.set_tcif(flag, true);
            w.set_htif(flag, true);
            w.set_teif(flag, true);
            w.set_dmeif(flag, true);
            w.set_feif(flag, true);
        });
    }
}
