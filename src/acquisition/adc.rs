use crate::config::Attenuation;
use crate::error::Result;

/// One analog input channel
///
/// Reads return raw converter counts, nominally 12-bit (0-4095). Values
/// outside that range are passed through unchanged.
pub trait AnalogChannel: Send {
    /// Apply input attenuation and sample width; called once at startup
    fn configure(&mut self, attenuation: Attenuation) -> Result<()>;

    /// Read one raw sample
    fn read_raw(&mut self) -> Result<u16>;
}

impl<T: AnalogChannel + ?Sized> AnalogChannel for Box<T> {
    fn configure(&mut self, attenuation: Attenuation) -> Result<()> {
        (**self).configure(attenuation)
    }

    fn read_raw(&mut self) -> Result<u16> {
        (**self).read_raw()
    }
}
