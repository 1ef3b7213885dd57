use hound::{WavSpec, WavWriter};

/// Write raw ADC counts as a stereo capture (left = voltage, right = current)
///
/// `sample_rate` is the acquisition rate, `1_000_000 / sample_interval_us`.
pub fn save_capture(
    filename: &str,
    voltage: &[u16],
    current: &[u16],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(filename, spec)?;

    for (&v, &c) in voltage.iter().zip(current) {
        writer.write_sample(v.min(i16::MAX as u16) as i16)?;
        writer.write_sample(c.min(i16::MAX as u16) as i16)?;
    }

    writer.finalize()?;
    Ok(())
}
