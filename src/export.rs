//! Frame exporters for downstream consumers.

use std::io::{self, Write};

use byteordered::ByteOrdered;
use itertools::iproduct;

use crate::frame::ThermalFrame;

/// CSV dump: header `X,Y,Temperature_C`, one row per pixel in
/// row-major scan order, temperatures to two decimal places.
pub fn write_csv<W: Write>(frame: &ThermalFrame, mut out: W) -> io::Result<()> {
    writeln!(out, "X,Y,Temperature_C")?;
    let temperatures = frame.temperatures();
    for (y, x) in iproduct!(0..frame.height(), 0..frame.width()) {
        writeln!(out, "{},{},{:.2}", x, y, temperatures[(y, x)])?;
    }
    Ok(())
}

/// Flat little-endian f32 dump in row-major order.
///
/// Consumers label this export "TIFF" but it carries no TIFF header or
/// IFD — it is a bare float array. The byte layout is load-bearing for
/// existing tooling; do not add a container without coordinating a
/// format change with every consumer.
pub fn write_raw_f32<W: Write>(frame: &ThermalFrame, out: W) -> io::Result<()> {
    let mut out = ByteOrdered::le(out);
    let temperatures = frame.temperatures();
    for (y, x) in iproduct!(0..frame.height(), 0..frame.width()) {
        out.write_f32(temperatures[(y, x)])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ramp_frame;

    #[test]
    fn csv_round_trip_to_two_decimals() {
        let frame = ramp_frame(6, 4);
        let mut buffer = Vec::new();
        write_csv(&frame, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("X,Y,Temperature_C"));

        let mut rows = 0;
        for line in lines {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 3);
            let x: isize = fields[0].parse().unwrap();
            let y: isize = fields[1].parse().unwrap();
            let temp: f64 = fields[2].parse().unwrap();
            let source = frame.temperature_at(x, y).unwrap() as f64;
            assert!(
                (temp - source).abs() <= 0.005 + 1e-9,
                "row {},{}: {} vs {}",
                x,
                y,
                temp,
                source
            );
            rows += 1;
        }
        assert_eq!(rows, 6 * 4);
    }

    #[test]
    fn csv_scans_row_major() {
        let frame = ramp_frame(3, 2);
        let mut buffer = Vec::new();
        write_csv(&frame, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let coords: Vec<&str> = text
            .lines()
            .skip(1)
            .map(|l| &l[..l.rfind(',').unwrap()])
            .collect();
        assert_eq!(coords, ["0,0", "1,0", "2,0", "0,1", "1,1", "2,1"]);
    }

    #[test]
    fn raw_dump_is_headerless_little_endian() {
        let frame = ramp_frame(4, 2);
        let mut buffer = Vec::new();
        write_raw_f32(&frame, &mut buffer).unwrap();
        // No container: exactly width * height * 4 bytes.
        assert_eq!(buffer.len(), 4 * 2 * 4);
        let first = f32::from_le_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]);
        assert_eq!(first, frame.temperature_at(0, 0).unwrap());
        let last_off = buffer.len() - 4;
        let last = f32::from_le_bytes([
            buffer[last_off],
            buffer[last_off + 1],
            buffer[last_off + 2],
            buffer[last_off + 3],
        ]);
        assert_eq!(last, frame.temperature_at(3, 1).unwrap());
    }
}
