mod args;

use std::{fs::File, io::BufWriter};

use anyhow::{Context, Result};

use rjpeg::dji::RJpegDecoder;
use rjpeg::{export, threshold, ThermalFrame};

use args::Args;

fn main() -> Result<()> {
    let args = Args::from_cmd_line()?;

    let frame = ThermalFrame::load_with(&args.path, &RJpegDecoder)
        .with_context(|| format!("loading {}", args.path.display()))?;

    eprintln!(
        "{}: {}x{}, {:.2}..{:.2} C (mean {:.2})",
        args.path.display(),
        frame.width(),
        frame.height(),
        frame.stats.min,
        frame.stats.max,
        frame.stats.mean(),
    );

    if let Some(csv_path) = &args.csv {
        let out = BufWriter::new(File::create(csv_path)?);
        export::write_csv(&frame, out).with_context(|| format!("writing {}", csv_path.display()))?;
    }

    if let Some(raw_path) = &args.raw {
        let out = BufWriter::new(File::create(raw_path)?);
        export::write_raw_f32(&frame, out)
            .with_context(|| format!("writing {}", raw_path.display()))?;
    }

    if let Some(value) = args.threshold {
        let mask = threshold::hot_pixel_mask(&frame, value);
        let hot = mask.as_array().iter().filter(|&&v| v == 255).count();
        println!(
            "{} hot pixels of {} at threshold {}",
            hot,
            frame.width() * frame.height(),
            value
        );
    }

    Ok(())
}
