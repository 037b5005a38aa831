mod args;

use anyhow::{bail, Result};

use args::Args;

fn main() -> Result<()> {
    let Args { paths, json } = Args::from_cmd_line()?;

    #[cfg(feature = "dji")]
    let reports = rjpeg::cli::validate_paths_par(paths, &rjpeg::dji::RJpegDecoder);
    #[cfg(not(feature = "dji"))]
    let reports = rjpeg::cli::heuristic_paths_par(paths);

    if json {
        serde_json::to_writer(std::io::stdout().lock(), &reports)?;
        println!();
    } else {
        for report in &reports {
            println!("{}", report);
        }
    }

    let failed = reports.iter().filter(|r| !r.is_valid).count();
    if failed > 0 {
        bail!("{} of {} files failed validation", failed, reports.len());
    }
    Ok(())
}
