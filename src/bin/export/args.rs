use std::path::PathBuf;

use anyhow::Result;
use clap::value_t_or_exit;
use rjpeg::{arg, args_parser, opt};

pub struct Args {
    pub path: PathBuf,
    pub csv: Option<PathBuf>,
    pub raw: Option<PathBuf>,
    pub threshold: Option<u8>,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("rjpeg-export")
            .about("Decode an R-JPEG and export its temperature matrix.")
            .arg(opt!("csv").help("Write X,Y,Temperature_C rows to this path"))
            .arg(
                opt!("raw")
                    .help("Write the flat little-endian f32 dump to this path"),
            )
            .arg(
                opt!("threshold")
                    .short("t")
                    .help("Also report the hot-pixel count at this threshold (0-255)"),
            )
            .arg(arg!("image").required(true).help("R-JPEG path"))
            .get_matches();

        let path = value_t_or_exit!(matches, "image", PathBuf);
        let csv = matches
            .is_present("csv")
            .then(|| value_t_or_exit!(matches.value_of("csv"), PathBuf));
        let raw = matches
            .is_present("raw")
            .then(|| value_t_or_exit!(matches.value_of("raw"), PathBuf));
        let threshold = matches
            .is_present("threshold")
            .then(|| value_t_or_exit!(matches.value_of("threshold"), u8));

        Ok(Args {
            path,
            csv,
            raw,
            threshold,
        })
    }
}
