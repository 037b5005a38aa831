use anyhow::Result;
use rjpeg::{arg, args_parser, opt};

pub struct Args {
    pub paths: Vec<String>,
    pub json: bool,
}

impl Args {
    pub fn from_cmd_line() -> Result<Args> {
        let matches = args_parser!("rjpeg-check")
            .about("Validate candidate R-JPEG files and print diagnostic reports.")
            .arg(
                opt!("json")
                    .short("j")
                    .takes_value(false)
                    .help("Emit reports as a JSON array instead of text"),
            )
            .arg(
                arg!("paths")
                    .required(true)
                    .multiple(true)
                    .help("Candidate image paths"),
            )
            .get_matches();

        let paths = matches
            .values_of("paths")
            .unwrap()
            .map(|f| f.into())
            .collect();
        let json = matches.is_present("json");

        Ok(Args { paths, json })
    }
}
