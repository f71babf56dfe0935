#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Verac(verac::Error),
    Io(std::io::Error, IOErrorContext, PathBuf),
    Clap(clap::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => writeln!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Verac(err) => write!(f, "{}", err),
            Error::Clap(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .default_value("out.bin")
                .help("Sets the image file to write"),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .takes_value(true)
                .value_name("NAME")
                .multiple(true)
                .number_of_values(1)
                .help("Adds a named port register (may be repeated)"),
        )
        .arg(
            Arg::with_name("run")
                .short("r")
                .long("run")
                .help("Runs the image to quiescence and prints the final registers"),
        )
        .arg(
            Arg::with_name("passes")
                .long("passes")
                .takes_value(true)
                .value_name("PASSES")
                .default_value("4096")
                .help("Sets the evaluation pass bound for --run"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output").unwrap();
    let ports: Vec<&str> = matches.values_of("port").map_or(Vec::new(), |v| v.collect());
    let run = matches.is_present("run");

    let result = value_t!(matches.value_of("passes"), u32)
        .map_err(Error::Clap)
        .and_then(|passes| verac(input, output, &ports[..], run, passes));

    if let Err(err) = result {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn verac(
    input: &str,
    output: &str,
    ports: &[&str],
    run: bool,
    max_passes: u32,
) -> Result<(), Error> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(input_file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;

    let image = vera::compile(&source, ports)
        .map_err(|err| Error::Verac(verac::Error::Compile(err)))?;

    let output_path = PathBuf::from(output);
    let output_file = File::create(&output_path)
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, output_path.clone()))?;
    BufWriter::new(output_file)
        .write_all(image.bytes())
        .map_err(|err| Error::Io(err, IOErrorContext::WriteOutput, output_path))?;

    if run {
        let mut memory = image.bytes().to_vec();
        let summary = verac::run_image(&mut memory, max_passes).map_err(Error::Verac)?;

        println!("Fired {} rules over {} passes", summary.fired, summary.passes);
        for (index, name) in image.symbols().iter().enumerate() {
            println!("{:>10}  {}", vera::register_value(&memory, index as u32), name);
        }
    }

    Ok(())
}
