mod cli;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::ExitCode;

use archiver_core::{ArchiveDecoder, ArchiveEncoder, ArchiverError, StreamBitSink, StreamBitSource};
use cli::{Commands, CreateArgs, UnzipArgs};
use shared_files::stats::{CompressionStatsBuilder, StatsTimer};

const EXIT_CREATE_FAILURE: u8 = 222;
const EXIT_UNZIP_FAILURE: u8 = 111;
const EXIT_ARGUMENT_FAILURE: u8 = 333;

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    ExitCode::SUCCESS
                }
                _ => ExitCode::from(EXIT_ARGUMENT_FAILURE),
            };
        }
    };

    let failure_code = match args.command {
        Commands::Create(_) => EXIT_CREATE_FAILURE,
        Commands::Unzip(_) => EXIT_UNZIP_FAILURE,
    };
    if let Err(err) = args.validate() {
        eprintln!("error: {err}");
        return ExitCode::from(failure_code);
    }

    match args.command {
        Commands::Create(create_args) => match create_archive(&create_args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(EXIT_CREATE_FAILURE)
            }
        },
        Commands::Unzip(unzip_args) => match unzip_archive(&unzip_args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                ExitCode::from(EXIT_UNZIP_FAILURE)
            }
        },
    }
}

fn create_archive(args: &CreateArgs) -> Result<(), ArchiverError> {
    let mut timer = StatsTimer::new();
    let section = timer.start_section("Encode");

    let archive_file = File::create(&args.archive)?;
    let sink = StreamBitSink::new(BufWriter::new(archive_file));
    let mut encoder = ArchiveEncoder::new(sink);

    let mut original_len = 0usize;
    for path in &args.inputs {
        eprintln!("Compressing {}...", path.display());
        let mut file = File::open(path)?;
        original_len += file.metadata()?.len() as usize;
        let name = file_name_bytes(path);
        encoder.encode_file(&name, &mut file)?;
    }
    let sink = encoder.close()?;
    sink.into_inner()?;

    timer.add_section(section.end());
    let (duration, sections) = timer.end();
    let processed_len = std::fs::metadata(&args.archive)?.len() as usize;

    eprintln!("Done!");
    if args.stats {
        print_stats(
            "Huffman",
            original_len,
            processed_len,
            duration,
            sections,
            true,
        );
    }
    Ok(())
}

fn unzip_archive(args: &UnzipArgs) -> Result<(), ArchiverError> {
    let mut timer = StatsTimer::new();
    let section = timer.start_section("Decode");

    let archive_len = std::fs::metadata(&args.archive)?.len() as usize;
    let archive_file = File::open(&args.archive)?;
    let source = StreamBitSource::new(std::io::BufReader::new(archive_file));
    let mut decoder = ArchiveDecoder::new(source);

    let mut processed_len = 0usize;
    while !decoder.is_done() {
        let mut content = Vec::new();
        let entry = decoder.decode_next(&mut content)?;
        let name = String::from_utf8_lossy(&entry.name).into_owned();
        eprintln!("Extracting {name}...");
        std::fs::write(&name, &content)?;
        processed_len += content.len();
    }

    timer.add_section(section.end());
    let (duration, sections) = timer.end();

    eprintln!("Done!");
    if args.stats {
        print_stats(
            "Huffman",
            archive_len,
            processed_len,
            duration,
            sections,
            false,
        );
    }
    Ok(())
}

fn file_name_bytes(path: &Path) -> Vec<u8> {
    path.file_name()
        .expect("validated input paths always have a file name")
        .to_string_lossy()
        .into_owned()
        .into_bytes()
}

fn print_stats(
    algorithm_name: &'static str,
    original_len: usize,
    processed_len: usize,
    duration: std::time::Duration,
    sections: Vec<shared_files::stats::SectionStats>,
    is_compression: bool,
) {
    let built = CompressionStatsBuilder::new()
        .algorithm_name(algorithm_name)
        .algorithm_id(1)
        .version_used(1)
        .original_len(original_len)
        .processed_len(processed_len)
        .duration(duration)
        .is_compression(is_compression)
        .sections(sections)
        .build();
    match built {
        Ok(stats) => println!("{stats}"),
        Err(err) => eprintln!("could not assemble stats: {err}"),
    }
}
