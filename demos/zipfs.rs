use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::PathBuf;

use anyhow::*;
use log::*;
use memmap2::Mmap;
use structopt::*;

use zipfs::{Metadata, SeekStrategy, ZipArchive, ZipFs};

#[derive(Debug, StructOpt)]
#[structopt(name = "zipfs", about = "Browses a .zip file as if it were a directory")]
struct Opt {
    /// Pass multiple times for additional verbosity (info, debug, trace)
    #[structopt(short, long, parse(from_occurrences))]
    verbosity: usize,

    /// Decompress whole files into memory instead of reopening them to seek
    #[structopt(short, long)]
    buffer: bool,

    #[structopt(name("ZIP file"))]
    zip_path: PathBuf,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Lists a directory
    Ls {
        #[structopt(default_value = "/")]
        path: String,

        /// Lists subdirectories too
        #[structopt(short = "R", long)]
        recursive: bool,
    },
    /// Prints what's known about a file or directory
    Stat { path: String },
    /// Writes a file to stdout
    Cat {
        path: String,

        /// Start this many bytes into the file
        #[structopt(long, default_value = "0")]
        offset: u64,
    },
}

fn main() -> Result<()> {
    let args = Opt::from_args();

    let mut errlog = stderrlog::new();
    errlog.verbosity(args.verbosity + 1);
    errlog.init()?;

    info!("Memory mapping {:#?}", &args.zip_path);
    let zip_file = File::open(&args.zip_path).context("Couldn't open zip file")?;
    let mapping = unsafe { Mmap::map(&zip_file).context("Couldn't mmap zip file")? };

    let (archive, prepended) =
        ZipArchive::with_prepended_data(&mapping).context("Couldn't load archive")?;
    if prepended != 0 {
        warn!("Skipped {} bytes in front of the archive", prepended);
    }
    let strategy = if args.buffer {
        SeekStrategy::Buffer
    } else {
        SeekStrategy::Reopen
    };
    let fs = ZipFs::new(archive)?
        .with_name(args.zip_path.display().to_string())
        .seek_strategy(strategy);

    match args.command {
        Command::Ls { path, recursive } => list(&fs, &path, recursive),
        Command::Stat { path } => {
            print_metadata(&path, &fs.stat(&path)?);
            Ok(())
        }
        Command::Cat { path, offset } => {
            let mut file = fs
                .open(&path)
                .with_context(|| format!("Couldn't open {} in {}", path, fs))?;
            file.seek(SeekFrom::Start(offset))?;
            io::copy(&mut file, &mut io::stdout().lock())?;
            Ok(())
        }
    }
}

fn list(fs: &ZipFs<ZipArchive>, dir: &str, recursive: bool) -> Result<()> {
    for child in fs.read_dir(dir)? {
        let path = format!("{}/{}", dir.trim_end_matches('/'), child.name());
        print_metadata(&path, &child);
        if recursive && child.is_dir() {
            list(fs, &path, true)?;
        }
    }
    Ok(())
}

fn print_metadata(path: &str, info: &Metadata) {
    let kind = if info.is_dir() { "dir " } else { "file" };
    let modified = info
        .modified()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "-".to_owned());
    println!("{} {:>10} {:>19} {}", kind, info.len(), modified, path);
}
