#[cfg(test)]
use std::fs;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;
use std::process;

use structopt::clap::ErrorKind;
use structopt::StructOpt;

mod args;
mod count;

use crate::args::Opt;

#[derive(Debug)]
enum Failure {
    Open(io::Error),
    Read(io::Error),
    Output(io::Error),
}

fn annotate(path: &Path, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {}", path.display(), e))
}

fn run<W: Write>(opt: &Opt, mut out: W) -> Result<(), Failure> {
    if opt.input.is_empty() {
        let stdin = io::stdin();
        let counts = count::count_reader(stdin.lock()).map_err(Failure::Read)?;
        return counts.print(opt, &mut out).map_err(Failure::Output);
    }

    for path in &opt.input {
        // The handle is consumed by the counting pass and dropped there,
        // before the next file is opened.
        let file = File::open(path).map_err(|e| Failure::Open(annotate(path, e)))?;
        let mut counts =
            count::count_reader(file).map_err(|e| Failure::Read(annotate(path, e)))?;
        counts.path = Some(path.clone());
        counts.print(opt, &mut out).map_err(Failure::Output)?;
    }

    Ok(())
}

fn main() {
    let mut opt = match Opt::from_iter_safe(std::env::args_os()) {
        Ok(opt) => opt,
        Err(e) => {
            // Flag errors carry their usage text, and both go to stdout
            println!("{}", e.message);
            let code = match e.kind {
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => 0,
                _ => 1,
            };
            process::exit(code);
        }
    };
    opt.apply_defaults();

    let stdout = io::stdout();
    let out = stdout.lock();

    // The first I/O failure ends the run; remaining files are skipped.
    if let Err(e) = run(&opt, out) {
        match e {
            Failure::Open(e) | Failure::Output(e) => eprintln!("rwc: {}", e),
            Failure::Read(e) => {
                eprintln!("rwc: {}", e);
                let _ = Opt::clap().print_help();
                println!();
            }
        }
        process::exit(1);
    }
}

#[test]
fn test_two_files_print_in_input_order() {
    let dir = std::env::temp_dir();
    let one = dir.join(format!("rwc-run-{}-one.txt", process::id()));
    let two = dir.join(format!("rwc-run-{}-two.txt", process::id()));
    fs::write(&one, "hello world\n").unwrap();
    fs::write(&two, "a b c\n").unwrap();

    let mut opt = Opt {
        input: vec![one.clone(), two.clone()],
        ..Opt::default()
    };
    opt.apply_defaults();

    let mut out = Vec::new();
    run(&opt, &mut out).unwrap();

    fs::remove_file(&one).unwrap();
    fs::remove_file(&two).unwrap();

    let expected = format!(
        "       1       2      12 {}\n       1       3       6 {}\n",
        one.display(),
        two.display()
    );
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_open_failure_ends_run() {
    let opt = Opt {
        lines: true,
        input: vec![PathBuf::from("rwc-no-such-file.txt")],
        ..Opt::default()
    };

    let mut out = Vec::new();
    let err = run(&opt, &mut out).unwrap_err();
    assert!(matches!(err, Failure::Open(_)));
    assert!(out.is_empty());
}
