use std::path::PathBuf;

use structopt::clap::AppSettings;
use structopt::StructOpt;

#[derive(Debug, Default, Clone, StructOpt)]
#[structopt(
    name = "rwc",
    about = "Count lines, words, bytes and characters",
    setting = AppSettings::TrailingVarArg
)]
pub struct Opt {
    /// Count lines
    #[structopt(short = "l", long = "lines")]
    pub lines: bool,
    /// Count words
    #[structopt(short = "w", long = "words")]
    pub words: bool,
    /// Count bytes
    #[structopt(short = "c", long = "bytes")]
    pub bytes: bool,
    /// Count UTF-8 characters
    #[structopt(short = "m", long = "chars")]
    pub chars: bool,
    /// Input files; reads standard input when none are given
    #[structopt(parse(from_os_str))]
    pub input: Vec<PathBuf>,
}

impl Opt {
    /// With no flags at all, report lines, words and bytes. Runs once,
    /// before any counting; an explicit flag suppresses it entirely.
    pub fn apply_defaults(&mut self) {
        if !(self.lines || self.words || self.bytes || self.chars) {
            self.lines = true;
            self.words = true;
            self.bytes = true;
        }
    }
}

#[test]
fn test_combined_cluster() {
    let opt = Opt::from_iter(&["rwc", "-lcw"]);
    assert!(opt.lines && opt.words && opt.bytes);
    assert!(!opt.chars);
}

#[test]
fn test_unknown_flag_is_an_error() {
    assert!(Opt::from_iter_safe(&["rwc", "-x"]).is_err());
}

#[test]
fn test_flags_end_at_first_filename() {
    let opt = Opt::from_iter(&["rwc", "-l", "a.txt", "-w"]);
    assert!(opt.lines);
    assert!(!opt.words);
    assert_eq!(opt.input, vec![PathBuf::from("a.txt"), PathBuf::from("-w")]);
}

#[test]
fn test_defaults_when_no_flags() {
    let mut opt = Opt::from_iter(&["rwc", "a.txt"]);
    opt.apply_defaults();
    assert!(opt.lines && opt.words && opt.bytes);
    assert!(!opt.chars);
}

#[test]
fn test_defaults_skipped_with_explicit_flag() {
    let mut opt = Opt::from_iter(&["rwc", "-m"]);
    opt.apply_defaults();
    assert!(opt.chars);
    assert!(!(opt.lines || opt.words || opt.bytes));
}
