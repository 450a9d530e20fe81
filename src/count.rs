use std::char::REPLACEMENT_CHARACTER;
#[cfg(test)]
use std::io::Cursor;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use bstr::decode_utf8;

use crate::args::Opt;

const READ_SIZE: usize = 1024 * 32;

#[derive(Debug, Default)]
pub struct Counts {
    pub path: Option<PathBuf>,
    pub lines: u64,
    pub words: u64,
    pub bytes: u64,
    pub chars: u64,
}

impl Counts {
    /// One output line: the selected counters right-aligned in 8-column
    /// fields, in lines/words/chars/bytes order, then the path for named
    /// files. Standard input gets no label.
    pub fn print<W: Write>(&self, opt: &Opt, mut out: W) -> io::Result<()> {
        if opt.lines {
            write!(&mut out, "{:>8}", self.lines)?;
        }

        if opt.words {
            write!(&mut out, "{:>8}", self.words)?;
        }

        if opt.chars {
            write!(&mut out, "{:>8}", self.chars)?;
        }

        if opt.bytes {
            write!(&mut out, "{:>8}", self.bytes)?;
        }

        if let Some(ref path) = self.path {
            write!(&mut out, " {}", path.display())?;
        }

        writeln!(&mut out)
    }
}

// Word separators, deliberately narrower than char::is_whitespace.
fn is_word_break(c: char) -> bool {
    c == ' ' || c == '\n' || c == '\t' || c == '\r'
}

fn count_into<R: Read>(r: R, count: &mut Counts) -> io::Result<()> {
    let mut reader = BufReader::with_capacity(READ_SIZE, r);
    let mut in_word = false;

    // Lines are useful sync points for multibyte reading; the take()
    // bounds memory use on lines longer than READ_SIZE. A character cut
    // by that bound is carried into the next chunk, never decoded as
    // fragments.
    let mut buf = Vec::with_capacity(READ_SIZE);
    loop {
        let at_eof = reader
            .by_ref()
            .take(READ_SIZE as u64)
            .read_until(b'\n', &mut buf)?
            == 0;

        let mut pos = 0;
        while pos < buf.len() {
            let (decoded, size) = decode_utf8(&buf[pos..]);

            // A valid prefix of a sequence at the end of the chunk may
            // still be completed by the next read.
            if decoded.is_none() && !at_eof && pos + size == buf.len() {
                break;
            }

            let c = decoded.unwrap_or(REPLACEMENT_CHARACTER);
            count.chars += 1;
            count.bytes += size as u64;

            if c == '\n' {
                count.lines += 1;
            }

            if is_word_break(c) {
                if in_word {
                    in_word = false;
                    count.words += 1;
                }
            } else {
                in_word = true;
            }

            pos += size;
        }
        buf.drain(..pos);

        if at_eof {
            break;
        }
    }

    // A final word with no trailing whitespace still counts.
    if in_word {
        count.words += 1;
    }

    Ok(())
}

pub fn count_reader<R: Read>(r: R) -> io::Result<Counts> {
    let mut count = Counts::default();
    count_into(r, &mut count)?;
    Ok(count)
}

#[test]
fn test_empty_input() {
    let c = count_reader(Cursor::new(b"")).unwrap();
    assert_eq!(c.lines, 0);
    assert_eq!(c.words, 0);
    assert_eq!(c.bytes, 0);
    assert_eq!(c.chars, 0);
}

#[test]
fn test_hello_world() {
    let c = count_reader(Cursor::new(b"hello world\n")).unwrap();
    assert_eq!(c.lines, 1);
    assert_eq!(c.words, 2);
    assert_eq!(c.bytes, 12);
    assert_eq!(c.chars, 12);
}

#[test]
fn test_trailing_word_without_newline() {
    let c = count_reader(Cursor::new(b"foo  bar\tbaz")).unwrap();
    assert_eq!(c.words, 3);
    assert_eq!(c.lines, 0);
    assert_eq!(c.bytes, 12);
}

#[test]
fn test_multibyte_chars() {
    // One three-byte character followed by "ab"
    let c = count_reader(Cursor::new("\u{20ac}ab".as_bytes())).unwrap();
    assert_eq!(c.chars, 3);
    assert_eq!(c.bytes, 5);
    assert_eq!(c.words, 1);
}

#[test]
fn test_multibyte_split_across_chunks() {
    // A long unterminated line forces chunked reads; the three-byte
    // character straddles the chunk boundary and must count once.
    let mut input = vec![b'a'; READ_SIZE - 1];
    input.extend_from_slice("\u{20ac}b".as_bytes());

    let c = count_reader(Cursor::new(input)).unwrap();
    assert_eq!(c.chars, READ_SIZE as u64 + 1);
    assert_eq!(c.bytes, READ_SIZE as u64 + 3);
    assert_eq!(c.words, 1);
    assert_eq!(c.lines, 0);
}

#[test]
fn test_bytes_never_below_chars() {
    let c = count_reader(Cursor::new("f\u{f3}\u{f3} b\u{e1}r\n".as_bytes())).unwrap();
    assert_eq!(c.chars, 8);
    assert_eq!(c.bytes, 11);
    assert!(c.bytes >= c.chars);
}

#[test]
fn test_crlf_separates_words() {
    let c = count_reader(Cursor::new(b"one\r\ntwo\r\n")).unwrap();
    assert_eq!(c.lines, 2);
    assert_eq!(c.words, 2);
    assert_eq!(c.bytes, 10);
}

#[test]
fn test_consecutive_whitespace_counts_once() {
    let c = count_reader(Cursor::new(b"  a \t\t b  \n\n")).unwrap();
    assert_eq!(c.words, 2);
    assert_eq!(c.lines, 2);
}

#[test]
fn test_unterminated_final_line_not_counted() {
    let c = count_reader(Cursor::new(b"a\nb")).unwrap();
    assert_eq!(c.lines, 1);
    assert_eq!(c.words, 2);
}

#[test]
fn test_invalid_utf8_still_counts_bytes() {
    // A lone invalid byte decodes as one replacement character
    let c = count_reader(Cursor::new(b"\xffab")).unwrap();
    assert_eq!(c.bytes, 3);
    assert_eq!(c.chars, 3);
}

#[test]
fn test_truncated_sequence_at_eof() {
    // A valid two-byte lead with no continuation still counts its byte
    let c = count_reader(Cursor::new(b"ab\xc3")).unwrap();
    assert_eq!(c.bytes, 3);
    assert_eq!(c.chars, 3);
    assert_eq!(c.words, 1);
}

#[test]
fn test_counting_is_repeatable() {
    let input = b"same input\ntwice over\n";
    let a = count_reader(Cursor::new(input)).unwrap();
    let b = count_reader(Cursor::new(input)).unwrap();
    assert_eq!(a.lines, b.lines);
    assert_eq!(a.words, b.words);
    assert_eq!(a.bytes, b.bytes);
    assert_eq!(a.chars, b.chars);
}

#[test]
fn test_print_default_fields() {
    let counts = Counts {
        path: Some("hello.txt".into()),
        lines: 1,
        words: 2,
        bytes: 12,
        chars: 12,
    };
    let mut opt = Opt::default();
    opt.apply_defaults();

    let mut out = Vec::new();
    counts.print(&opt, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "       1       2      12 hello.txt\n"
    );
}

#[test]
fn test_print_chars_before_bytes() {
    let counts = Counts {
        path: None,
        lines: 0,
        words: 1,
        bytes: 5,
        chars: 3,
    };
    let opt = Opt {
        chars: true,
        bytes: true,
        ..Opt::default()
    };

    let mut out = Vec::new();
    counts.print(&opt, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "       3       5\n");
}

#[test]
fn test_print_stdin_has_no_label() {
    let counts = Counts {
        lines: 4,
        ..Counts::default()
    };
    let opt = Opt {
        lines: true,
        ..Opt::default()
    };

    let mut out = Vec::new();
    counts.print(&opt, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "       4\n");
}
