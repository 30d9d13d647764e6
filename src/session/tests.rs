use crate::clock::FixedClock;
use crate::config::StyleKind;
use crate::parser::{
    CompositeParser, DateTimeInterpreter, EntryParser, FileRecord, FileType, ParseOutcome,
    RejectReason, UnixParser,
};
use crate::session::{ListingSession, SessionError};
use chrono::NaiveDateTime;
use std::io::{self, BufRead, Cursor, Read};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn session(strict: bool) -> ListingSession {
    ListingSession::builder()
        .clock(FixedClock(at("2024-06-01 00:00:00")))
        .strict(strict)
        .build()
        .unwrap()
}

const MIXED_LISTING: [&str; 8] = [
    "total 24",
    "PEP             36864 04/03/24 14:06:34 *DIR       dir1/",
    "",
    "this line belongs to no style",
    "drwxr-xr-x   2 user     group        4096 Mar 24 14:06 src",
    "QPGMR          135168 04/03/18 30:06:29 *FILE",
    "04-27-00  09:09PM       <DIR>          Program Files",
    "               1 File(s)          1,024 bytes",
];

#[test]
fn test_lenient_skips_unmatched_lines() {
    let records = session(false).collect_all(MIXED_LISTING).unwrap();

    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["dir1", "src", "Program Files"]);
}

#[test]
fn test_strict_aborts_on_first_unmatched_line() {
    let session = session(true);
    let mut entries = session.parse_all(MIXED_LISTING);

    assert_eq!(entries.next().unwrap().unwrap().name, "dir1");
    match entries.next() {
        Some(Err(SessionError::StrictAbort {
            line_number,
            failure,
        })) => {
            assert_eq!(line_number, 4);
            assert_eq!(failure.line, "this line belongs to no style");
        }
        other => panic!("expected strict abort, got {:?}", other),
    }
    assert!(entries.next().is_none());
    assert!(entries.next().is_none());
}

#[test]
fn test_strict_collect_returns_error() {
    let err = session(true).collect_all(MIXED_LISTING).unwrap_err();
    assert!(err.to_string().starts_with("line 4:"));
}

#[test]
fn test_strict_accepts_clean_listing() {
    let records = session(true)
        .collect_all(["total 0", "PEP 100 04/03/24 14:06:29 *STMF build.xml", "   "])
        .unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn test_sequence_is_restartable_from_source() {
    let session = session(false);
    let first: Vec<FileRecord> = session.parse_all(MIXED_LISTING).map(Result::unwrap).collect();
    let second: Vec<FileRecord> = session.parse_all(MIXED_LISTING).map(Result::unwrap).collect();
    assert_eq!(first, second);
}

#[test]
fn test_parse_is_lazy() {
    let session = session(true);
    // Only the first line is pulled; the bad second line is never reached.
    let first = session
        .parse_all(["PEP 100 04/03/24 14:06:29 *STMF a.txt", "garbage"])
        .next();
    assert!(matches!(first, Some(Ok(_))));
}

#[test]
fn test_parse_reader() {
    let listing = "total 8\n\
                   -rw-r--r--   1 user     group         12 Jan  5  2020 notes.txt\n\
                   lrwxrwxrwx   1 root     root            7 Jan  5  2020 bin -> usr/bin\n";
    let records: Vec<FileRecord> = session(false)
        .parse_reader(Cursor::new(listing))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].kind, FileType::SymbolicLink);
    assert_eq!(records[1].link_target.as_deref(), Some("usr/bin"));
}

/// Yields one line, then fails
struct FailingReader {
    served: bool,
}

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection dropped"))
    }
}

impl BufRead for FailingReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.served {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection dropped"))
        } else {
            Ok(b"PEP 100 04/03/24 14:06:29 *STMF a.txt\n")
        }
    }

    fn consume(&mut self, _amt: usize) {
        self.served = true;
    }
}

#[test]
fn test_read_error_ends_sequence() {
    let session = session(false);
    let mut entries = session.parse_reader(FailingReader { served: false });

    assert_eq!(entries.next().unwrap().unwrap().name, "a.txt");
    assert!(matches!(entries.next(), Some(Err(SessionError::Io(_)))));
    assert!(entries.next().is_none());
}

/// Claims every line that starts with `#`
struct Comment;

impl EntryParser for Comment {
    fn style(&self) -> &str {
        "comment"
    }

    fn parse_line(&self, line: &str) -> ParseOutcome {
        match line.strip_prefix('#') {
            Some(rest) => ParseOutcome::Matched(FileRecord::new(
                rest.trim(),
                FileType::Unknown,
                self.style(),
                line,
            )),
            None => ParseOutcome::Rejected(RejectReason::Structure),
        }
    }
}

#[test]
fn test_builder_keeps_insertion_order() {
    let session = ListingSession::builder()
        .clock(FixedClock(at("2024-06-01 00:00:00")))
        .style(StyleKind::Unix)
        .parser(Comment)
        .style(StyleKind::Os400)
        .build()
        .unwrap();

    assert_eq!(session.parser().styles(), vec!["unix", "comment", "os400"]);
    let records = session.collect_all(["# note", "PEP 100 04/03/24 14:06:29 *STMF a.txt"]).unwrap();
    assert_eq!(records[0].style, "comment");
    assert_eq!(records[1].style, "os400");
}

#[test]
fn test_wraps_hand_built_composite() {
    let clock = FixedClock(at("2024-06-01 00:00:00"));
    let dates = DateTimeInterpreter::new(std::sync::Arc::new(clock));
    let parsers: Vec<Box<dyn EntryParser>> = vec![Box::new(UnixParser::new(dates).unwrap())];
    let session = ListingSession::new(CompositeParser::new(parsers).register(Comment), true);

    assert!(session.is_strict());
    assert_eq!(session.parser().styles(), vec!["unix", "comment"]);

    let mut entries = session.parse_all([
        "-rw-r--r--   1 user     group         12 Jan  5  2020 notes.txt",
        "# scratch",
        "PEP 100 04/03/24 14:06:29 *STMF a.txt",
    ]);
    assert_eq!(entries.next().unwrap().unwrap().style, "unix");
    assert_eq!(entries.next().unwrap().unwrap().name, "scratch");
    assert!(matches!(
        entries.next(),
        Some(Err(SessionError::StrictAbort { line_number: 3, .. }))
    ));
}

#[test]
fn test_builder_defaults_to_all_styles() {
    let session = session(false);
    assert_eq!(
        session.parser().styles(),
        vec!["os400", "os400-dotted", "unix", "nt"]
    );
    assert!(!session.is_strict());
}

#[test]
fn test_session_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ListingSession>();
}
