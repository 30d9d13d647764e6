use super::{
    DateTimeInterpreter, EntryParser, FieldExtractor, FieldSet, FileRecord, FileType,
    FormatDescriptor, ParseOutcome, PatternError, RejectReason, TimestampFormat,
};
use chrono::NaiveDateTime;

/// `<type><perms> links owner [group] size date time-or-year name`
const PATTERN: &str = concat!(
    r"^(?P<kind>[bcdelfmpSs-])(?P<perms>[rwxsStTL-]{9})[+.@]?\s*",
    r"(?P<links>\d+)\s+",
    r"(?P<owner>\S+)\s+(?:(?P<group>\S+)\s+)?",
    r"(?:(?P<major>\d+),\s*(?P<minor>\d+)|(?P<size>\d+))\s+",
    r"(?:(?P<month>[A-Za-z]{3})\s+(?P<day>\d{1,2})\s+(?P<time>\d{1,2}:\d{2}|\d{4})",
    r"|(?P<isodate>\d{4}-\d{2}-\d{2})\s+(?P<isotime>\d{1,2}:\d{2}))",
    r"\s+(?P<name>\S.*?)\s*$",
);

const SYMLINK_ARROW: &str = " -> ";

/// Parser for `ls -l` style listings served by Unix hosts.
#[derive(Debug, Clone)]
pub struct UnixParser {
    extractor: FieldExtractor,
    dates: DateTimeInterpreter,
}

impl UnixParser {
    pub fn new(dates: DateTimeInterpreter) -> Result<Self, PatternError> {
        let descriptor = FormatDescriptor::new("unix", PATTERN)?.numeric(&[
            "links", "size", "major", "minor",
        ]);

        Ok(Self {
            extractor: FieldExtractor::new(descriptor),
            dates,
        })
    }

    fn interpret(&self, line: &str) -> Result<FileRecord, RejectReason> {
        let fields = self.extractor.extract(line)?;
        let timestamp = self.timestamp(&fields)?;

        let type_char = fields.text("kind").unwrap_or("-");
        let kind = match type_char {
            "d" => FileType::Directory,
            "l" => FileType::SymbolicLink,
            "-" | "f" | "b" | "c" => FileType::File,
            _ => FileType::Unknown,
        };

        let raw_name = fields
            .text("name")
            .ok_or(RejectReason::MissingField("name"))?;
        let (name, link_target) = match (kind, raw_name.split_once(SYMLINK_ARROW)) {
            (FileType::SymbolicLink, Some((name, target))) => (name, Some(target.to_string())),
            _ => (raw_name, None),
        };

        let mut record = FileRecord::new(name, kind, self.style(), line);
        record.owner = fields.text("owner").map(str::to_string);
        record.group = fields.text("group").map(str::to_string);
        // Device nodes list `major, minor` in place of a size.
        record.size = fields.number("size");
        record.timestamp = Some(timestamp);
        record.permissions = fields.text("perms").map(mode_bits);
        record.link_target = link_target;
        Ok(record)
    }

    fn timestamp(&self, fields: &FieldSet<'_>) -> Result<NaiveDateTime, RejectReason> {
        let parsed = match (fields.text("isodate"), fields.text("isotime")) {
            (Some(date), Some(time)) => self.dates.parse(date, time, TimestampFormat::ISO),
            _ => {
                let month = fields.text("month").ok_or(RejectReason::Structure)?;
                let day = fields.text("day").ok_or(RejectReason::Structure)?;
                let time = fields.text("time").ok_or(RejectReason::Structure)?;
                self.dates.parse_month_day(month, day, time)
            }
        };
        Ok(parsed?)
    }
}

/// Convert a nine-character `rwxr-xr-x` column into mode bits.
fn mode_bits(perms: &str) -> u32 {
    const SPECIAL: [u32; 3] = [0o4000, 0o2000, 0o1000];

    let mut mode = 0;
    for (class, chunk) in perms.as_bytes().chunks(3).take(3).enumerate() {
        let shift = 6 - 3 * class as u32;
        if chunk.first() == Some(&b'r') {
            mode |= 0o4 << shift;
        }
        if chunk.get(1) == Some(&b'w') {
            mode |= 0o2 << shift;
        }
        match chunk.get(2).copied() {
            Some(b'x') => mode |= 0o1 << shift,
            Some(b's') | Some(b't') => mode |= (0o1 << shift) | SPECIAL[class],
            Some(b'S') | Some(b'T') => mode |= SPECIAL[class],
            _ => {}
        }
    }
    mode
}

impl EntryParser for UnixParser {
    fn style(&self) -> &str {
        self.extractor.descriptor().style()
    }

    fn parse_line(&self, line: &str) -> ParseOutcome {
        self.interpret(line).into()
    }
}
