use super::{
    DateTimeInterpreter, EntryParser, FieldExtractor, FileRecord, FileType, FormatDescriptor,
    ParseOutcome, PatternError, RejectReason, TimestampFormat,
};

/// `MM-dd-yy hh:mmAM (<DIR>|size) name`
const PATTERN: &str =
    r"^(?P<date>\d\S*)\s+(?P<time>\d\S*)\s+(?:(?P<dir><DIR>)|(?P<size>\S+))\s+(?P<name>\S.*?)\s*$";

/// Parser for the DOS-like listings produced by Windows NT / IIS servers.
///
/// The style has no owner column.
#[derive(Debug, Clone)]
pub struct NtParser {
    extractor: FieldExtractor,
    dates: DateTimeInterpreter,
}

impl NtParser {
    pub fn new(dates: DateTimeInterpreter) -> Result<Self, PatternError> {
        let descriptor = FormatDescriptor::new("nt", PATTERN)?.numeric(&["size"]);
        Ok(Self {
            extractor: FieldExtractor::new(descriptor),
            dates,
        })
    }

    fn interpret(&self, line: &str) -> Result<FileRecord, RejectReason> {
        let fields = self.extractor.extract(line)?;

        let date = fields.text("date").ok_or(RejectReason::Structure)?;
        let time = fields.text("time").ok_or(RejectReason::Structure)?;
        let timestamp = self.dates.parse(date, time, TimestampFormat::NT)?;

        let name = fields
            .text("name")
            .ok_or(RejectReason::MissingField("name"))?;
        let kind = if fields.text("dir").is_some() {
            FileType::Directory
        } else {
            FileType::File
        };

        let mut record = FileRecord::new(name, kind, self.style(), line);
        record.size = fields.number("size");
        record.timestamp = Some(timestamp);
        Ok(record)
    }
}

impl EntryParser for NtParser {
    fn style(&self) -> &str {
        self.extractor.descriptor().style()
    }

    fn parse_line(&self, line: &str) -> ParseOutcome {
        self.interpret(line).into()
    }
}
