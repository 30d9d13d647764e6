use super::{
    DateTimeInterpreter, EntryParser, FieldExtractor, FileRecord, FileType, FormatDescriptor,
    MemberPath, ParseOutcome, PatternError, RejectReason, TimestampFormat,
};

/// `owner [size] [date time] *TYPE [name]`
const PATTERN: &str = r"^(?P<owner>\S+)\s+(?:(?P<size>\S+)\s+)?(?:(?P<date>\S+)\s+(?P<time>\S+)\s+)?(?P<kind>\*\S+)(?:\s+(?P<name>\S.*?))?\s*$";

const STMF: &str = "*STMF";
const DIR: &str = "*DIR";
const FILE: &str = "*FILE";
const MEM: &str = "*MEM";

/// Parser for IBM i (OS/400) `LIST` output.
///
/// ```text
/// PEP             36864 04/03/24 14:06:34 *DIR       dir1/
/// QPGMR                                   *MEM       RPGUNITC1.FILE/RUCALLTST.MBR
/// ```
#[derive(Debug, Clone)]
pub struct Os400Parser {
    extractor: FieldExtractor,
    dates: DateTimeInterpreter,
    format: TimestampFormat,
}

impl Os400Parser {
    /// Slash-separated `yy/MM/dd` dates
    pub fn new(dates: DateTimeInterpreter) -> Result<Self, PatternError> {
        Self::with_format("os400", TimestampFormat::OS400, dates)
    }

    /// Dot-separated `yy.MM.dd` dates
    pub fn dotted(dates: DateTimeInterpreter) -> Result<Self, PatternError> {
        Self::with_format("os400-dotted", TimestampFormat::OS400_DOTTED, dates)
    }

    pub fn with_format(
        style: &str,
        format: TimestampFormat,
        dates: DateTimeInterpreter,
    ) -> Result<Self, PatternError> {
        let descriptor = FormatDescriptor::new(style, PATTERN)?
            .numeric(&["size"])
            .type_indicator("kind", &[STMF, DIR, FILE, MEM]);

        Ok(Self {
            extractor: FieldExtractor::new(descriptor),
            dates,
            format,
        })
    }

    fn interpret(&self, line: &str) -> Result<FileRecord, RejectReason> {
        let fields = self.extractor.extract(line)?;

        let timestamp = match (fields.text("date"), fields.text("time")) {
            (Some(date), Some(time)) => Some(self.dates.parse(date, time, self.format)?),
            _ => None,
        };
        let size = fields.number("size");
        let name = fields
            .text("name")
            .ok_or(RejectReason::MissingField("name"))?;
        let name = name.strip_suffix('/').unwrap_or(name);
        if name.is_empty() {
            return Err(RejectReason::MissingField("name"));
        }

        let mut record = FileRecord::new(name, FileType::File, self.style(), line);
        record.owner = fields.text("owner").map(str::to_string);

        match fields.kind().ok_or(RejectReason::Structure)? {
            MEM => {
                if size.is_some() {
                    return Err(RejectReason::UnexpectedField("size"));
                }
                if timestamp.is_some() {
                    return Err(RejectReason::UnexpectedField("timestamp"));
                }
                record.member = name.split_once('/').map(|(container, member)| MemberPath {
                    container: container.to_string(),
                    member: member.to_string(),
                });
                return Ok(record);
            }
            FILE => {
                // Only save files are real objects; other *FILE lines head a member list.
                if !name.to_ascii_uppercase().ends_with(".SAVF") {
                    return Err(RejectReason::Unsupported(format!(
                        "*FILE {name} is not a save file"
                    )));
                }
            }
            DIR => {
                record.kind = FileType::Directory;
                record.name = last_component(name).to_string();
            }
            STMF => {
                record.name = last_component(name).to_string();
            }
            other => return Err(RejectReason::UnknownType(other.to_string())),
        }

        record.size = Some(size.ok_or(RejectReason::MissingField("size"))?);
        record.timestamp = Some(timestamp.ok_or(RejectReason::MissingField("timestamp"))?);
        Ok(record)
    }
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl EntryParser for Os400Parser {
    fn style(&self) -> &str {
        self.extractor.descriptor().style()
    }

    fn parse_line(&self, line: &str) -> ParseOutcome {
        self.interpret(line).into()
    }
}
