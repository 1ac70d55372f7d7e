use bstr::{BStr, BString, ByteSlice, ByteVec};
use chrono::{DateTime, FixedOffset};

use crate::{Result, UtilError};

/// A git timestamp: seconds since the Unix epoch plus the timezone token
/// exactly as it appeared on the wire (e.g. `+0000`, `-0530`).
///
/// The token is kept as raw bytes rather than a parsed offset so that
/// re-serializing a signature is byte-exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitTime {
    /// Seconds since the Unix epoch.
    pub seconds: u64,
    /// Timezone token, e.g. `+0000`.
    pub tz: BString,
}

impl GitTime {
    pub fn new(seconds: u64, tz: impl Into<BString>) -> Self {
        Self {
            seconds,
            tz: tz.into(),
        }
    }

    /// The current time in UTC.
    pub fn now() -> Self {
        let seconds = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::new(seconds, "+0000")
    }

    /// Timezone offset in minutes east of UTC, if the token parses.
    ///
    /// The token uses git's decimal convention: `-0530` means 5 hours
    /// 30 minutes west.
    pub fn tz_offset_minutes(&self) -> Option<i32> {
        let s = self.tz.to_str().ok()?;
        let (sign, digits) = match *s.as_bytes().first()? {
            b'+' => (1, &s[1..]),
            b'-' => (-1, &s[1..]),
            _ => (1, &s[..]),
        };
        let raw: i32 = digits.parse().ok()?;
        Some(sign * ((raw / 100) * 60 + raw % 100))
    }

    /// Format like C git's default log date:
    /// `Thu Feb 13 23:31:30 2009 +0000`, rendered in the stored timezone.
    pub fn format_default(&self) -> String {
        let offset_minutes = self.tz_offset_minutes().unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap());
        let dt = DateTime::from_timestamp(self.seconds as i64, 0)
            .unwrap_or(DateTime::UNIX_EPOCH)
            .with_timezone(&offset);
        format!("{} {}", dt.format("%a %b %e %H:%M:%S %Y"), self.tz)
    }
}

/// Author or committer identity with timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: BString,
    pub email: BString,
    pub when: GitTime,
}

impl Signature {
    /// Parse git's identity format: `Name <email> unix-seconds tz`.
    pub fn parse(input: &BStr) -> Result<Self> {
        let bytes = input.as_bytes();

        let lt = bytes
            .find_byte(b'<')
            .ok_or_else(|| UtilError::SignatureParse("missing '<'".into()))?;
        let gt = bytes[lt..]
            .find_byte(b'>')
            .map(|p| p + lt)
            .ok_or_else(|| UtilError::SignatureParse("missing '>'".into()))?;

        let name = bytes[..lt].trim();
        let email = &bytes[lt + 1..gt];

        let rest = bytes[gt + 1..].trim();
        let mut fields = rest.splitn_str(2, b" ");
        let secs_field = fields
            .next()
            .filter(|f| !f.is_empty())
            .ok_or_else(|| UtilError::SignatureParse("missing timestamp".into()))?;
        let tz_field = fields
            .next()
            .ok_or_else(|| UtilError::SignatureParse("missing timezone".into()))?;

        let seconds: u64 = std::str::from_utf8(secs_field)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                UtilError::SignatureParse(format!(
                    "invalid timestamp: {}",
                    secs_field.as_bstr()
                ))
            })?;

        Ok(Self {
            name: BString::from(name),
            email: BString::from(email),
            when: GitTime::new(seconds, tz_field.trim()),
        })
    }

    /// Serialize to git's canonical form: `Name <email> unix-seconds tz`.
    pub fn to_bytes(&self) -> BString {
        let mut out = BString::from(Vec::new());
        out.push_str(&self.name);
        out.push_str(b" <");
        out.push_str(&self.email);
        out.push_str(b"> ");
        out.push_str(self.when.seconds.to_string());
        out.push_char(' ');
        out.push_str(&self.when.tz);
        out
    }
}
