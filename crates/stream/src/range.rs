/// Parsed form of an HTTP `Range` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No header was sent.
    None,
    /// `bytes=<start>-<end?>`; a missing end means end-of-file.
    Span { start: u64, end: Option<u64> },
    /// Header present but not of the supported form.
    Malformed,
}

/// A satisfiable span of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSpan {
    pub start: u64,
    pub len: u64,
    pub total: u64,
}

/// What to send back for a request against a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePlan {
    Full(ByteSpan),
    Partial(ByteSpan),
    Unsatisfiable { total: u64 },
}

impl RangeRequest {
    pub fn parse(header: Option<&str>) -> Self {
        match header {
            None => RangeRequest::None,
            Some(value) => parse_bytes_range(value).unwrap_or(RangeRequest::Malformed),
        }
    }

    /// Plan the response for a file of `total` bytes.
    ///
    /// Absent and malformed headers both serve the whole file. An end past the
    /// file is clamped to the last byte.
    pub fn plan(self, total: u64) -> ServePlan {
        match self {
            RangeRequest::None | RangeRequest::Malformed => ServePlan::Full(ByteSpan::full(total)),
            RangeRequest::Span { start, end } => {
                if start >= total {
                    return ServePlan::Unsatisfiable { total };
                }
                let last = total - 1;
                let end = end.map_or(last, |end| end.min(last));
                if start > end {
                    return ServePlan::Unsatisfiable { total };
                }
                ServePlan::Partial(ByteSpan {
                    start,
                    len: end - start + 1,
                    total,
                })
            }
        }
    }
}

impl ByteSpan {
    pub fn full(total: u64) -> Self {
        Self {
            start: 0,
            len: total,
            total,
        }
    }

    /// Inclusive index of the last byte. Only meaningful for non-empty spans.
    pub fn end(&self) -> u64 {
        self.start + self.len.saturating_sub(1)
    }

    /// Value for the `Content-Range` header of a 206 response.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end(), self.total)
    }
}

fn parse_bytes_range(value: &str) -> Option<RangeRequest> {
    let ranges = value.trim().strip_prefix("bytes=")?;
    // Only the first range of a multi-range request is honoured.
    let first = ranges.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;

    let start = parse_digits(start.trim())?;
    let end = match end.trim() {
        "" => None,
        digits => Some(parse_digits(digits)?),
    };
    Some(RangeRequest::Span { start, end })
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
